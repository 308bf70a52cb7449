//! Compliance check definitions.
//!
//! Aggregation is a pure function of the three sub-check records: no
//! persistence is involved in producing a [`Verdict`].

use common::define_kind;

use crate::domain::audit;
#[cfg(doc)]
use crate::domain::Transfer;

/// The three compliance sub-checks of a [`Transfer`].
#[derive(Clone, Debug)]
pub struct ComplianceChecks {
    /// Ethiopian law compliance [`Check`].
    pub ethiopian_law: Check,

    /// Tax clearance [`Check`].
    pub tax_clearance: Check,

    /// Fraud prevention [`FraudCheck`].
    pub fraud_prevention: FraudCheck,
}

impl ComplianceChecks {
    /// Aggregates the sub-checks into a single [`Verdict`].
    ///
    /// The aggregate is [`Verdict::Compliant`] iff all three sub-checks are
    /// compliant and the fraud [`RiskLevel`] is not [`RiskLevel::High`]. A
    /// high risk level or any non-compliant sub-check aggregates to
    /// [`Verdict::NonCompliant`]; any still-pending sub-check otherwise keeps
    /// the aggregate at [`Verdict::Pending`].
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        let statuses = [
            self.ethiopian_law.status,
            self.tax_clearance.status,
            self.fraud_prevention.check.status,
        ];

        if self.fraud_prevention.risk_level == RiskLevel::High
            || statuses.contains(&CheckStatus::NonCompliant)
        {
            return Verdict::NonCompliant;
        }
        if statuses.contains(&CheckStatus::Pending) {
            return Verdict::Pending;
        }

        Verdict::Compliant
    }
}

/// Single compliance sub-check record.
#[derive(Clone, Debug)]
pub struct Check {
    /// [`CheckStatus`] of this [`Check`].
    pub status: CheckStatus,

    /// Officer [`audit::Notes`] on this [`Check`].
    pub notes: Option<audit::Notes>,
}

/// Fraud prevention sub-check record.
#[derive(Clone, Debug)]
pub struct FraudCheck {
    /// Underlying [`Check`] record.
    pub check: Check,

    /// Assessed [`RiskLevel`].
    pub risk_level: RiskLevel,
}

define_kind! {
    #[doc = "Status of a single compliance sub-check."]
    enum CheckStatus {
        #[doc = "The sub-check passed."]
        Compliant = 1,

        #[doc = "The sub-check failed."]
        NonCompliant = 2,

        #[doc = "The sub-check has not been evaluated yet."]
        Pending = 3,
    }
}

define_kind! {
    #[doc = "Fraud risk level of a [`Transfer`]."]
    enum RiskLevel {
        #[doc = "Low fraud risk."]
        Low = 1,

        #[doc = "Medium fraud risk."]
        Medium = 2,

        #[doc = "High fraud risk."]
        High = 3,
    }
}

/// Aggregate verdict of [`ComplianceChecks`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// All sub-checks passed and the fraud risk is acceptable.
    Compliant,

    /// At least one sub-check failed or the fraud risk is high.
    NonCompliant,

    /// At least one sub-check is still pending.
    Pending,
}

#[cfg(test)]
mod spec {
    use super::{
        Check, CheckStatus, ComplianceChecks, FraudCheck, RiskLevel, Verdict,
    };

    fn checks(
        law: CheckStatus,
        tax: CheckStatus,
        fraud: CheckStatus,
        risk: RiskLevel,
    ) -> ComplianceChecks {
        ComplianceChecks {
            ethiopian_law: Check {
                status: law,
                notes: None,
            },
            tax_clearance: Check {
                status: tax,
                notes: None,
            },
            fraud_prevention: FraudCheck {
                check: Check {
                    status: fraud,
                    notes: None,
                },
                risk_level: risk,
            },
        }
    }

    #[test]
    fn compliant_when_all_pass_and_risk_acceptable() {
        use CheckStatus as S;

        for risk in [RiskLevel::Low, RiskLevel::Medium] {
            assert_eq!(
                checks(S::Compliant, S::Compliant, S::Compliant, risk)
                    .verdict(),
                Verdict::Compliant,
            );
        }
    }

    #[test]
    fn high_risk_overrides_passing_sub_checks() {
        use CheckStatus as S;

        // Even with all three sub-checks passing.
        assert_eq!(
            checks(S::Compliant, S::Compliant, S::Compliant, RiskLevel::High)
                .verdict(),
            Verdict::NonCompliant,
        );
    }

    #[test]
    fn any_failing_sub_check_fails_the_aggregate() {
        use CheckStatus as S;

        assert_eq!(
            checks(S::NonCompliant, S::Compliant, S::Compliant, RiskLevel::Low)
                .verdict(),
            Verdict::NonCompliant,
        );
        assert_eq!(
            checks(S::Compliant, S::NonCompliant, S::Compliant, RiskLevel::Low)
                .verdict(),
            Verdict::NonCompliant,
        );
        assert_eq!(
            checks(S::Compliant, S::Compliant, S::NonCompliant, RiskLevel::Low)
                .verdict(),
            Verdict::NonCompliant,
        );
    }

    #[test]
    fn pending_sub_check_keeps_aggregate_pending() {
        use CheckStatus as S;

        assert_eq!(
            checks(S::Pending, S::Compliant, S::Compliant, RiskLevel::Low)
                .verdict(),
            Verdict::Pending,
        );

        // A failure still dominates a pending sub-check.
        assert_eq!(
            checks(S::Pending, S::NonCompliant, S::Compliant, RiskLevel::Low)
                .verdict(),
            Verdict::NonCompliant,
        );
        assert_eq!(
            checks(S::Pending, S::Compliant, S::Compliant, RiskLevel::High)
                .verdict(),
            Verdict::NonCompliant,
        );
    }
}
