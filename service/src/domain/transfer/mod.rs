//! [`Transfer`] definitions.

pub mod compliance;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money, Workflow};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{audit, document, property, timeline, user, Document};
#[cfg(doc)]
use crate::domain::Property;

pub use self::compliance::ComplianceChecks;

/// Single ownership-change attempt upon a [`Property`].
///
/// A [`Transfer`] that reached a terminal [`Status`] is never reopened: a
/// subsequent attempt requires a new [`Transfer`].
#[derive(Clone, Debug)]
pub struct Transfer {
    /// ID of this [`Transfer`].
    pub id: Id,

    /// ID of the [`Property`] being transferred.
    pub property_id: property::Id,

    /// ID of the [`User`] giving the ownership away.
    ///
    /// [`User`]: crate::domain::User
    pub previous_owner: user::Id,

    /// ID of the [`User`] receiving the ownership.
    ///
    /// [`User`]: crate::domain::User
    pub new_owner: user::Id,

    /// [`Kind`] of this [`Transfer`].
    pub kind: Kind,

    /// Declared value of this [`Transfer`].
    pub value: Money,

    /// [`Reason`] of this [`Transfer`].
    pub reason: Reason,

    /// [`Status`] of this [`Transfer`].
    pub status: Status,

    /// Evidence [`Document`]s of this [`Transfer`].
    pub documents: Vec<Document>,

    /// [`ComplianceChecks`] of this [`Transfer`], once recorded.
    pub compliance: Option<ComplianceChecks>,

    /// Append-only [`timeline::Entry`] sequence of this [`Transfer`].
    pub timeline: Vec<timeline::Entry>,

    /// [`DateTime`] when this [`Transfer`] was initiated.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Transfer`] reached a terminal [`Status`], if
    /// it did.
    pub decided_at: Option<DecisionDateTime>,
}

impl Transfer {
    /// Indicates whether this [`Transfer`] is active (non-terminal).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Moves this [`Transfer`] along the provided [`Event`] edge.
    ///
    /// Reaching a terminal [`Status`] stamps [`Transfer::decided_at`].
    ///
    /// # Errors
    ///
    /// If the transition table has no such edge from the current [`Status`].
    pub fn advance(&mut self, event: Event) -> Result<(), IllegalTransition> {
        self.status = self.status.apply(event).ok_or(IllegalTransition {
            from: self.status,
            event,
        })?;
        if self.status.is_terminal() {
            self.decided_at = Some(DateTimeOf::now());
        }
        Ok(())
    }

    /// Appends a [`timeline::Entry`] describing a performed action.
    pub fn record(
        &mut self,
        actor: user::Actor,
        action: audit::Action,
        notes: Option<audit::Notes>,
    ) {
        self.timeline.push(timeline::Entry::new(actor, action, notes));
    }

    /// Returns a mutable reference to the [`Document`] with the provided ID.
    pub fn document_mut(
        &mut self,
        id: document::Id,
    ) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    /// Indicates whether every [`Document`] of this [`Transfer`] carries an
    /// approving review.
    ///
    /// `false` is returned for a [`Transfer`] without any [`Document`]s.
    #[must_use]
    pub fn all_documents_approved(&self) -> bool {
        !self.documents.is_empty()
            && self.documents.iter().all(Document::is_approved)
    }
}

/// ID of a [`Transfer`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Kind of a [`Transfer`]."]
    enum Kind {
        #[doc = "Ownership sold."]
        Sale = 1,

        #[doc = "Ownership inherited."]
        Inheritance = 2,

        #[doc = "Ownership gifted."]
        Gift = 3,

        #[doc = "Ownership change mandated by a court order."]
        CourtOrder = 4,

        #[doc = "Parcel acquired by the government."]
        GovernmentAcquisition = 5,

        #[doc = "Parcels exchanged between owners."]
        Exchange = 6,

        #[doc = "Any other kind of ownership change."]
        Other = 7,
    }
}

define_kind! {
    #[doc = "Status of a [`Transfer`]."]
    enum Status {
        #[doc = "The [`Transfer`] has been initiated."]
        Initiated = 1,

        #[doc = "Evidence documents are awaited from the previous owner."]
        DocumentsPending = 2,

        #[doc = "Documents are under officer review."]
        UnderReview = 3,

        #[doc = "Documents passed review, compliance checks are awaited."]
        VerificationPending = 4,

        #[doc = "The [`Transfer`] is approved and awaits completion."]
        Approved = 5,

        #[doc = "The [`Transfer`] is rejected."]
        Rejected = 6,

        #[doc = "The [`Transfer`] is completed, ownership has changed."]
        Completed = 7,

        #[doc = "The [`Transfer`] is cancelled by its initiator."]
        Cancelled = 8,
    }
}

/// Event advancing a [`Transfer`] through its [`Status`] machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum Event {
    /// The previous owner submits evidence documents.
    SubmitDocuments,

    /// The officer returns documents for revision.
    ReturnDocuments,

    /// Every document passed the officer review.
    PassReview,

    /// Compliance checks aggregated to a non-compliant verdict.
    FailCompliance,

    /// The officer approves the [`Transfer`].
    Approve,

    /// The officer rejects the [`Transfer`].
    Reject,

    /// The admin completes the [`Transfer`].
    Complete,

    /// The previous owner cancels the [`Transfer`].
    Cancel,
}

impl Workflow for Status {
    type Event = Event;

    #[expect(
        clippy::wildcard_enum_match_arm,
        reason = "absent edges are the point of the table"
    )]
    fn apply(self, event: Event) -> Option<Self> {
        use Event as E;
        use Status as S;

        match (self, event) {
            (S::Initiated | S::DocumentsPending, E::SubmitDocuments) => {
                Some(S::UnderReview)
            }
            (S::UnderReview, E::ReturnDocuments) => Some(S::DocumentsPending),
            (S::UnderReview, E::PassReview) => Some(S::VerificationPending),
            (S::VerificationPending, E::FailCompliance) => Some(S::Rejected),
            (S::VerificationPending, E::Approve) => Some(S::Approved),
            (
                S::Initiated
                | S::DocumentsPending
                | S::UnderReview
                | S::VerificationPending
                | S::Approved,
                E::Reject,
            ) => Some(S::Rejected),
            (S::Approved, E::Complete) => Some(S::Completed),
            (
                S::Initiated | S::DocumentsPending | S::UnderReview,
                E::Cancel,
            ) => Some(S::Cancelled),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }
}

/// Reason of a [`Transfer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Reason(String);

impl Reason {
    /// Creates a new [`Reason`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `reason` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// Creates a new [`Reason`] if the given `reason` is valid.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        Self::check(&reason).then_some(Self(reason))
    }

    /// Checks whether the given `reason` is a valid [`Reason`].
    fn check(reason: impl AsRef<str>) -> bool {
        let reason = reason.as_ref();
        reason.trim() == reason && !reason.is_empty() && reason.len() <= 1000
    }
}

impl FromStr for Reason {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Reason`")
    }
}

/// Illegal [`Status`] transition attempt.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("illegal `Transfer` transition: {event} in {from}")]
pub struct IllegalTransition {
    /// [`Status`] the [`Transfer`] was in.
    pub from: Status,

    /// Attempted [`Event`].
    pub event: Event,
}

/// [`DateTime`] when a [`Transfer`] was initiated.
pub type CreationDateTime = DateTimeOf<(Transfer, unit::Creation)>;

/// [`DateTime`] when a [`Transfer`] reached a terminal [`Status`].
pub type DecisionDateTime = DateTimeOf<(Transfer, unit::Decision)>;

#[cfg(test)]
mod spec {
    use common::{DateTimeOf, Money, Workflow as _};

    use crate::domain::{audit, document, property, user, Document};

    use super::{Event, Reason, Status, Transfer};

    #[test]
    fn follows_transfer_transition_table() {
        use Event as E;
        use Status as S;

        for (from, event, to) in [
            (S::Initiated, E::SubmitDocuments, Some(S::UnderReview)),
            (S::DocumentsPending, E::SubmitDocuments, Some(S::UnderReview)),
            (S::UnderReview, E::SubmitDocuments, None),
            (S::UnderReview, E::ReturnDocuments, Some(S::DocumentsPending)),
            (S::UnderReview, E::PassReview, Some(S::VerificationPending)),
            (S::Initiated, E::PassReview, None),
            (S::VerificationPending, E::FailCompliance, Some(S::Rejected)),
            (S::UnderReview, E::FailCompliance, None),
            (S::VerificationPending, E::Approve, Some(S::Approved)),
            (S::UnderReview, E::Approve, None),
            (S::Initiated, E::Reject, Some(S::Rejected)),
            (S::Approved, E::Reject, Some(S::Rejected)),
            (S::Approved, E::Complete, Some(S::Completed)),
            (S::VerificationPending, E::Complete, None),
            (S::Initiated, E::Cancel, Some(S::Cancelled)),
            (S::DocumentsPending, E::Cancel, Some(S::Cancelled)),
            (S::UnderReview, E::Cancel, Some(S::Cancelled)),
            (S::VerificationPending, E::Cancel, None),
            (S::Approved, E::Cancel, None),
        ] {
            assert_eq!(from.apply(event), to, "edge {from} + {event}");
        }
    }

    fn transfer() -> Transfer {
        Transfer {
            id: super::Id::new(),
            property_id: property::Id::new(),
            previous_owner: user::Id::new(),
            new_owner: user::Id::new(),
            kind: super::Kind::Sale,
            value: "50000ETB".parse::<Money>().unwrap(),
            reason: Reason::new("Sale of the parcel").unwrap(),
            status: Status::Initiated,
            documents: Vec::new(),
            compliance: None,
            timeline: Vec::new(),
            created_at: DateTimeOf::now(),
            decided_at: None,
        }
    }

    fn doc(verdict: Option<document::Verdict>) -> Document {
        let mut doc = Document::from(document::Upload {
            kind: document::Kind::SaleAgreement,
            file: document::FileId::new("file-1").unwrap(),
        });
        doc.review = verdict.map(|verdict| document::Review {
            verdict,
            notes: audit::Notes::new("checked").unwrap(),
            reviewed_by: user::Id::new(),
            reviewed_at: DateTimeOf::now(),
        });
        doc
    }

    #[test]
    fn documents_approval_requires_every_verdict() {
        use document::Verdict as V;

        let mut t = transfer();
        assert!(!t.all_documents_approved());

        t.documents = vec![doc(Some(V::Approved)), doc(Some(V::Approved))];
        assert!(t.all_documents_approved());

        t.documents = vec![doc(Some(V::Approved)), doc(None)];
        assert!(!t.all_documents_approved());

        t.documents = vec![doc(Some(V::Approved)), doc(Some(V::Rejected))];
        assert!(!t.all_documents_approved());

        t.documents =
            vec![doc(Some(V::Approved)), doc(Some(V::NeedsRevision))];
        assert!(!t.all_documents_approved());
    }

    #[test]
    fn terminal_transition_stamps_decision_time() {
        let mut t = transfer();
        t.advance(Event::SubmitDocuments).unwrap();
        assert_eq!(t.decided_at, None);

        t.advance(Event::Cancel).unwrap();
        assert_eq!(t.status, Status::Cancelled);
        assert!(t.decided_at.is_some());

        // A terminal transfer is never reopened.
        assert!(t.advance(Event::SubmitDocuments).is_err());
        assert_eq!(t.status, Status::Cancelled);
    }

    #[test]
    fn terminal_states_accept_no_events() {
        use Event as E;
        use Status as S;

        for from in [S::Rejected, S::Completed, S::Cancelled] {
            assert!(from.is_terminal());
            for event in [
                E::SubmitDocuments,
                E::ReturnDocuments,
                E::PassReview,
                E::FailCompliance,
                E::Approve,
                E::Reject,
                E::Complete,
                E::Cancel,
            ] {
                assert_eq!(from.apply(event), None, "edge {from} + {event}");
            }
        }
    }
}
