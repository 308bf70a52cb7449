//! Application log definitions.
//!
//! Every state-changing operation of the registry appends exactly one
//! [`Entry`] describing who did what to which [`Property`]. Entries are never
//! updated or removed, so the storage layer exposes no such operation for
//! them.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Property;
use crate::domain::{dispute, property, transfer, user};

/// Single record of the append-only application log.
#[derive(Clone, Debug)]
pub struct Entry {
    /// ID of this [`Entry`].
    pub id: Id,

    /// ID of the [`Property`] this [`Entry`] is about.
    pub property_id: property::Id,

    /// ID of the [`User`] who performed the operation.
    ///
    /// [`User`]: crate::domain::User
    pub performed_by: user::Id,

    /// [`user::Role`] of the performer at the time of the operation.
    pub actor_role: user::Role,

    /// Performed [`Action`].
    pub action: Action,

    /// [`Snapshot`] of the affected entity status after the operation.
    pub snapshot: Snapshot,

    /// Free-text [`Notes`] attached by the performer.
    pub notes: Option<Notes>,

    /// Free-form correlation metadata.
    pub metadata: Option<serde_json::Value>,

    /// [`DateTime`] when this [`Entry`] was recorded.
    pub recorded_at: RecordingDateTime,
}

impl Entry {
    /// Creates a new [`Entry`] recorded now.
    #[must_use]
    pub fn new(
        property_id: property::Id,
        actor: user::Actor,
        action: Action,
        snapshot: impl Into<Snapshot>,
        notes: Option<Notes>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Id::new(),
            property_id,
            performed_by: actor.id,
            actor_role: actor.role,
            action,
            snapshot: snapshot.into(),
            notes,
            metadata,
            recorded_at: DateTimeOf::now(),
        }
    }
}

/// ID of an [`Entry`].
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

/// Closed vocabulary of loggable actions.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    /// A registration application was submitted.
    ApplicationSubmitted,

    /// Application documents passed validation.
    ApplicationDocumentsValidated,

    /// Registration payment was completed.
    ApplicationPaymentCompleted,

    /// The registration application was approved.
    ApplicationApproved,

    /// The registration application was rejected.
    ApplicationRejected,

    /// The application was returned to the applicant for an update.
    ApplicationUpdateRequested,

    /// An updated application was resubmitted.
    ApplicationResubmitted,

    /// An ownership transfer was initiated.
    TransferInitiated,

    /// Transfer evidence documents were uploaded.
    TransferDocumentsUploaded,

    /// Transfer documents passed the officer review.
    TransferDocumentsReviewed,

    /// Transfer documents were returned for revision.
    TransferDocumentsReturned,

    /// Transfer compliance checks were recorded.
    TransferComplianceRecorded,

    /// The transfer was approved.
    TransferApproved,

    /// The transfer was rejected.
    TransferRejected,

    /// The transfer was completed and ownership changed.
    TransferCompleted,

    /// The transfer was cancelled by its initiator.
    TransferCancelled,

    /// A dispute was submitted.
    DisputeSubmitted,

    /// Evidence was attached to a dispute.
    DisputeEvidenceAdded,

    /// A dispute review was started.
    DisputeReviewStarted,

    /// A dispute was assigned for investigation.
    DisputeInvestigationAssigned,

    /// A dispute mediation was scheduled.
    DisputeMediationScheduled,

    /// A dispute was resolved.
    DisputeResolved,

    /// A dispute was withdrawn by its disputant.
    DisputeWithdrawn,
}

/// Status snapshot of the entity affected by an [`Entry`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Snapshot(String);

impl From<property::Status> for Snapshot {
    fn from(status: property::Status) -> Self {
        Self(status.to_string())
    }
}

impl From<transfer::Status> for Snapshot {
    fn from(status: transfer::Status) -> Self {
        Self(status.to_string())
    }
}

impl From<dispute::Status> for Snapshot {
    fn from(status: dispute::Status) -> Self {
        Self(status.to_string())
    }
}

/// Free-text notes attached to an [`Entry`], a timeline record or a review.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Notes(String);

impl Notes {
    /// Creates new [`Notes`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `notes` match the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }

    /// Creates new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        Self::check(&notes).then_some(Self(notes))
    }

    /// Checks whether the given `notes` are valid [`Notes`].
    fn check(notes: impl AsRef<str>) -> bool {
        let notes = notes.as_ref();
        notes.trim() == notes && !notes.is_empty() && notes.len() <= 1000
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// [`DateTime`] when an [`Entry`] was recorded.
pub type RecordingDateTime = DateTimeOf<(Entry, unit::Recording)>;

#[cfg(test)]
mod spec {
    use super::Action;

    #[test]
    fn action_vocabulary_is_snake_case() {
        assert_eq!(Action::ApplicationApproved.to_string(), "application_approved");
        assert_eq!(Action::TransferInitiated.to_string(), "transfer_initiated");
        assert_eq!(Action::DisputeWithdrawn.to_string(), "dispute_withdrawn");

        assert_eq!(
            "transfer_completed".parse::<Action>().unwrap(),
            Action::TransferCompleted,
        );
        assert!("unknown_action".parse::<Action>().is_err());
    }
}
