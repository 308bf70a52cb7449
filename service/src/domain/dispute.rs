//! [`Dispute`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Workflow};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{audit, property, timeline, user, Document};
#[cfg(doc)]
use crate::domain::Property;

/// Contested-ownership or documentation claim against a [`Property`].
///
/// At most one non-terminal [`Dispute`] may exist per [`Property`]; while one
/// does, new ownership transfers of that [`Property`] are rejected.
#[derive(Clone, Debug)]
pub struct Dispute {
    /// ID of this [`Dispute`].
    pub id: Id,

    /// ID of the disputed [`Property`].
    pub property_id: property::Id,

    /// ID of the [`User`] who filed this [`Dispute`].
    ///
    /// [`User`]: crate::domain::User
    pub disputant: user::Id,

    /// [`Kind`] of this [`Dispute`].
    pub kind: Kind,

    /// [`Title`] of this [`Dispute`].
    pub title: Title,

    /// [`Description`] of this [`Dispute`].
    pub description: Description,

    /// Evidence [`Document`]s supporting this [`Dispute`].
    pub evidence: Vec<Document>,

    /// [`Status`] of this [`Dispute`].
    pub status: Status,

    /// Append-only [`timeline::Entry`] sequence of this [`Dispute`].
    pub timeline: Vec<timeline::Entry>,

    /// [`DateTime`] when this [`Dispute`] was submitted.
    pub created_at: CreationDateTime,

    /// [`Resolution`] of this [`Dispute`], once resolved.
    pub resolution: Option<Resolution>,
}

impl Dispute {
    /// Indicates whether this [`Dispute`] is active (non-terminal).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Moves this [`Dispute`] along the provided [`Event`] edge.
    ///
    /// # Errors
    ///
    /// If the transition table has no such edge from the current [`Status`].
    pub fn advance(&mut self, event: Event) -> Result<(), IllegalTransition> {
        self.status = self.status.apply(event).ok_or(IllegalTransition {
            from: self.status,
            event,
        })?;
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
}

/// ID of a [`Dispute`].
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
    #[doc = "Kind of a [`Dispute`]."]
    enum Kind {
        #[doc = "Contested ownership of the parcel."]
        OwnershipDispute = 1,

        #[doc = "Contested parcel boundary."]
        BoundaryDispute = 2,

        #[doc = "Erroneous registry documentation."]
        DocumentationError = 3,

        #[doc = "Allegedly fraudulent registration."]
        FraudulentRegistration = 4,

        #[doc = "Contested inheritance of the parcel."]
        InheritanceDispute = 5,

        #[doc = "Any other claim."]
        Other = 6,
    }
}

define_kind! {
    #[doc = "Status of a [`Dispute`]."]
    enum Status {
        #[doc = "The [`Dispute`] has been submitted."]
        Submitted = 1,

        #[doc = "The [`Dispute`] is under officer review."]
        UnderReview = 2,

        #[doc = "The [`Dispute`] is being investigated."]
        Investigation = 3,

        #[doc = "A mediation between the parties is scheduled."]
        Mediation = 4,

        #[doc = "The [`Dispute`] is resolved."]
        Resolved = 5,

        #[doc = "The [`Dispute`] is withdrawn by its disputant."]
        Withdrawn = 6,
    }
}

/// Event advancing a [`Dispute`] through its [`Status`] machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum Event {
    /// An officer begins reviewing the [`Dispute`].
    BeginReview,

    /// The [`Dispute`] is assigned for investigation.
    AssignInvestigation,

    /// A mediation between the parties is scheduled.
    ScheduleMediation,

    /// An officer resolves the [`Dispute`].
    Resolve,

    /// The disputant withdraws the [`Dispute`].
    Withdraw,
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
            (S::Submitted, E::BeginReview) => Some(S::UnderReview),
            (S::UnderReview, E::AssignInvestigation) => Some(S::Investigation),
            (S::Investigation, E::ScheduleMediation) => Some(S::Mediation),
            (
                S::UnderReview | S::Investigation | S::Mediation,
                E::Resolve,
            ) => Some(S::Resolved),
            (
                S::Submitted | S::UnderReview | S::Investigation,
                E::Withdraw,
            ) => Some(S::Withdrawn),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Withdrawn)
    }
}

/// Title of a [`Dispute`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 256
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Dispute`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` matches the
    /// format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 4000
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Resolution of a [`Dispute`].
#[derive(Clone, Debug)]
pub struct Resolution {
    /// [`Outcome`] of the [`Dispute`].
    pub outcome: Outcome,

    /// ID of the [`User`] who resolved the [`Dispute`].
    ///
    /// [`User`]: crate::domain::User
    pub resolved_by: user::Id,

    /// [`DateTime`] when the [`Dispute`] was resolved.
    pub resolved_at: ResolutionDateTime,
}

/// Outcome of a resolved [`Dispute`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Outcome(String);

impl Outcome {
    /// Creates a new [`Outcome`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `outcome` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(outcome: impl Into<String>) -> Self {
        Self(outcome.into())
    }

    /// Creates a new [`Outcome`] if the given `outcome` is valid.
    #[must_use]
    pub fn new(outcome: impl Into<String>) -> Option<Self> {
        let outcome = outcome.into();
        Self::check(&outcome).then_some(Self(outcome))
    }

    /// Checks whether the given `outcome` is a valid [`Outcome`].
    fn check(outcome: impl AsRef<str>) -> bool {
        let outcome = outcome.as_ref();
        outcome.trim() == outcome
            && !outcome.is_empty()
            && outcome.len() <= 1000
    }
}

impl FromStr for Outcome {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Outcome`")
    }
}

/// Illegal [`Status`] transition attempt.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("illegal `Dispute` transition: {event} in {from}")]
pub struct IllegalTransition {
    /// [`Status`] the [`Dispute`] was in.
    pub from: Status,

    /// Attempted [`Event`].
    pub event: Event,
}

/// [`DateTime`] when a [`Dispute`] was submitted.
pub type CreationDateTime = DateTimeOf<(Dispute, unit::Creation)>;

/// [`DateTime`] when a [`Dispute`] was resolved.
pub type ResolutionDateTime = DateTimeOf<(Dispute, unit::Decision)>;

#[cfg(test)]
mod spec {
    use common::Workflow as _;

    use super::{Event, Status};

    #[test]
    fn follows_dispute_transition_table() {
        use Event as E;
        use Status as S;

        for (from, event, to) in [
            (S::Submitted, E::BeginReview, Some(S::UnderReview)),
            (S::UnderReview, E::AssignInvestigation, Some(S::Investigation)),
            (S::Investigation, E::ScheduleMediation, Some(S::Mediation)),
            (S::Submitted, E::AssignInvestigation, None),
            (S::Submitted, E::ScheduleMediation, None),
            (S::Submitted, E::Resolve, None),
            (S::UnderReview, E::Resolve, Some(S::Resolved)),
            (S::Investigation, E::Resolve, Some(S::Resolved)),
            (S::Mediation, E::Resolve, Some(S::Resolved)),
            (S::Submitted, E::Withdraw, Some(S::Withdrawn)),
            (S::UnderReview, E::Withdraw, Some(S::Withdrawn)),
            (S::Investigation, E::Withdraw, Some(S::Withdrawn)),
            (S::Mediation, E::Withdraw, None),
            (S::Resolved, E::Withdraw, None),
            (S::Withdrawn, E::BeginReview, None),
        ] {
            assert_eq!(from.apply(event), to, "edge {from} + {event}");
        }
    }

    #[test]
    fn terminal_states() {
        assert!(Status::Resolved.is_terminal());
        assert!(Status::Withdrawn.is_terminal());
        assert!(Status::Submitted.is_active());
        assert!(Status::Mediation.is_active());
    }
}
