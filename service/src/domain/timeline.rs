//! Timeline definitions.
//!
//! Both [`Transfer`]s and [`Dispute`]s carry an ordered, append-only sequence
//! of [`Entry`]s describing every action taken upon them. Entries are only
//! ever appended, never mutated or removed.
//!
//! [`Dispute`]: crate::domain::Dispute
//! [`Transfer`]: crate::domain::Transfer

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};

use crate::domain::{audit, user};

/// Single record in a workflow timeline.
#[derive(Clone, Debug)]
pub struct Entry {
    /// Performed [`audit::Action`].
    pub action: audit::Action,

    /// ID of the [`User`] who performed the action.
    ///
    /// [`User`]: crate::domain::User
    pub performed_by: user::Id,

    /// [`user::Role`] of the performer at the time of the action.
    pub actor_role: user::Role,

    /// Free-text [`audit::Notes`] attached by the performer.
    pub notes: Option<audit::Notes>,

    /// [`DateTime`] when this [`Entry`] was recorded.
    pub recorded_at: RecordingDateTime,
}

impl Entry {
    /// Creates a new [`Entry`] recorded now.
    #[must_use]
    pub fn new(
        actor: user::Actor,
        action: audit::Action,
        notes: Option<audit::Notes>,
    ) -> Self {
        Self {
            action,
            performed_by: actor.id,
            actor_role: actor.role,
            notes,
            recorded_at: DateTimeOf::now(),
        }
    }
}

/// [`DateTime`] when an [`Entry`] was recorded.
pub type RecordingDateTime = DateTimeOf<(Entry, unit::Recording)>;
