//! [`Dispute`] read model definitions.
//!
//! [`Dispute`]: crate::domain::Dispute

use derive_more::Deref;

/// Indicator whether any *other* non-terminal [`Dispute`] exists for a
/// property, besides an excluded one.
///
/// Used to recompute `Property::has_active_dispute` when a [`Dispute`]
/// reaches a terminal state: the flag is derived, not flipped.
///
/// [`Dispute`]: crate::domain::Dispute
#[derive(Clone, Copy, Debug, Deref)]
pub struct OtherActive(pub bool);
