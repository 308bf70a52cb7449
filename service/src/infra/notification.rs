//! Notification delivery contract.
//!
//! Delivery is fire-and-forget: a failed notification must never fail the
//! workflow operation that produced it, so the contract is infallible and
//! implementations swallow their own errors.

use crate::domain::{dispute, property, transfer, user};

/// Outbound notification event.
#[derive(Clone, Copy, Debug)]
pub enum Event {
    /// The status of a registration application changed.
    ApplicationStatusChanged(property::Id),

    /// An ownership transfer was initiated.
    TransferInitiated(transfer::Id),

    /// An ownership transfer was approved, rejected or cancelled.
    TransferDecided(transfer::Id),

    /// An ownership transfer was completed.
    TransferCompleted(transfer::Id),

    /// A dispute was submitted.
    DisputeSubmitted(dispute::Id),

    /// A dispute was resolved or withdrawn.
    DisputeClosed(dispute::Id),
}

/// Delivery channel for [`User`] notifications.
///
/// [`User`]: crate::domain::User
pub trait Notifier {
    /// Notifies the provided [`User`] about the [`Event`].
    ///
    /// [`User`]: crate::domain::User
    fn notify(&self, user: user::Id, event: Event);
}

/// [`Notifier`] writing notifications to the log.
///
/// Stands in for the real delivery channel in deployments without one.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, user: user::Id, event: Event) {
        tracing::info!("notifying `User(id: {user})` about {event:?}");
    }
}
