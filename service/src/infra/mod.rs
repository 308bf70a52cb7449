//! Infrastructure implementations.

pub mod database;
pub mod notification;

#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
pub use self::{
    database::Database,
    notification::{Event as NotificationEvent, Notifier},
};
