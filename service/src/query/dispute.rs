//! [`Query`] collection related to a single [`Dispute`].

use common::operations::By;

use crate::domain::{dispute, Dispute};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Dispute`] by its [`dispute::Id`].
pub type ById = DatabaseQuery<By<Option<Dispute>, dispute::Id>>;
