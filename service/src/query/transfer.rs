//! [`Query`] collection related to a single [`Transfer`].

use common::operations::By;

use crate::domain::{transfer, Transfer};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Transfer`] by its [`transfer::Id`].
pub type ById = DatabaseQuery<By<Option<Transfer>, transfer::Id>>;
