//! [`Query`] collection over the application log.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`read::audit::trail::Page`] of a property's audit trail.
pub type Page = DatabaseQuery<
    By<read::audit::trail::Page, read::audit::trail::Selector>,
>;
