//! [`Property`]-related REST API definitions.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{property, Property},
    infra::{notification, Notifier as _},
    query,
    read,
    Query as _,
};

use crate::{AsError, Context, Error, Service};

use super::parse;

/// Request of the [`register`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct RegisterRequest {
    /// Plot number of the parcel.
    pub plot_number: String,

    /// Region the parcel is located in.
    pub region: String,

    /// Sub-city the parcel is located in.
    pub sub_city: String,

    /// Kebele the parcel is located in.
    pub kebele: String,

    /// Street the parcel is located on.
    pub street: Option<String>,

    /// House number of the parcel.
    pub house_number: Option<String>,

    /// Kind of the parcel.
    pub kind: String,

    /// Area of the parcel in square meters.
    pub area: String,
}

/// Wire representation of a [`Property`].
#[derive(Debug, Serialize)]
pub struct PropertyResponse {
    /// ID of the property.
    pub id: String,

    /// Plot number of the property.
    pub plot_number: String,

    /// Region the property is located in.
    pub region: String,

    /// Sub-city the property is located in.
    pub sub_city: String,

    /// Kebele the property is located in.
    pub kebele: String,

    /// Street the property is located on.
    pub street: Option<String>,

    /// House number of the property.
    pub house_number: Option<String>,

    /// Kind of the property.
    pub kind: String,

    /// Area of the property in square meters.
    pub area: String,

    /// Registration status of the property.
    pub status: String,

    /// Indicator whether an active dispute exists for the property.
    pub has_active_dispute: bool,

    /// ID of the active transfer of the property, if any.
    pub current_transfer: Option<String>,

    /// ID of the current owner of the property.
    pub owner_id: String,

    /// Past owners of the property, oldest first.
    pub ownership_history: Vec<OwnershipRecordResponse>,

    /// When the property was registered.
    pub created_at: String,
}

/// Wire representation of a [`property::OwnershipRecord`].
#[derive(Debug, Serialize)]
pub struct OwnershipRecordResponse {
    /// ID of the past owner.
    pub owner_id: String,

    /// When the ownership was transferred away.
    pub transferred_at: String,
}

impl From<&Property> for PropertyResponse {
    fn from(p: &Property) -> Self {
        Self {
            id: p.id.to_string(),
            plot_number: p.plot_number.to_string(),
            region: p.location.region.to_string(),
            sub_city: p.location.sub_city.to_string(),
            kebele: p.location.kebele.to_string(),
            street: p.location.street.as_ref().map(ToString::to_string),
            house_number: p
                .location
                .house_number
                .as_ref()
                .map(ToString::to_string),
            kind: p.kind.to_string(),
            area: p.area.to_string(),
            status: p.status.to_string(),
            has_active_dispute: p.has_active_dispute,
            current_transfer: p
                .current_transfer
                .as_ref()
                .map(ToString::to_string),
            owner_id: p.owner_id.to_string(),
            ownership_history: p
                .ownership_history
                .iter()
                .map(|r| OwnershipRecordResponse {
                    owner_id: r.owner_id.to_string(),
                    transferred_at: r.transferred_at.to_rfc3339(),
                })
                .collect(),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Submits a new [`Property`] registration application.
///
/// # Errors
///
/// If the request is malformed or the plot is already registered.
pub async fn register(
    ctx: Context,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PropertyResponse>), Error> {
    let RegisterRequest {
        plot_number,
        region,
        sub_city,
        kebele,
        street,
        house_number,
        kind,
        area,
    } = req;

    let property = ctx
        .service()
        .execute(command::RegisterProperty {
            plot_number: parse(&plot_number, "plot number")?,
            region: parse(&region, "region")?,
            sub_city: parse(&sub_city, "sub-city")?,
            kebele: parse(&kebele, "kebele")?,
            street: street
                .as_deref()
                .map(|s| parse(s, "street"))
                .transpose()?,
            house_number: house_number
                .as_deref()
                .map(|n| parse(n, "house number"))
                .transpose()?,
            kind: parse(&kind, "property kind")?,
            area: parse(&area, "area")?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok((StatusCode::CREATED, Json(PropertyResponse::from(&property))))
}

/// Returns a [`Property`] by its ID.
///
/// # Errors
///
/// If no such [`Property`] exists.
pub async fn by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<String>,
) -> Result<Json<PropertyResponse>, Error> {
    let id: property::Id = parse(&id, "property id")?;

    let property = service
        .execute(query::property::ById::by(id))
        .await
        .map_err(|e| e.into_error())?
        .ok_or_else(not_found)?;

    Ok(Json(PropertyResponse::from(&property)))
}

/// Request of the [`transition`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct TransitionRequest {
    /// Target registration status.
    pub to: String,

    /// Notes explaining the transition.
    pub notes: Option<String>,
}

/// Requests a registration status transition of a [`Property`].
///
/// # Errors
///
/// If the edge is illegal or the actor lacks the capability.
pub async fn transition(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<PropertyResponse>, Error> {
    let TransitionRequest { to, notes } = req;

    let property = ctx
        .service()
        .execute(command::TransitionProperty {
            property_id: parse(&id, "property id")?,
            to: parse(&to, "property status")?,
            notes: notes.as_deref().map(|n| parse(n, "notes")).transpose()?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    notification::LogNotifier.notify(
        property.owner_id,
        notification::Event::ApplicationStatusChanged(property.id),
    );

    Ok(Json(PropertyResponse::from(&property)))
}

/// Query parameters of the [`logs`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct TrailParams {
    /// Number of entries to return.
    pub first: Option<u32>,

    /// Cursor after which to return entries.
    pub after: Option<String>,
}

/// Wire representation of an audit trail page.
#[derive(Debug, Serialize)]
pub struct TrailResponse {
    /// Entries of this page.
    pub entries: Vec<LogEntryResponse>,

    /// Cursor of the last entry on this page.
    pub end_cursor: Option<String>,

    /// Indicator whether more entries follow this page.
    pub has_next_page: bool,
}

/// Wire representation of an audit log entry.
#[derive(Debug, Serialize)]
pub struct LogEntryResponse {
    /// ID of the entry.
    pub id: String,

    /// ID of the property the entry is about.
    pub property_id: String,

    /// ID of the user who performed the action.
    pub performed_by: String,

    /// Role of the performer at the time of the action.
    pub actor_role: String,

    /// Performed action.
    pub action: String,

    /// Status snapshot after the action.
    pub status: String,

    /// Notes attached by the performer.
    pub notes: Option<String>,

    /// Free-form correlation metadata.
    pub metadata: Option<serde_json::Value>,

    /// When the entry was recorded.
    pub recorded_at: String,
}

/// Default page size of the [`logs`] handler.
const DEFAULT_PAGE_SIZE: u32 = 50;

/// Lists the audit trail of a [`Property`].
///
/// # Errors
///
/// If the parameters are malformed.
pub async fn logs(
    Extension(service): Extension<Service>,
    Path(id): Path<String>,
    Query(params): Query<TrailParams>,
) -> Result<Json<TrailResponse>, Error> {
    let property_id: property::Id = parse(&id, "property id")?;
    let TrailParams { first, after } = params;

    let after = after
        .as_deref()
        .map(|c| parse(c, "cursor"))
        .transpose()?;
    let arguments = read::audit::trail::Arguments::new(
        first,
        after,
        None,
        None,
        DEFAULT_PAGE_SIZE,
    )
    .ok_or_else(|| Error::bad_request(&"unsupported pagination arguments"))?;

    let page = service
        .execute(query::audit_trail::Page::by(
            read::audit::trail::Selector {
                arguments,
                filter: read::audit::trail::Filter { property_id },
            },
        ))
        .await
        .map_err(|e| e.into_error())?;

    let page_info = page.page_info();
    Ok(Json(TrailResponse {
        entries: page
            .edges
            .iter()
            .map(|edge| {
                let entry = &edge.node;
                LogEntryResponse {
                    id: entry.id.to_string(),
                    property_id: entry.property_id.to_string(),
                    performed_by: entry.performed_by.to_string(),
                    actor_role: entry.actor_role.to_string(),
                    action: entry.action.to_string(),
                    status: entry.snapshot.to_string(),
                    notes: entry.notes.as_ref().map(ToString::to_string),
                    metadata: entry.metadata.clone(),
                    recorded_at: entry.recorded_at.to_rfc3339(),
                }
            })
            .collect(),
        end_cursor: page_info.end_cursor.map(|c| c.to_string()),
        has_next_page: page_info.has_next_page,
    }))
}

/// Returns a not-found [`Error`].
pub(crate) fn not_found() -> Error {
    Error {
        code: "NOT_FOUND",
        status_code: StatusCode::NOT_FOUND,
        message: "No such entity exists".to_owned(),
        backtrace: None,
    }
}

impl AsError for command::register_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AlreadyRegistered(_) => Some(Error {
                code: "ALREADY_REGISTERED",
                status_code: StatusCode::CONFLICT,
                message: self.to_string(),
                backtrace: None,
            }),
        }
    }
}

impl AsError for command::transition_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::transition_property::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::IllegalTransition(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::MissingNotes => ("MISSING_NOTES", StatusCode::BAD_REQUEST),
            E::NotOfficial(_) | E::NotOwner(_) => {
                ("FORBIDDEN", StatusCode::FORBIDDEN)
            }
            E::PropertyNotExists(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
            E::ReservedTransition => {
                ("RESERVED_TRANSITION", StatusCode::BAD_REQUEST)
            }
        };
        Some(Error {
            code,
            status_code: status,
            message: self.to_string(),
            backtrace: None,
        })
    }
}
