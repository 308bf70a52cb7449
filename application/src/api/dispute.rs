//! [`Dispute`]-related REST API definitions.

use axum::{extract::Path, Extension, Json};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{dispute, Dispute},
    infra::{notification, Notifier as _},
    query,
    Query as _,
};

use crate::{AsError, Context, Error, Service};

use super::{
    parse, property::not_found, DocumentResponse, DocumentUploadRequest,
    TimelineEntryResponse,
};

/// Request of the [`submit`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct SubmitRequest {
    /// ID of the disputed property.
    pub property_id: String,

    /// Kind of the dispute.
    pub dispute_type: String,

    /// Title of the dispute.
    pub title: String,

    /// Description of the dispute.
    pub description: String,

    /// Initial evidence of the dispute.
    #[serde(default)]
    pub evidence: Vec<DocumentUploadRequest>,
}

/// Wire representation of a [`Dispute`].
#[derive(Debug, Serialize)]
pub struct DisputeResponse {
    /// ID of the dispute.
    pub id: String,

    /// ID of the disputed property.
    pub property_id: String,

    /// ID of the account which filed the dispute.
    pub disputant: String,

    /// Kind of the dispute.
    pub dispute_type: String,

    /// Title of the dispute.
    pub title: String,

    /// Description of the dispute.
    pub description: String,

    /// Status of the dispute.
    pub status: String,

    /// Evidence of the dispute.
    pub evidence: Vec<DocumentResponse>,

    /// Timeline of the dispute.
    pub timeline: Vec<TimelineEntryResponse>,

    /// When the dispute was submitted.
    pub created_at: String,

    /// Resolution of the dispute, once resolved.
    pub resolution: Option<ResolutionResponse>,
}

/// Wire representation of a [`dispute::Resolution`].
#[derive(Debug, Serialize)]
pub struct ResolutionResponse {
    /// Outcome of the dispute.
    pub outcome: String,

    /// ID of the officer who resolved the dispute.
    pub resolved_by: String,

    /// When the dispute was resolved.
    pub resolved_at: String,
}

impl From<&Dispute> for DisputeResponse {
    fn from(d: &Dispute) -> Self {
        Self {
            id: d.id.to_string(),
            property_id: d.property_id.to_string(),
            disputant: d.disputant.to_string(),
            dispute_type: d.kind.to_string(),
            title: d.title.to_string(),
            description: d.description.to_string(),
            status: d.status.to_string(),
            evidence: d.evidence.iter().map(Into::into).collect(),
            timeline: d.timeline.iter().map(Into::into).collect(),
            created_at: d.created_at.to_rfc3339(),
            resolution: d.resolution.as_ref().map(|r| ResolutionResponse {
                outcome: r.outcome.to_string(),
                resolved_by: r.resolved_by.to_string(),
                resolved_at: r.resolved_at.to_rfc3339(),
            }),
        }
    }
}

/// Submits a new [`Dispute`].
///
/// # Errors
///
/// If the property doesn't exist or already has an active dispute.
pub async fn submit(
    ctx: Context,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<DisputeResponse>), Error> {
    let SubmitRequest {
        property_id,
        dispute_type,
        title,
        description,
        evidence,
    } = req;

    let dispute = ctx
        .service()
        .execute(command::SubmitDispute {
            property_id: parse(&property_id, "property id")?,
            kind: parse(&dispute_type, "dispute type")?,
            title: parse(&title, "title")?,
            description: parse(&description, "description")?,
            evidence: evidence
                .into_iter()
                .map(DocumentUploadRequest::into_upload)
                .collect::<Result<_, _>>()?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    notification::LogNotifier.notify(
        dispute.disputant,
        notification::Event::DisputeSubmitted(dispute.id),
    );

    Ok((StatusCode::CREATED, Json(DisputeResponse::from(&dispute))))
}

/// Returns a [`Dispute`] by its ID.
///
/// # Errors
///
/// If no such [`Dispute`] exists.
pub async fn by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<String>,
) -> Result<Json<DisputeResponse>, Error> {
    let id: dispute::Id = parse(&id, "dispute id")?;

    let dispute = service
        .execute(query::dispute::ById::by(id))
        .await
        .map_err(|e| e.into_error())?
        .ok_or_else(not_found)?;

    Ok(Json(DisputeResponse::from(&dispute)))
}

/// Request of the [`add_evidence`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct EvidenceRequest {
    /// Uploaded evidence.
    pub evidence: Vec<DocumentUploadRequest>,
}

/// Attaches additional evidence to a [`Dispute`].
///
/// # Errors
///
/// If the [`Dispute`] is already closed.
pub async fn add_evidence(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<EvidenceRequest>,
) -> Result<Json<DisputeResponse>, Error> {
    let dispute = ctx
        .service()
        .execute(command::AddDisputeEvidence {
            dispute_id: parse(&id, "dispute id")?,
            evidence: req
                .evidence
                .into_iter()
                .map(DocumentUploadRequest::into_upload)
                .collect::<Result<_, _>>()?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(DisputeResponse::from(&dispute)))
}

/// Request of the [`withdraw`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct WithdrawRequest {
    /// Reason of the withdrawal.
    pub reason: String,
}

/// Withdraws a [`Dispute`] by its disputant.
///
/// # Errors
///
/// If the actor is not the disputant or the [`Dispute`] is closed.
pub async fn withdraw(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<WithdrawRequest>,
) -> Result<Json<DisputeResponse>, Error> {
    let dispute = ctx
        .service()
        .execute(command::WithdrawDispute {
            dispute_id: parse(&id, "dispute id")?,
            reason: parse(&req.reason, "reason")?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    notification::LogNotifier.notify(
        dispute.disputant,
        notification::Event::DisputeClosed(dispute.id),
    );

    Ok(Json(DisputeResponse::from(&dispute)))
}

/// Request of the [`advance`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct AdvanceRequest {
    /// Step to advance the dispute to: `REVIEW`, `INVESTIGATION` or
    /// `MEDIATION`.
    pub step: String,

    /// Notes explaining the step.
    pub notes: Option<String>,
}

/// Advances a [`Dispute`] along the resolution ladder.
///
/// # Errors
///
/// If the edge is illegal or the actor lacks the capability.
pub async fn advance(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<DisputeResponse>, Error> {
    let AdvanceRequest { step, notes } = req;

    let step = match step.as_str() {
        "REVIEW" => command::advance_dispute::Step::Review,
        "INVESTIGATION" => command::advance_dispute::Step::Investigation,
        "MEDIATION" => command::advance_dispute::Step::Mediation,
        _ => return Err(Error::bad_request(&"invalid step")),
    };

    let dispute = ctx
        .service()
        .execute(command::AdvanceDispute {
            dispute_id: parse(&id, "dispute id")?,
            step,
            notes: notes.as_deref().map(|n| parse(n, "notes")).transpose()?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(DisputeResponse::from(&dispute)))
}

/// Request of the [`resolve`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct ResolveRequest {
    /// Outcome of the dispute.
    pub outcome: String,

    /// Notes accompanying the resolution.
    pub notes: Option<String>,
}

/// Resolves a [`Dispute`] with an outcome.
///
/// # Errors
///
/// If the edge is illegal or the actor lacks the capability.
pub async fn resolve(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<DisputeResponse>, Error> {
    let ResolveRequest { outcome, notes } = req;

    let dispute = ctx
        .service()
        .execute(command::ResolveDispute {
            dispute_id: parse(&id, "dispute id")?,
            outcome: parse(&outcome, "outcome")?,
            notes: notes.as_deref().map(|n| parse(n, "notes")).transpose()?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    notification::LogNotifier.notify(
        dispute.disputant,
        notification::Event::DisputeClosed(dispute.id),
    );

    Ok(Json(DisputeResponse::from(&dispute)))
}

impl AsError for command::submit_dispute::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::submit_dispute::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::DisputeAlreadyActive(_) => {
                ("DISPUTE_ALREADY_ACTIVE", StatusCode::CONFLICT)
            }
            E::PropertyNotExists(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
        };
        Some(Error {
            code,
            status_code: status,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for command::withdraw_dispute::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::withdraw_dispute::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::DisputeNotExists(_) | E::PropertyNotExists(_) => {
                ("NOT_FOUND", StatusCode::NOT_FOUND)
            }
            E::IllegalTransition(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::NotDisputant(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
        };
        Some(Error {
            code,
            status_code: status,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for command::add_dispute_evidence::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::add_dispute_evidence::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::DisputeClosed(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::DisputeNotExists(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
            E::NoEvidence => ("NO_EVIDENCE", StatusCode::BAD_REQUEST),
            E::NotDisputant(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
        };
        Some(Error {
            code,
            status_code: status,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for command::advance_dispute::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::advance_dispute::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::DisputeNotExists(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
            E::IllegalTransition(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::NotOfficial(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
        };
        Some(Error {
            code,
            status_code: status,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for command::resolve_dispute::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::resolve_dispute::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::DisputeNotExists(_) | E::PropertyNotExists(_) => {
                ("NOT_FOUND", StatusCode::NOT_FOUND)
            }
            E::IllegalTransition(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::NotOfficial(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
        };
        Some(Error {
            code,
            status_code: status,
            message: self.to_string(),
            backtrace: None,
        })
    }
}
