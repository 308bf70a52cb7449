//! [`Transfer`]-related REST API definitions.

use axum::{extract::Path, Extension, Json};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{
        transfer::{self, compliance},
        Transfer,
    },
    infra::{notification, Notifier as _},
    query,
    Query as _,
};

use crate::{AsError, Context, Error, Service};

use super::{
    parse, property::not_found, DocumentResponse, DocumentUploadRequest,
    TimelineEntryResponse,
};

/// Request of the [`initiate`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct InitiateRequest {
    /// ID of the property to transfer.
    pub property_id: String,

    /// Email of the account receiving the ownership.
    pub new_owner_email: String,

    /// Kind of the transfer.
    pub transfer_type: String,

    /// Declared value of the transfer, e.g. `50000ETB`.
    pub value: String,

    /// Reason of the transfer.
    pub reason: String,
}

/// Wire representation of a [`Transfer`].
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// ID of the transfer.
    pub id: String,

    /// ID of the property being transferred.
    pub property_id: String,

    /// ID of the account giving the ownership away.
    pub previous_owner: String,

    /// ID of the account receiving the ownership.
    pub new_owner: String,

    /// Kind of the transfer.
    pub transfer_type: String,

    /// Declared value of the transfer.
    pub value: String,

    /// Reason of the transfer.
    pub reason: String,

    /// Status of the transfer.
    pub status: String,

    /// Evidence documents of the transfer.
    pub documents: Vec<DocumentResponse>,

    /// Compliance checks of the transfer, once recorded.
    pub compliance: Option<ComplianceResponse>,

    /// Timeline of the transfer.
    pub timeline: Vec<TimelineEntryResponse>,

    /// When the transfer was initiated.
    pub created_at: String,

    /// When the transfer reached a terminal status, if it did.
    pub decided_at: Option<String>,
}

/// Wire representation of [`compliance::ComplianceChecks`].
#[derive(Debug, Serialize)]
pub struct ComplianceResponse {
    /// Ethiopian law compliance sub-check.
    pub ethiopian_law: CheckResponse,

    /// Tax clearance sub-check.
    pub tax_clearance: CheckResponse,

    /// Fraud prevention sub-check.
    pub fraud_prevention: FraudCheckResponse,

    /// Aggregate verdict of the three sub-checks.
    pub verdict: String,
}

/// Wire representation of a [`compliance::Check`].
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    /// Status of the sub-check.
    pub status: String,

    /// Officer notes on the sub-check.
    pub notes: Option<String>,
}

/// Wire representation of a [`compliance::FraudCheck`].
#[derive(Debug, Serialize)]
pub struct FraudCheckResponse {
    /// Status of the sub-check.
    pub status: String,

    /// Assessed risk level.
    pub risk_level: String,

    /// Officer notes on the sub-check.
    pub notes: Option<String>,
}

/// Renders a [`compliance::Verdict`] for the wire.
fn verdict_str(verdict: compliance::Verdict) -> &'static str {
    match verdict {
        compliance::Verdict::Compliant => "COMPLIANT",
        compliance::Verdict::NonCompliant => "NON_COMPLIANT",
        compliance::Verdict::Pending => "PENDING",
    }
}

impl From<&Transfer> for TransferResponse {
    fn from(t: &Transfer) -> Self {
        Self {
            id: t.id.to_string(),
            property_id: t.property_id.to_string(),
            previous_owner: t.previous_owner.to_string(),
            new_owner: t.new_owner.to_string(),
            transfer_type: t.kind.to_string(),
            value: t.value.to_string(),
            reason: t.reason.to_string(),
            status: t.status.to_string(),
            documents: t.documents.iter().map(Into::into).collect(),
            compliance: t.compliance.as_ref().map(|c| ComplianceResponse {
                ethiopian_law: CheckResponse {
                    status: c.ethiopian_law.status.to_string(),
                    notes: c
                        .ethiopian_law
                        .notes
                        .as_ref()
                        .map(ToString::to_string),
                },
                tax_clearance: CheckResponse {
                    status: c.tax_clearance.status.to_string(),
                    notes: c
                        .tax_clearance
                        .notes
                        .as_ref()
                        .map(ToString::to_string),
                },
                fraud_prevention: FraudCheckResponse {
                    status: c.fraud_prevention.check.status.to_string(),
                    risk_level: c.fraud_prevention.risk_level.to_string(),
                    notes: c
                        .fraud_prevention
                        .check
                        .notes
                        .as_ref()
                        .map(ToString::to_string),
                },
                verdict: verdict_str(c.verdict()).to_owned(),
            }),
            timeline: t.timeline.iter().map(Into::into).collect(),
            created_at: t.created_at.to_rfc3339(),
            decided_at: t.decided_at.as_ref().map(|d| d.to_rfc3339()),
        }
    }
}

/// Initiates a new [`Transfer`].
///
/// # Errors
///
/// If the preconditions don't hold.
pub async fn initiate(
    ctx: Context,
    Json(req): Json<InitiateRequest>,
) -> Result<(StatusCode, Json<TransferResponse>), Error> {
    let InitiateRequest {
        property_id,
        new_owner_email,
        transfer_type,
        value,
        reason,
    } = req;

    let transfer = ctx
        .service()
        .execute(command::InitiateTransfer {
            property_id: parse(&property_id, "property id")?,
            new_owner_email: parse(&new_owner_email, "email")?,
            kind: parse(&transfer_type, "transfer type")?,
            value: parse(&value, "value")?,
            reason: parse(&reason, "reason")?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    notification::LogNotifier.notify(
        transfer.new_owner,
        notification::Event::TransferInitiated(transfer.id),
    );

    Ok((StatusCode::CREATED, Json(TransferResponse::from(&transfer))))
}

/// Returns a [`Transfer`] by its ID.
///
/// # Errors
///
/// If no such [`Transfer`] exists.
pub async fn by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<String>,
) -> Result<Json<TransferResponse>, Error> {
    let id: transfer::Id = parse(&id, "transfer id")?;

    let transfer = service
        .execute(query::transfer::ById::by(id))
        .await
        .map_err(|e| e.into_error())?
        .ok_or_else(not_found)?;

    Ok(Json(TransferResponse::from(&transfer)))
}

/// Request of the [`upload_documents`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadDocumentsRequest {
    /// Uploaded documents.
    pub documents: Vec<DocumentUploadRequest>,
}

/// Uploads evidence documents of a [`Transfer`].
///
/// # Errors
///
/// If the [`Transfer`] is not awaiting documents.
pub async fn upload_documents(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<UploadDocumentsRequest>,
) -> Result<Json<TransferResponse>, Error> {
    let transfer = ctx
        .service()
        .execute(command::UploadTransferDocuments {
            transfer_id: parse(&id, "transfer id")?,
            documents: req
                .documents
                .into_iter()
                .map(DocumentUploadRequest::into_upload)
                .collect::<Result<_, _>>()?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(TransferResponse::from(&transfer)))
}

/// Request of the [`review_documents`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct ReviewDocumentsRequest {
    /// Per-document verdicts.
    pub reviews: Vec<ReviewItemRequest>,
}

/// Verdict upon a single document.
#[derive(Clone, Debug, Deserialize)]
pub struct ReviewItemRequest {
    /// ID of the reviewed document.
    pub document_id: String,

    /// Verdict upon the document.
    pub verdict: String,

    /// Notes explaining the verdict.
    pub notes: String,
}

/// Records officer verdicts upon the documents of a [`Transfer`].
///
/// # Errors
///
/// If the [`Transfer`] is not under review.
pub async fn review_documents(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<ReviewDocumentsRequest>,
) -> Result<Json<TransferResponse>, Error> {
    let reviews = req
        .reviews
        .into_iter()
        .map(|r| {
            Ok(command::review_transfer_documents::DocumentReview {
                document_id: parse(&r.document_id, "document id")?,
                verdict: parse(&r.verdict, "verdict")?,
                notes: parse(&r.notes, "notes")?,
            })
        })
        .collect::<Result<_, Error>>()?;

    let transfer = ctx
        .service()
        .execute(command::ReviewTransferDocuments {
            transfer_id: parse(&id, "transfer id")?,
            reviews,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(TransferResponse::from(&transfer)))
}

/// Request of the [`compliance`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct ComplianceRequest {
    /// Ethiopian law compliance sub-check.
    pub ethiopian_law: CheckRequest,

    /// Tax clearance sub-check.
    pub tax_clearance: CheckRequest,

    /// Fraud prevention sub-check.
    pub fraud_prevention: FraudCheckRequest,
}

/// Single sub-check record.
#[derive(Clone, Debug, Deserialize)]
pub struct CheckRequest {
    /// Status of the sub-check.
    pub status: String,

    /// Officer notes on the sub-check.
    pub notes: Option<String>,
}

impl CheckRequest {
    /// Converts this request into a [`compliance::Check`].
    fn into_check(self) -> Result<compliance::Check, Error> {
        Ok(compliance::Check {
            status: parse(&self.status, "check status")?,
            notes: self
                .notes
                .as_deref()
                .map(|n| parse(n, "notes"))
                .transpose()?,
        })
    }
}

/// Fraud prevention sub-check record.
#[derive(Clone, Debug, Deserialize)]
pub struct FraudCheckRequest {
    /// Status of the sub-check.
    pub status: String,

    /// Assessed risk level.
    pub risk_level: String,

    /// Officer notes on the sub-check.
    pub notes: Option<String>,
}

/// Records the compliance checks of a [`Transfer`].
///
/// # Errors
///
/// If the [`Transfer`] is not awaiting verification.
pub async fn compliance(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<ComplianceRequest>,
) -> Result<Json<TransferResponse>, Error> {
    let ComplianceRequest {
        ethiopian_law,
        tax_clearance,
        fraud_prevention,
    } = req;

    let checks = compliance::ComplianceChecks {
        ethiopian_law: ethiopian_law.into_check()?,
        tax_clearance: tax_clearance.into_check()?,
        fraud_prevention: compliance::FraudCheck {
            check: compliance::Check {
                status: parse(&fraud_prevention.status, "check status")?,
                notes: fraud_prevention
                    .notes
                    .as_deref()
                    .map(|n| parse(n, "notes"))
                    .transpose()?,
            },
            risk_level: parse(&fraud_prevention.risk_level, "risk level")?,
        },
    };

    let transfer = ctx
        .service()
        .execute(command::PerformComplianceChecks {
            transfer_id: parse(&id, "transfer id")?,
            checks,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    if transfer.status == transfer::Status::Rejected {
        notification::LogNotifier.notify(
            transfer.previous_owner,
            notification::Event::TransferDecided(transfer.id),
        );
    }

    Ok(Json(TransferResponse::from(&transfer)))
}

/// Request of the [`approve`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct ApproveRequest {
    /// Decision upon the transfer: `APPROVED` or `REJECTED`.
    pub decision: String,

    /// Notes explaining the decision.
    pub notes: Option<String>,
}

/// Approves or rejects a [`Transfer`].
///
/// # Errors
///
/// If the [`Transfer`] cannot be decided upon.
pub async fn approve(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<TransferResponse>, Error> {
    let ApproveRequest { decision, notes } = req;

    let decision = match decision.as_str() {
        "APPROVED" => command::approve_transfer::Decision::Approved,
        "REJECTED" => command::approve_transfer::Decision::Rejected,
        _ => return Err(Error::bad_request(&"invalid decision")),
    };

    let transfer = ctx
        .service()
        .execute(command::ApproveTransfer {
            transfer_id: parse(&id, "transfer id")?,
            decision,
            notes: notes.as_deref().map(|n| parse(n, "notes")).transpose()?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    notification::LogNotifier.notify(
        transfer.previous_owner,
        notification::Event::TransferDecided(transfer.id),
    );

    Ok(Json(TransferResponse::from(&transfer)))
}

/// Completes an approved [`Transfer`].
///
/// # Errors
///
/// If the [`Transfer`] is not approved.
pub async fn complete(
    ctx: Context,
    Path(id): Path<String>,
) -> Result<Json<TransferResponse>, Error> {
    let transfer = ctx
        .service()
        .execute(command::CompleteTransfer {
            transfer_id: parse(&id, "transfer id")?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    notification::LogNotifier.notify(
        transfer.new_owner,
        notification::Event::TransferCompleted(transfer.id),
    );

    Ok(Json(TransferResponse::from(&transfer)))
}

/// Request of the [`cancel`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct CancelRequest {
    /// Reason of the cancellation.
    pub reason: String,
}

/// Cancels a not-yet-decided [`Transfer`].
///
/// # Errors
///
/// If the [`Transfer`] is already decided upon.
pub async fn cancel(
    ctx: Context,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<TransferResponse>, Error> {
    let transfer = ctx
        .service()
        .execute(command::CancelTransfer {
            transfer_id: parse(&id, "transfer id")?,
            reason: parse(&req.reason, "reason")?,
            actor: ctx.actor(),
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(TransferResponse::from(&transfer)))
}

impl AsError for command::initiate_transfer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::initiate_transfer::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::ActiveDisputeBlocksTransfer(_) => {
                ("ACTIVE_DISPUTE_BLOCKS_TRANSFER", StatusCode::CONFLICT)
            }
            E::NegativeValue(_) => {
                ("NEGATIVE_VALUE", StatusCode::BAD_REQUEST)
            }
            E::NotOwner(_) => ("NOT_OWNER", StatusCode::FORBIDDEN),
            E::PropertyNotApproved(_) => {
                ("PROPERTY_NOT_APPROVED", StatusCode::CONFLICT)
            }
            E::PropertyNotExists(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
            E::SelfTransferNotAllowed(_) => {
                ("SELF_TRANSFER_NOT_ALLOWED", StatusCode::BAD_REQUEST)
            }
            E::TransferAlreadyActive(_) => {
                ("TRANSFER_ALREADY_ACTIVE", StatusCode::CONFLICT)
            }
            E::TransfereeNotRegistered(_) => {
                ("INVALID_TRANSFEREE", StatusCode::BAD_REQUEST)
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

impl AsError for command::upload_transfer_documents::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::upload_transfer_documents::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::IllegalTransition(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::NoDocuments => ("NO_DOCUMENTS", StatusCode::BAD_REQUEST),
            E::NotInitiator(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
            E::TransferNotExists(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
        };
        Some(Error {
            code,
            status_code: status,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for command::review_transfer_documents::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::review_transfer_documents::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::DocumentNotExists(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
            E::IllegalTransition(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::NoReviews => ("NO_REVIEWS", StatusCode::BAD_REQUEST),
            E::NotOfficial(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
            E::TransferNotExists(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
        };
        Some(Error {
            code,
            status_code: status,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for command::perform_compliance_checks::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::perform_compliance_checks::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::IllegalTransition(_) | E::NotAwaitingVerification(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::NotOfficial(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
            E::PropertyNotExists(_) | E::TransferNotExists(_) => {
                ("NOT_FOUND", StatusCode::NOT_FOUND)
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

impl AsError for command::approve_transfer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::approve_transfer::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::ActiveDisputeBlocksTransfer(_) => {
                ("ACTIVE_DISPUTE_BLOCKS_TRANSFER", StatusCode::CONFLICT)
            }
            E::ComplianceNotSatisfied(_) => {
                ("COMPLIANCE_NOT_SATISFIED", StatusCode::CONFLICT)
            }
            E::IllegalTransition(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::MissingRejectionNotes => {
                ("MISSING_NOTES", StatusCode::BAD_REQUEST)
            }
            E::NotOfficial(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
            E::PropertyNotExists(_) | E::TransferNotExists(_) => {
                ("NOT_FOUND", StatusCode::NOT_FOUND)
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

impl AsError for command::complete_transfer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::complete_transfer::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::ActiveDisputeBlocksTransfer(_) => {
                ("ACTIVE_DISPUTE_BLOCKS_TRANSFER", StatusCode::CONFLICT)
            }
            E::IllegalPropertyTransition(_) | E::IllegalTransition(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::NotAdmin(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
            E::PropertyNotExists(_) | E::TransferNotExists(_) => {
                ("NOT_FOUND", StatusCode::NOT_FOUND)
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

impl AsError for command::cancel_transfer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::cancel_transfer::ExecutionError as E;

        let (code, status) = match self {
            E::Db(e) => return e.try_as_error(),
            E::IllegalTransition(_) => {
                ("INVALID_STATE_TRANSITION", StatusCode::CONFLICT)
            }
            E::NotInitiator(_) => ("FORBIDDEN", StatusCode::FORBIDDEN),
            E::PropertyNotExists(_) | E::TransferNotExists(_) => {
                ("NOT_FOUND", StatusCode::NOT_FOUND)
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
