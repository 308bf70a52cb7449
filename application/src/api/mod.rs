//! REST API definitions.

pub mod dispute;
pub mod property;
pub mod transfer;
pub mod user;

use std::{fmt, str::FromStr};

use axum::{
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use service::domain::{document, timeline};

use crate::Error;

/// Assembles the [`Router`] of the whole REST API.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/users", post(user::register))
        .route("/sessions", post(user::login))
        .route("/properties", post(property::register))
        .route("/properties/:id", get(property::by_id))
        .route("/properties/:id/status", put(property::transition))
        .route("/properties/:id/logs", get(property::logs))
        .route("/transfers", post(transfer::initiate))
        .route("/transfers/:id", get(transfer::by_id))
        .route("/transfers/:id/documents", post(transfer::upload_documents))
        .route(
            "/transfers/:id/review-documents",
            put(transfer::review_documents),
        )
        .route("/transfers/:id/compliance", put(transfer::compliance))
        .route("/transfers/:id/approve", put(transfer::approve))
        .route("/transfers/:id/complete", put(transfer::complete))
        .route("/transfers/:id/cancel", put(transfer::cancel))
        .route("/disputes", post(dispute::submit))
        .route("/disputes/:id", get(dispute::by_id))
        .route("/disputes/:id/evidence", post(dispute::add_evidence))
        .route("/disputes/:id/withdraw", put(dispute::withdraw))
        .route("/disputes/:id/advance", put(dispute::advance))
        .route("/disputes/:id/resolve", put(dispute::resolve))
}

/// Parses the provided string into a `T`, reporting a bad request on
/// failure.
pub(crate) fn parse<T>(value: &str, what: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::bad_request(&format!("invalid {what}: {e}")))
}

/// Uploaded document descriptor.
#[derive(Clone, Debug, Deserialize)]
pub struct DocumentUploadRequest {
    /// Kind of the document.
    pub kind: String,

    /// Reference to the stored file in the document store.
    pub file_id: String,
}

impl DocumentUploadRequest {
    /// Converts this request into a [`document::Upload`].
    ///
    /// # Errors
    ///
    /// If any of the fields is malformed.
    pub(crate) fn into_upload(self) -> Result<document::Upload, Error> {
        Ok(document::Upload {
            kind: parse(&self.kind, "document kind")?,
            file: parse(&self.file_id, "file id")?,
        })
    }
}

/// Wire representation of a [`document::Document`].
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    /// ID of the document.
    pub id: String,

    /// Kind of the document.
    pub kind: String,

    /// Reference to the stored file in the document store.
    pub file_id: String,

    /// When the document was uploaded.
    pub uploaded_at: String,

    /// Review of the document, once performed.
    pub review: Option<ReviewResponse>,
}

/// Wire representation of a [`document::Review`].
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    /// Verdict of the review.
    pub verdict: String,

    /// Notes explaining the verdict.
    pub notes: String,

    /// ID of the reviewing officer.
    pub reviewed_by: String,

    /// When the review was performed.
    pub reviewed_at: String,
}

impl From<&document::Document> for DocumentResponse {
    fn from(doc: &document::Document) -> Self {
        Self {
            id: doc.id.to_string(),
            kind: doc.kind.to_string(),
            file_id: doc.file.to_string(),
            uploaded_at: doc.uploaded_at.to_rfc3339(),
            review: doc.review.as_ref().map(|r| ReviewResponse {
                verdict: r.verdict.to_string(),
                notes: r.notes.to_string(),
                reviewed_by: r.reviewed_by.to_string(),
                reviewed_at: r.reviewed_at.to_rfc3339(),
            }),
        }
    }
}

/// Wire representation of a [`timeline::Entry`].
#[derive(Debug, Serialize)]
pub struct TimelineEntryResponse {
    /// Performed action.
    pub action: String,

    /// ID of the user who performed the action.
    pub performed_by: String,

    /// Role of the performer at the time of the action.
    pub actor_role: String,

    /// Notes attached by the performer.
    pub notes: Option<String>,

    /// When the action was recorded.
    pub recorded_at: String,
}

impl From<&timeline::Entry> for TimelineEntryResponse {
    fn from(entry: &timeline::Entry) -> Self {
        Self {
            action: entry.action.to_string(),
            performed_by: entry.performed_by.to_string(),
            actor_role: entry.actor_role.to_string(),
            notes: entry.notes.as_ref().map(ToString::to_string),
            recorded_at: entry.recorded_at.to_rfc3339(),
        }
    }
}
