//! [`Command`] definition.

pub mod add_dispute_evidence;
pub mod advance_dispute;
pub mod approve_transfer;
pub mod authorize_session;
pub mod cancel_transfer;
pub mod complete_transfer;
pub mod create_session;
pub mod create_user;
pub mod initiate_transfer;
pub mod perform_compliance_checks;
pub mod register_property;
pub mod resolve_dispute;
pub mod review_transfer_documents;
pub mod submit_dispute;
pub mod transition_property;
pub mod upload_transfer_documents;
pub mod withdraw_dispute;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_dispute_evidence::AddDisputeEvidence,
    advance_dispute::AdvanceDispute, approve_transfer::ApproveTransfer,
    authorize_session::AuthorizeSession, cancel_transfer::CancelTransfer,
    complete_transfer::CompleteTransfer, create_session::CreateSession,
    create_user::CreateUser, initiate_transfer::InitiateTransfer,
    perform_compliance_checks::PerformComplianceChecks,
    register_property::RegisterProperty, resolve_dispute::ResolveDispute,
    review_transfer_documents::ReviewTransferDocuments,
    submit_dispute::SubmitDispute, transition_property::TransitionProperty,
    upload_transfer_documents::UploadTransferDocuments,
    withdraw_dispute::WithdrawDispute,
};
