//! [`Command`] for reviewing [`Transfer`] evidence [`Document`]s.
//!
//! [`Document`]: crate::domain::Document

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{audit, document, property, transfer, user, Property, Transfer},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording officer verdicts upon the evidence
/// [`Document`]s of a [`Transfer`].
///
/// If every [`Document`] of the [`Transfer`] ends up approved, the
/// [`Transfer`] advances to verification; otherwise it returns to the
/// previous owner for resubmission.
///
/// [`Document`]: crate::domain::Document
#[derive(Clone, Debug)]
pub struct ReviewTransferDocuments {
    /// ID of the [`Transfer`] being reviewed.
    pub transfer_id: transfer::Id,

    /// Per-document verdicts.
    pub reviews: Vec<DocumentReview>,

    /// [`user::Actor`] reviewing the documents.
    pub actor: user::Actor,
}

/// Verdict upon a single [`Document`].
///
/// [`Document`]: crate::domain::Document
#[derive(Clone, Debug)]
pub struct DocumentReview {
    /// ID of the reviewed [`Document`].
    ///
    /// [`Document`]: crate::domain::Document
    pub document_id: document::Id,

    /// [`document::Verdict`] upon the [`Document`].
    ///
    /// [`Document`]: crate::domain::Document
    pub verdict: document::Verdict,

    /// Mandatory [`audit::Notes`] explaining the verdict.
    pub notes: audit::Notes,
}

impl<Db> Command<ReviewTransferDocuments> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Transfer>, transfer::Id>>,
            Ok = Option<Transfer>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Transfer>, transfer::Id>>,
            Ok = Option<Transfer>,
            Err = Traced<database::Error>,
        > + Database<Update<Transfer>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
        Lock<By<Property, property::Id>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Transfer;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReviewTransferDocuments,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReviewTransferDocuments {
            transfer_id,
            reviews,
            actor,
        } = cmd;

        if !actor.can_review_documents() {
            return Err(tracerr::new!(E::NotOfficial(actor.id)));
        }
        if reviews.is_empty() {
            return Err(tracerr::new!(E::NoReviews));
        }

        let transfer = self
            .database()
            .execute(Select(By::<Option<Transfer>, _>::new(transfer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TransferNotExists(transfer_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Property`.
        tx.execute(Lock(By::new(transfer.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut transfer = tx
            .execute(Select(By::<Option<Transfer>, _>::new(transfer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TransferNotExists(transfer_id))
            .map_err(tracerr::wrap!())?;

        if transfer.status != transfer::Status::UnderReview {
            return Err(tracerr::new!(E::IllegalTransition(
                transfer::IllegalTransition {
                    from: transfer.status,
                    event: transfer::Event::PassReview,
                }
            )));
        }

        for review in reviews {
            let DocumentReview {
                document_id,
                verdict,
                notes,
            } = review;
            let doc = transfer
                .document_mut(document_id)
                .ok_or(E::DocumentNotExists(document_id))
                .map_err(tracerr::wrap!())?;
            doc.review = Some(document::Review {
                verdict,
                notes,
                reviewed_by: actor.id,
                reviewed_at: common::DateTimeOf::now(),
            });
        }

        let (event, action) = if transfer.all_documents_approved() {
            (
                transfer::Event::PassReview,
                audit::Action::TransferDocumentsReviewed,
            )
        } else {
            (
                transfer::Event::ReturnDocuments,
                audit::Action::TransferDocumentsReturned,
            )
        };
        transfer
            .advance(event)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        transfer.record(actor, action, None);

        tx.execute(Update(transfer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            transfer.property_id,
            actor,
            action,
            transfer.status,
            None,
            None,
        )))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(transfer)
    }
}

/// Error of [`ReviewTransferDocuments`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Document`] with the provided ID does not exist in the [`Transfer`].
    ///
    /// [`Document`]: crate::domain::Document
    #[display("`Document(id: {_0})` does not exist in the transfer")]
    DocumentNotExists(#[error(not(source))] document::Id),

    /// Attempted [`transfer::Status`] transition is not legal.
    #[display("{_0}")]
    #[from]
    IllegalTransition(transfer::IllegalTransition),

    /// No reviews provided.
    #[display("no document reviews provided")]
    NoReviews,

    /// [`User`] is not authorized to review documents.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not authorized to review documents")]
    NotOfficial(#[error(not(source))] user::Id),

    /// [`Transfer`] with the provided ID does not exist.
    #[display("`Transfer(id: {_0})` does not exist")]
    TransferNotExists(#[error(not(source))] transfer::Id),
}
