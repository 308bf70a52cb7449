//! [`Command`] for uploading [`Transfer`] evidence [`Document`]s.
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

/// [`Command`] for uploading evidence [`Document`]s of a [`Transfer`].
///
/// [`Document`]: crate::domain::Document
#[derive(Clone, Debug)]
pub struct UploadTransferDocuments {
    /// ID of the [`Transfer`] to upload [`Document`]s for.
    ///
    /// [`Document`]: crate::domain::Document
    pub transfer_id: transfer::Id,

    /// Uploaded documents.
    pub documents: Vec<document::Upload>,

    /// [`user::Actor`] uploading the documents.
    pub actor: user::Actor,
}

impl<Db> Command<UploadTransferDocuments> for Service<Db>
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
        cmd: UploadTransferDocuments,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UploadTransferDocuments {
            transfer_id,
            documents,
            actor,
        } = cmd;

        if documents.is_empty() {
            return Err(tracerr::new!(E::NoDocuments));
        }

        let transfer = self
            .database()
            .execute(Select(By::<Option<Transfer>, _>::new(transfer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TransferNotExists(transfer_id))
            .map_err(tracerr::wrap!())?;
        if transfer.previous_owner != actor.id {
            return Err(tracerr::new!(E::NotInitiator(actor.id)));
        }

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

        transfer
            .advance(transfer::Event::SubmitDocuments)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        transfer
            .documents
            .extend(documents.into_iter().map(Into::into));
        transfer.record(actor, audit::Action::TransferDocumentsUploaded, None);

        tx.execute(Update(transfer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            transfer.property_id,
            actor,
            audit::Action::TransferDocumentsUploaded,
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

/// Error of [`UploadTransferDocuments`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Attempted [`transfer::Status`] transition is not legal.
    #[display("{_0}")]
    #[from]
    IllegalTransition(transfer::IllegalTransition),

    /// No documents provided.
    #[display("no documents provided")]
    NoDocuments,

    /// [`User`] is not the initiator of the [`Transfer`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not the previous owner of the transfer")]
    NotInitiator(#[error(not(source))] user::Id),

    /// [`Transfer`] with the provided ID does not exist.
    #[display("`Transfer(id: {_0})` does not exist")]
    TransferNotExists(#[error(not(source))] transfer::Id),
}
