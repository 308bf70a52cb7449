//! [`Command`] for completing an approved [`Transfer`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{audit, property, transfer, user, Property, Transfer},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for completing an approved [`Transfer`].
///
/// Crosses the [`Property`] and [`Transfer`] aggregates: the ownership swap,
/// the history append, the lock release, the terminal [`Transfer`] status and
/// the audit record land in one transaction, or not at all.
#[derive(Clone, Copy, Debug)]
pub struct CompleteTransfer {
    /// ID of the [`Transfer`] to complete.
    pub transfer_id: transfer::Id,

    /// [`user::Actor`] completing the [`Transfer`].
    pub actor: user::Actor,
}

impl<Db> Command<CompleteTransfer> for Service<Db>
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
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<Transfer>, Err = Traced<database::Error>>
        + Database<Update<Property>, Err = Traced<database::Error>>
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
        cmd: CompleteTransfer,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteTransfer { transfer_id, actor } = cmd;

        if !actor.can_complete_transfers() {
            return Err(tracerr::new!(E::NotAdmin(actor.id)));
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
        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(
                transfer.property_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(transfer.property_id))
            .map_err(tracerr::wrap!())?;

        // A dispute filed after the approval blocks the completion.
        if property.has_active_dispute {
            return Err(tracerr::new!(E::ActiveDisputeBlocksTransfer(
                property.id,
            )));
        }

        // Completing an already terminal transfer is an illegal transition,
        // never a second ownership change.
        transfer
            .advance(transfer::Event::Complete)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        property
            .apply_ownership_change(
                transfer.new_owner,
                DateTime::now().coerce(),
            )
            .map_err(tracerr::from_and_wrap!(=> E))?;
        transfer.record(actor, audit::Action::TransferCompleted, None);

        tx.execute(Update(transfer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            property.id,
            actor,
            audit::Action::TransferCompleted,
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

/// Error of [`CompleteTransfer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Property`] has an active [`Dispute`] blocking the completion.
    ///
    /// [`Dispute`]: crate::domain::Dispute
    #[display("`Property(id: {_0})` has an active dispute blocking transfers")]
    ActiveDisputeBlocksTransfer(#[error(not(source))] property::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Attempted [`property::Status`] transition is not legal.
    #[display("{_0}")]
    #[from]
    IllegalPropertyTransition(property::IllegalTransition),

    /// Attempted [`transfer::Status`] transition is not legal.
    #[display("{_0}")]
    #[from]
    IllegalTransition(transfer::IllegalTransition),

    /// [`User`] is not authorized to complete transfers.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not authorized to complete transfers")]
    NotAdmin(#[error(not(source))] user::Id),

    /// [`Property`] of the [`Transfer`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Transfer`] with the provided ID does not exist.
    #[display("`Transfer(id: {_0})` does not exist")]
    TransferNotExists(#[error(not(source))] transfer::Id),
}
