//! [`Command`] for approving or rejecting a [`Transfer`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        audit, property,
        transfer::{self, compliance, ComplianceChecks},
        user, Property, Transfer,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deciding upon a [`Transfer`].
#[derive(Clone, Debug)]
pub struct ApproveTransfer {
    /// ID of the [`Transfer`] being decided.
    pub transfer_id: transfer::Id,

    /// [`Decision`] upon the [`Transfer`].
    pub decision: Decision,

    /// [`audit::Notes`] explaining the [`Decision`].
    ///
    /// Mandatory for a rejection.
    pub notes: Option<audit::Notes>,

    /// [`user::Actor`] deciding upon the [`Transfer`].
    pub actor: user::Actor,
}

/// Decision upon a [`Transfer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Approve the [`Transfer`] for completion.
    Approved,

    /// Reject the [`Transfer`].
    Rejected,
}

impl<Db> Command<ApproveTransfer> for Service<Db>
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

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(
        &self,
        cmd: ApproveTransfer,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ApproveTransfer {
            transfer_id,
            decision,
            notes,
            actor,
        } = cmd;

        if !actor.can_decide_transfers() {
            return Err(tracerr::new!(E::NotOfficial(actor.id)));
        }
        if decision == Decision::Rejected && notes.is_none() {
            return Err(tracerr::new!(E::MissingRejectionNotes));
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

        let action = match decision {
            Decision::Approved => {
                // A dispute filed after initiation blocks the approval.
                if property.has_active_dispute {
                    return Err(tracerr::new!(E::ActiveDisputeBlocksTransfer(
                        property.id,
                    )));
                }
                if transfer
                    .compliance
                    .as_ref()
                    .map(ComplianceChecks::verdict)
                    != Some(compliance::Verdict::Compliant)
                {
                    return Err(tracerr::new!(E::ComplianceNotSatisfied(
                        transfer_id,
                    )));
                }
                transfer
                    .advance(transfer::Event::Approve)
                    .map_err(tracerr::from_and_wrap!(=> E))?;

                audit::Action::TransferApproved
            }
            Decision::Rejected => {
                transfer
                    .advance(transfer::Event::Reject)
                    .map_err(tracerr::from_and_wrap!(=> E))?;

                // A terminal transfer must not keep holding the property
                // lock.
                property.release_transfer();
                tx.execute(Update(property.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                audit::Action::TransferRejected
            }
        };
        transfer.record(actor, action, notes.clone());

        tx.execute(Update(transfer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            transfer.property_id,
            actor,
            action,
            transfer.status,
            notes,
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

/// Error of [`ApproveTransfer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Property`] has an active [`Dispute`] blocking the approval.
    ///
    /// [`Dispute`]: crate::domain::Dispute
    #[display("`Property(id: {_0})` has an active dispute blocking transfers")]
    ActiveDisputeBlocksTransfer(#[error(not(source))] property::Id),

    /// Compliance checks of the [`Transfer`] are not satisfied.
    #[display("`Transfer(id: {_0})` compliance checks are not satisfied")]
    ComplianceNotSatisfied(#[error(not(source))] transfer::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Attempted [`transfer::Status`] transition is not legal.
    #[display("{_0}")]
    #[from]
    IllegalTransition(transfer::IllegalTransition),

    /// Rejection requires explanatory notes.
    #[display("rejection requires explanatory notes")]
    MissingRejectionNotes,

    /// [`User`] is not authorized to decide upon transfers.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not authorized to decide upon transfers")]
    NotOfficial(#[error(not(source))] user::Id),

    /// [`Property`] of the [`Transfer`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Transfer`] with the provided ID does not exist.
    #[display("`Transfer(id: {_0})` does not exist")]
    TransferNotExists(#[error(not(source))] transfer::Id),
}
