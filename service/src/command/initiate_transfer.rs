//! [`Command`] for initiating a new [`Transfer`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{audit, property, transfer, user, Property, Transfer, User},
    infra::{database, Database},
    read::Active,
    Service,
};

use super::Command;

/// [`Command`] for initiating a new [`Transfer`] of a [`Property`].
#[derive(Clone, Debug)]
pub struct InitiateTransfer {
    /// ID of the [`Property`] to transfer.
    pub property_id: property::Id,

    /// [`user::Email`] of the [`User`] receiving the ownership.
    pub new_owner_email: user::Email,

    /// [`transfer::Kind`] of the new [`Transfer`].
    pub kind: transfer::Kind,

    /// Declared value of the new [`Transfer`].
    pub value: Money,

    /// [`transfer::Reason`] of the new [`Transfer`].
    pub reason: transfer::Reason,

    /// [`user::Actor`] initiating the [`Transfer`].
    pub actor: user::Actor,
}

impl<Db> Command<InitiateTransfer> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Transfer>>, property::Id>>,
            Ok = Option<Active<Transfer>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Transfer>, Err = Traced<database::Error>>
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
        cmd: InitiateTransfer,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let InitiateTransfer {
            property_id,
            new_owner_email,
            kind,
            value,
            reason,
            actor,
        } = cmd;

        if value.is_negative() {
            return Err(tracerr::new!(E::NegativeValue(value)));
        }

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        property
            .ensure_transferable(actor.id)
            .map_err(|o| obstacle_error(o, &property, actor))
            .map_err(tracerr::wrap!())?;

        let new_owner = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(&new_owner_email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::TransfereeNotRegistered(new_owner_email))
            .map_err(tracerr::wrap!())?;
        if new_owner.id == property.owner_id {
            return Err(tracerr::new!(E::SelfTransferNotAllowed(new_owner.id)));
        }

        if property.status != property::Status::Approved {
            return Err(tracerr::new!(E::PropertyNotApproved(property.id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Property`.
        tx.execute(Lock(By::new(property.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // The cooperative locks must be re-validated under the critical
        // section, not trusted from the read above.
        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        property
            .ensure_transferable(actor.id)
            .map_err(|o| obstacle_error(o, &property, actor))
            .map_err(tracerr::wrap!())?;

        let active = tx
            .execute(Select(
                By::<Option<Active<Transfer>>, _>::new(property.id),
            ))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if active.is_some() {
            return Err(tracerr::new!(E::TransferAlreadyActive(property.id)));
        }

        let mut transfer = Transfer {
            id: transfer::Id::new(),
            property_id: property.id,
            previous_owner: property.owner_id,
            new_owner: new_owner.id,
            kind,
            value,
            reason,
            status: transfer::Status::Initiated,
            documents: Vec::new(),
            compliance: None,
            timeline: Vec::new(),
            created_at: DateTime::now().coerce(),
            decided_at: None,
        };
        transfer.record(
            actor,
            audit::Action::TransferInitiated,
            audit::Notes::new(transfer.reason.to_string()),
        );

        // The partial unique index on active transfers backs up this insert:
        // a concurrent initiation that slipped past the check above fails
        // here instead of creating a second active transfer.
        tx.execute(Insert(transfer.clone()))
            .await
            .map_err(|e| {
                if e.as_ref().is_unique_violation(None) {
                    tracerr::new!(E::TransferAlreadyActive(property.id))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;

        property.current_transfer = Some(transfer.id);
        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            property.id,
            actor,
            audit::Action::TransferInitiated,
            transfer.status,
            audit::Notes::new(transfer.reason.to_string()),
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

/// Maps a [`property::TransferObstacle`] into an [`ExecutionError`].
fn obstacle_error(
    obstacle: property::TransferObstacle,
    property: &Property,
    actor: user::Actor,
) -> ExecutionError {
    use crate::domain::property::TransferObstacle as O;
    use ExecutionError as E;

    match obstacle {
        O::NotOwner => E::NotOwner(actor.id),
        O::ActiveDispute => E::ActiveDisputeBlocksTransfer(property.id),
        O::TransferInProgress => E::TransferAlreadyActive(property.id),
    }
}

/// Error of [`InitiateTransfer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Property`] has an active [`Dispute`] blocking transfers.
    ///
    /// [`Dispute`]: crate::domain::Dispute
    #[display("`Property(id: {_0})` has an active dispute blocking transfers")]
    ActiveDisputeBlocksTransfer(#[error(not(source))] property::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Declared [`Transfer`] value is negative.
    #[display("transfer value `{_0}` cannot be negative")]
    NegativeValue(#[error(not(source))] Money),

    /// [`User`] is not the owner of the [`Property`].
    #[display("`User(id: {_0})` is not the owner of the property")]
    NotOwner(#[error(not(source))] user::Id),

    /// [`Property`] registration is not approved.
    #[display("`Property(id: {_0})` registration is not approved")]
    PropertyNotApproved(#[error(not(source))] property::Id),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// Transferee coincides with the current owner.
    #[display("`User(id: {_0})` cannot transfer the property to themselves")]
    SelfTransferNotAllowed(#[error(not(source))] user::Id),

    /// [`Property`] already has an active [`Transfer`].
    #[display("`Property(id: {_0})` already has an active transfer")]
    TransferAlreadyActive(#[error(not(source))] property::Id),

    /// No registered [`User`] with the provided [`user::Email`] exists.
    #[display("no registered user with the `{_0}` email exists")]
    TransfereeNotRegistered(#[error(not(source))] user::Email),
}
