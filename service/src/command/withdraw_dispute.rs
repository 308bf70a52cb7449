//! [`Command`] for withdrawing a [`Dispute`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{audit, dispute, property, user, Dispute, Property},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for withdrawing a [`Dispute`] by its disputant.
///
/// `Property::has_active_dispute` is recomputed from the remaining
/// non-terminal [`Dispute`]s, not simply flipped off.
#[derive(Clone, Debug)]
pub struct WithdrawDispute {
    /// ID of the [`Dispute`] to withdraw.
    pub dispute_id: dispute::Id,

    /// [`audit::Notes`] explaining the withdrawal.
    pub reason: audit::Notes,

    /// [`user::Actor`] withdrawing the [`Dispute`].
    pub actor: user::Actor,
}

impl<Db> Command<WithdrawDispute> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Dispute>, dispute::Id>>,
            Ok = Option<Dispute>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Dispute>, dispute::Id>>,
            Ok = Option<Dispute>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::dispute::OtherActive, (property::Id, dispute::Id)>>,
            Ok = read::dispute::OtherActive,
            Err = Traced<database::Error>,
        > + Database<Update<Dispute>, Err = Traced<database::Error>>
        + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
        Lock<By<Property, property::Id>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Dispute;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: WithdrawDispute,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let WithdrawDispute {
            dispute_id,
            reason,
            actor,
        } = cmd;

        let dispute = self
            .database()
            .execute(Select(By::<Option<Dispute>, _>::new(dispute_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::DisputeNotExists(dispute_id))
            .map_err(tracerr::wrap!())?;
        if dispute.disputant != actor.id {
            return Err(tracerr::new!(E::NotDisputant(actor.id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Property`.
        tx.execute(Lock(By::new(dispute.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut dispute = tx
            .execute(Select(By::<Option<Dispute>, _>::new(dispute_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::DisputeNotExists(dispute_id))
            .map_err(tracerr::wrap!())?;

        dispute
            .advance(dispute::Event::Withdraw)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        dispute.record(
            actor,
            audit::Action::DisputeWithdrawn,
            Some(reason.clone()),
        );

        // The dispute flag is derived from the remaining active disputes:
        // future builds may allow several disputants per property.
        let other_active = tx
            .execute(Select(By::<read::dispute::OtherActive, _>::new((
                dispute.property_id,
                dispute.id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(
                dispute.property_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(dispute.property_id))
            .map_err(tracerr::wrap!())?;
        property.has_active_dispute = *other_active;

        tx.execute(Update(dispute.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(property))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            dispute.property_id,
            actor,
            audit::Action::DisputeWithdrawn,
            dispute.status,
            Some(reason),
            None,
        )))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(dispute)
    }
}

/// Error of [`WithdrawDispute`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Dispute`] with the provided ID does not exist.
    #[display("`Dispute(id: {_0})` does not exist")]
    DisputeNotExists(#[error(not(source))] dispute::Id),

    /// Attempted [`dispute::Status`] transition is not legal.
    #[display("{_0}")]
    #[from]
    IllegalTransition(dispute::IllegalTransition),

    /// [`User`] is not the disputant of the [`Dispute`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not the disputant of the dispute")]
    NotDisputant(#[error(not(source))] user::Id),

    /// [`Property`] of the [`Dispute`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}
