//! [`Command`] for resolving a [`Dispute`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
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

/// [`Command`] for resolving a [`Dispute`] with an [`dispute::Outcome`].
///
/// `Property::has_active_dispute` is recomputed from the remaining
/// non-terminal [`Dispute`]s, not simply flipped off.
#[derive(Clone, Debug)]
pub struct ResolveDispute {
    /// ID of the [`Dispute`] to resolve.
    pub dispute_id: dispute::Id,

    /// [`dispute::Outcome`] of the resolution.
    pub outcome: dispute::Outcome,

    /// [`audit::Notes`] accompanying the resolution.
    pub notes: Option<audit::Notes>,

    /// [`user::Actor`] resolving the [`Dispute`].
    pub actor: user::Actor,
}

impl<Db> Command<ResolveDispute> for Service<Db>
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
        cmd: ResolveDispute,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResolveDispute {
            dispute_id,
            outcome,
            notes,
            actor,
        } = cmd;

        if !actor.can_manage_disputes() {
            return Err(tracerr::new!(E::NotOfficial(actor.id)));
        }

        let dispute = self
            .database()
            .execute(Select(By::<Option<Dispute>, _>::new(dispute_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::DisputeNotExists(dispute_id))
            .map_err(tracerr::wrap!())?;

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
            .advance(dispute::Event::Resolve)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        dispute.resolution = Some(dispute::Resolution {
            outcome,
            resolved_by: actor.id,
            resolved_at: DateTime::now().coerce(),
        });
        dispute.record(actor, audit::Action::DisputeResolved, notes.clone());

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
            audit::Action::DisputeResolved,
            dispute.status,
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

        Ok(dispute)
    }
}

/// Error of [`ResolveDispute`] [`Command`] execution.
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

    /// [`User`] is not authorized to manage disputes.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not authorized to manage disputes")]
    NotOfficial(#[error(not(source))] user::Id),

    /// [`Property`] of the [`Dispute`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}
