//! [`Command`] for attaching evidence to a [`Dispute`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{audit, dispute, document, property, user, Dispute, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for attaching additional evidence to a [`Dispute`].
#[derive(Clone, Debug)]
pub struct AddDisputeEvidence {
    /// ID of the [`Dispute`] to attach evidence to.
    pub dispute_id: dispute::Id,

    /// Uploaded evidence.
    pub evidence: Vec<document::Upload>,

    /// [`user::Actor`] attaching the evidence.
    pub actor: user::Actor,
}

impl<Db> Command<AddDisputeEvidence> for Service<Db>
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
        > + Database<Update<Dispute>, Err = Traced<database::Error>>
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
        cmd: AddDisputeEvidence,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddDisputeEvidence {
            dispute_id,
            evidence,
            actor,
        } = cmd;

        if evidence.is_empty() {
            return Err(tracerr::new!(E::NoEvidence));
        }

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

        if !dispute.is_active() {
            return Err(tracerr::new!(E::DisputeClosed(dispute_id)));
        }
        dispute
            .evidence
            .extend(evidence.into_iter().map(Into::into));
        dispute.record(actor, audit::Action::DisputeEvidenceAdded, None);

        tx.execute(Update(dispute.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            dispute.property_id,
            actor,
            audit::Action::DisputeEvidenceAdded,
            dispute.status,
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

        Ok(dispute)
    }
}

/// Error of [`AddDisputeEvidence`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Dispute`] has already reached a terminal status.
    #[display("`Dispute(id: {_0})` is already closed")]
    DisputeClosed(#[error(not(source))] dispute::Id),

    /// [`Dispute`] with the provided ID does not exist.
    #[display("`Dispute(id: {_0})` does not exist")]
    DisputeNotExists(#[error(not(source))] dispute::Id),

    /// No evidence provided.
    #[display("no evidence provided")]
    NoEvidence,

    /// [`User`] is not the disputant of the [`Dispute`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not the disputant of the dispute")]
    NotDisputant(#[error(not(source))] user::Id),
}
