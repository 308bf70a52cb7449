//! [`Command`] for advancing a [`Dispute`] through its resolution ladder.

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{audit, dispute, property, user, Dispute, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for moving a [`Dispute`] one [`Step`] further along the
/// review, investigation and mediation ladder.
#[derive(Clone, Debug)]
pub struct AdvanceDispute {
    /// ID of the [`Dispute`] to advance.
    pub dispute_id: dispute::Id,

    /// [`Step`] to advance the [`Dispute`] to.
    pub step: Step,

    /// [`audit::Notes`] explaining the step.
    pub notes: Option<audit::Notes>,

    /// [`user::Actor`] advancing the [`Dispute`].
    pub actor: user::Actor,
}

/// Step of the [`Dispute`] resolution ladder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// Begin the officer review.
    Review,

    /// Assign the [`Dispute`] for investigation.
    Investigation,

    /// Schedule a mediation between the parties.
    Mediation,
}

impl Step {
    /// Returns the [`dispute::Event`] this [`Step`] corresponds to.
    #[must_use]
    pub fn event(self) -> dispute::Event {
        match self {
            Self::Review => dispute::Event::BeginReview,
            Self::Investigation => dispute::Event::AssignInvestigation,
            Self::Mediation => dispute::Event::ScheduleMediation,
        }
    }

    /// Returns the [`audit::Action`] this [`Step`] is logged as.
    #[must_use]
    pub fn action(self) -> audit::Action {
        match self {
            Self::Review => audit::Action::DisputeReviewStarted,
            Self::Investigation => {
                audit::Action::DisputeInvestigationAssigned
            }
            Self::Mediation => audit::Action::DisputeMediationScheduled,
        }
    }
}

impl<Db> Command<AdvanceDispute> for Service<Db>
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
        cmd: AdvanceDispute,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AdvanceDispute {
            dispute_id,
            step,
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
            .advance(step.event())
            .map_err(tracerr::from_and_wrap!(=> E))?;
        dispute.record(actor, step.action(), notes.clone());

        tx.execute(Update(dispute.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            dispute.property_id,
            actor,
            step.action(),
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

/// Error of [`AdvanceDispute`] [`Command`] execution.
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
}
