//! [`Command`] for recording [`Transfer`] compliance checks.

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

/// [`Command`] for recording the three compliance sub-checks of a
/// [`Transfer`].
///
/// A non-compliant aggregate verdict rejects the [`Transfer`] on the spot; a
/// pending one leaves it awaiting the remaining sub-checks.
#[derive(Clone, Debug)]
pub struct PerformComplianceChecks {
    /// ID of the [`Transfer`] being checked.
    pub transfer_id: transfer::Id,

    /// Recorded sub-checks.
    pub checks: ComplianceChecks,

    /// [`user::Actor`] recording the sub-checks.
    pub actor: user::Actor,
}

impl<Db> Command<PerformComplianceChecks> for Service<Db>
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
        cmd: PerformComplianceChecks,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PerformComplianceChecks {
            transfer_id,
            checks,
            actor,
        } = cmd;

        if !actor.can_review_documents() {
            return Err(tracerr::new!(E::NotOfficial(actor.id)));
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

        if transfer.status != transfer::Status::VerificationPending {
            return Err(tracerr::new!(E::NotAwaitingVerification(transfer_id)));
        }

        let verdict = checks.verdict();
        transfer.compliance = Some(checks);

        let action = if verdict == compliance::Verdict::NonCompliant {
            transfer
                .advance(transfer::Event::FailCompliance)
                .map_err(tracerr::from_and_wrap!(=> E))?;

            // A terminal transfer must not keep holding the property lock.
            let mut property = tx
                .execute(Select(By::<Option<Property>, _>::new(
                    transfer.property_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PropertyNotExists(transfer.property_id))
                .map_err(tracerr::wrap!())?;
            property.release_transfer();
            tx.execute(Update(property))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            audit::Action::TransferRejected
        } else {
            audit::Action::TransferComplianceRecorded
        };
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

/// Error of [`PerformComplianceChecks`] [`Command`] execution.
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

    /// [`Transfer`] is not awaiting compliance verification.
    #[display("`Transfer(id: {_0})` is not awaiting verification")]
    NotAwaitingVerification(#[error(not(source))] transfer::Id),

    /// [`User`] is not authorized to record compliance checks.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not authorized to record compliance checks")]
    NotOfficial(#[error(not(source))] user::Id),

    /// [`Property`] of the [`Transfer`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Transfer`] with the provided ID does not exist.
    #[display("`Transfer(id: {_0})` does not exist")]
    TransferNotExists(#[error(not(source))] transfer::Id),
}
