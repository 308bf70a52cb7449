//! [`Command`] for submitting a new [`Dispute`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{audit, dispute, document, property, user, Dispute, Property},
    infra::{database, Database},
    read::Active,
    Service,
};

use super::Command;

/// [`Command`] for submitting a new [`Dispute`] against a [`Property`].
///
/// Filing is open to any registered user; an active [`Transfer`] of the
/// [`Property`] does not block it. The [`Transfer`], however, can no longer
/// be approved or completed while the [`Dispute`] stays active.
///
/// [`Transfer`]: crate::domain::Transfer
#[derive(Clone, Debug)]
pub struct SubmitDispute {
    /// ID of the disputed [`Property`].
    pub property_id: property::Id,

    /// [`dispute::Kind`] of the new [`Dispute`].
    pub kind: dispute::Kind,

    /// [`dispute::Title`] of the new [`Dispute`].
    pub title: dispute::Title,

    /// [`dispute::Description`] of the new [`Dispute`].
    pub description: dispute::Description,

    /// Initial evidence of the new [`Dispute`].
    pub evidence: Vec<document::Upload>,

    /// [`user::Actor`] filing the [`Dispute`].
    pub actor: user::Actor,
}

impl<Db> Command<SubmitDispute> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Dispute>>, property::Id>>,
            Ok = Option<Active<Dispute>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Dispute>, Err = Traced<database::Error>>
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

    async fn execute(&self, cmd: SubmitDispute) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitDispute {
            property_id,
            kind,
            title,
            description,
            evidence,
            actor,
        } = cmd;

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

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

        let active = tx
            .execute(Select(
                By::<Option<Active<Dispute>>, _>::new(property.id),
            ))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if active.is_some() {
            return Err(tracerr::new!(E::DisputeAlreadyActive(property.id)));
        }

        let mut dispute = Dispute {
            id: dispute::Id::new(),
            property_id: property.id,
            disputant: actor.id,
            kind,
            title,
            description,
            evidence: evidence.into_iter().map(Into::into).collect(),
            status: dispute::Status::Submitted,
            timeline: Vec::new(),
            created_at: DateTime::now().coerce(),
            resolution: None,
        };
        dispute.record(actor, audit::Action::DisputeSubmitted, None);

        // The partial unique index on active disputes backs up the check
        // above against concurrent submissions.
        tx.execute(Insert(dispute.clone()))
            .await
            .map_err(|e| {
                if e.as_ref().is_unique_violation(None) {
                    tracerr::new!(E::DisputeAlreadyActive(property.id))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        property.has_active_dispute = true;
        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            property.id,
            actor,
            audit::Action::DisputeSubmitted,
            dispute.status,
            audit::Notes::new(dispute.title.to_string()),
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

/// Error of [`SubmitDispute`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] already has an active [`Dispute`].
    #[display("`Property(id: {_0})` already has an active dispute")]
    DisputeAlreadyActive(#[error(not(source))] property::Id),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}
