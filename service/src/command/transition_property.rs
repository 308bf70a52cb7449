//! [`Command`] for transitioning a [`Property`] registration [`Status`].
//!
//! [`Status`]: property::Status

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{audit, property, user, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for requesting a [`property::Status`] transition.
///
/// Covers the whole registration ladder (document validation, payment,
/// approval), the rejection and needs-update edges, and the owner's
/// resubmission. The `TRANSFERRED` status is excluded: only a completed
/// [`Transfer`] produces it.
///
/// [`Transfer`]: crate::domain::Transfer
#[derive(Clone, Debug)]
pub struct TransitionProperty {
    /// ID of the [`Property`] to transition.
    pub property_id: property::Id,

    /// Target [`property::Status`].
    pub to: property::Status,

    /// [`audit::Notes`] explaining the transition.
    ///
    /// Mandatory for the rejection and needs-update edges.
    pub notes: Option<audit::Notes>,

    /// [`user::Actor`] requesting the transition.
    pub actor: user::Actor,
}

impl<Db> Command<TransitionProperty> for Service<Db>
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
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
        Lock<By<Property, property::Id>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: TransitionProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use crate::domain::property::Status as S;
        use ExecutionError as E;

        let TransitionProperty {
            property_id,
            to,
            notes,
            actor,
        } = cmd;

        if to == S::Transferred {
            return Err(tracerr::new!(E::ReservedTransition));
        }
        if matches!(to, S::Rejected | S::NeedsUpdate) && notes.is_none() {
            return Err(tracerr::new!(E::MissingNotes));
        }

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        // Resubmission belongs to the owner; every other edge belongs to the
        // officials.
        if to == S::Pending {
            if property.owner_id != actor.id {
                return Err(tracerr::new!(E::NotOwner(actor.id)));
            }
        } else if !actor.can_review_applications() {
            return Err(tracerr::new!(E::NotOfficial(actor.id)));
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

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        property
            .transition_to(to, DateTime::now().coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let action = match to {
            S::Pending => audit::Action::ApplicationResubmitted,
            S::DocumentsValidated => {
                audit::Action::ApplicationDocumentsValidated
            }
            S::PaymentCompleted => audit::Action::ApplicationPaymentCompleted,
            S::Approved => audit::Action::ApplicationApproved,
            S::Rejected => audit::Action::ApplicationRejected,
            S::NeedsUpdate => audit::Action::ApplicationUpdateRequested,
            S::Transferred => {
                unreachable!("guarded by the `ReservedTransition` check")
            }
        };

        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            property.id,
            actor,
            action,
            property.status,
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

        Ok(property)
    }
}

/// Error of [`TransitionProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Attempted [`property::Status`] transition is not legal.
    #[display("{_0}")]
    #[from]
    IllegalTransition(property::IllegalTransition),

    /// Rejection and needs-update edges require explanatory notes.
    #[display("this transition requires explanatory notes")]
    MissingNotes,

    /// [`User`] is not authorized to review applications.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not authorized to review applications")]
    NotOfficial(#[error(not(source))] user::Id),

    /// [`User`] is not the owner of the [`Property`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not the owner of the property")]
    NotOwner(#[error(not(source))] user::Id),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// The `TRANSFERRED` status is reachable only through a completed
    /// [`Transfer`].
    ///
    /// [`Transfer`]: crate::domain::Transfer
    #[display("the `TRANSFERRED` status is driven by the transfer workflow")]
    ReservedTransition,
}
