//! [`Command`] for registering a new [`Property`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
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

/// [`Command`] for submitting a new [`Property`] registration application.
#[derive(Clone, Debug)]
pub struct RegisterProperty {
    /// [`property::PlotNumber`] of the new [`Property`].
    pub plot_number: property::PlotNumber,

    /// [`property::Region`] of the new [`Property`].
    pub region: property::Region,

    /// [`property::SubCity`] of the new [`Property`].
    pub sub_city: property::SubCity,

    /// [`property::Kebele`] of the new [`Property`].
    pub kebele: property::Kebele,

    /// [`property::Street`] of the new [`Property`].
    pub street: Option<property::Street>,

    /// [`property::HouseNumber`] of the new [`Property`].
    pub house_number: Option<property::HouseNumber>,

    /// [`property::Kind`] of the new [`Property`].
    pub kind: property::Kind,

    /// [`property::Area`] of the new [`Property`].
    pub area: property::Area,

    /// [`user::Actor`] applying for the registration.
    ///
    /// Becomes the owner of the new [`Property`].
    pub actor: user::Actor,
}

impl<Db> Command<RegisterProperty> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Property>, property::Hash>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
        Lock<By<Property, property::Hash>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RegisterProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterProperty {
            plot_number,
            region,
            sub_city,
            kebele,
            street,
            house_number,
            kind,
            area,
            actor,
        } = cmd;

        let hash =
            property::Hash::new(&region, &sub_city, &kebele, &plot_number);

        let property = Property {
            id: property::Id::new(),
            hash,
            plot_number,
            location: property::Location {
                region,
                sub_city,
                kebele,
                street,
                house_number,
            },
            kind,
            area,
            status: property::Status::Pending,
            has_active_dispute: false,
            current_transfer: None,
            owner_id: actor.id,
            ownership_history: Vec::new(),
            created_at: DateTime::now().coerce(),
            status_updated_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent registration of the same plot.
        tx.execute(Lock(By::new(hash)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Option<Property>, _>::new(hash)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(existing) = existing {
            return Err(tracerr::new!(E::AlreadyRegistered(
                existing.plot_number,
            )));
        }

        tx.execute(Insert(property.clone()))
            .await
            .map_err(|e| {
                if e.as_ref().is_unique_violation(None) {
                    tracerr::new!(E::AlreadyRegistered(
                        property.plot_number.clone(),
                    ))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;

        tx.execute(Insert(audit::Entry::new(
            property.id,
            actor,
            audit::Action::ApplicationSubmitted,
            property.status,
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

        Ok(property)
    }
}

/// Error of [`RegisterProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// A [`Property`] with the same plot is already registered.
    #[display("plot `{_0}` is already registered within its kebele")]
    AlreadyRegistered(#[error(not(source))] property::PlotNumber),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
