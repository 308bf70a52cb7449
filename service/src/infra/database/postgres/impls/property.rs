//! [`Property`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, hash, plot_number, \
                   region, sub_city, kebele, street, house_number, \
                   kind, area, status, \
                   has_active_dispute, current_transfer, owner_id, \
                   created_at, status_updated_at \
            FROM properties \
            WHERE id = $1::UUID \
            LIMIT 1";
        let Some(row) =
            self.query_opt(SQL, &[&id]).await.map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        const HISTORY_SQL: &str = "\
            SELECT owner_id, transferred_at \
            FROM ownership_history \
            WHERE property_id = $1::UUID \
            ORDER BY seq ASC";
        let ownership_history = self
            .query(HISTORY_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|r| property::OwnershipRecord {
                owner_id: r.get("owner_id"),
                transferred_at: r.get("transferred_at"),
            })
            .collect();

        Ok(Some(Property {
            id: row.get("id"),
            hash: row.get("hash"),
            plot_number: row.get("plot_number"),
            location: property::Location {
                region: row.get("region"),
                sub_city: row.get("sub_city"),
                kebele: row.get("kebele"),
                street: row.get("street"),
                house_number: row.get("house_number"),
            },
            kind: row.get("kind"),
            area: row.get("area"),
            status: row.get("status"),
            has_active_dispute: row.get("has_active_dispute"),
            current_transfer: row.get("current_transfer"),
            owner_id: row.get("owner_id"),
            ownership_history,
            created_at: row.get("created_at"),
            status_updated_at: row.get("status_updated_at"),
        }))
    }
}

impl<C> Database<Select<By<Option<Property>, property::Hash>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Property>, property::Id>>,
        Ok = Option<Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Hash>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let hash: property::Hash = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE hash = $1::UUID \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&hash])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, property::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            hash,
            plot_number,
            location:
                property::Location {
                    region,
                    sub_city,
                    kebele,
                    street,
                    house_number,
                },
            kind,
            area,
            status,
            has_active_dispute,
            current_transfer,
            owner_id,
            ownership_history,
            created_at,
            status_updated_at,
        } = property;

        const SQL: &str = "\
            INSERT INTO properties (\
                id, hash, plot_number, \
                region, sub_city, kebele, street, house_number, \
                kind, area, status, \
                has_active_dispute, current_transfer, owner_id, \
                created_at, status_updated_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, \
                $7::VARCHAR, $8::VARCHAR, \
                $9::INT2, $10::NUMERIC, $11::INT2, \
                $12::BOOL, $13::UUID, $14::UUID, \
                $15::TIMESTAMPTZ, $16::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                has_active_dispute = EXCLUDED.has_active_dispute, \
                current_transfer = EXCLUDED.current_transfer, \
                owner_id = EXCLUDED.owner_id, \
                status_updated_at = EXCLUDED.status_updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &hash,
                &plot_number,
                &region,
                &sub_city,
                &kebele,
                &street,
                &house_number,
                &kind,
                &area,
                &status,
                &has_active_dispute,
                &current_transfer,
                &owner_id,
                &created_at,
                &status_updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        // Ownership history is append-only: existing rows are never touched.
        const HISTORY_SQL: &str = "\
            INSERT INTO ownership_history (\
                property_id, seq, owner_id, transferred_at \
            ) VALUES (\
                $1::UUID, $2::INT4, $3::UUID, $4::TIMESTAMPTZ \
            ) \
            ON CONFLICT (property_id, seq) DO NOTHING";
        for (seq, record) in ownership_history.iter().enumerate() {
            let seq = i32::try_from(seq).expect("`seq` overflow");
            self.exec(
                HISTORY_SQL,
                &[&id, &seq, &record.owner_id, &record.transferred_at],
            )
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        }

        Ok(())
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO properties_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Hash>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Hash>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let hash: property::Hash = by.into_inner();

        const SQL: &str = "\
            INSERT INTO properties_creation_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (hash) DO NOTHING";
        self.query(SQL, &[&hash])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
