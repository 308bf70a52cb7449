//! Application-log-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::audit,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Assembles an [`audit::Entry`] from the provided [`Row`].
fn assemble(row: &Row) -> audit::Entry {
    audit::Entry {
        id: row.get("id"),
        property_id: row.get("property_id"),
        performed_by: row.get("performed_by"),
        actor_role: row.get("actor_role"),
        action: row
            .get::<_, String>("action")
            .parse()
            .expect("valid `Action`"),
        snapshot: row.get("status_snapshot"),
        notes: row.get("notes"),
        metadata: row.get("metadata"),
        recorded_at: row.get("recorded_at"),
    }
}

// The application log is append-only, so `Insert` is the only write
// operation implemented for it.
impl<C> Database<Insert<audit::Entry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<audit::Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        let audit::Entry {
            id,
            property_id,
            performed_by,
            actor_role,
            action,
            snapshot,
            notes,
            metadata,
            recorded_at,
        } = entry;

        let action = action.to_string();

        const SQL: &str = "\
            INSERT INTO application_logs (\
                id, property_id, performed_by, actor_role, action, \
                status_snapshot, notes, metadata, recorded_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, $5::VARCHAR, \
                $6::VARCHAR, $7::VARCHAR, $8::JSONB, $9::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &performed_by,
                &actor_role,
                &action,
                &snapshot,
                &notes,
                &metadata,
                &recorded_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::audit::trail::Page, read::audit::trail::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::audit::trail::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::audit::trail::Page, read::audit::trail::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::audit::trail::Selector {
            arguments,
            filter: read::audit::trail::Filter { property_id },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &property_id];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });

        let sql = format!(
            "SELECT id, property_id, performed_by, actor_role, action, \
                    status_snapshot, notes, metadata, recorded_at \
             FROM application_logs \
             WHERE property_id = $2::UUID \
                   {cursor} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .iter()
            .take(arguments.limit())
            .map(|row| {
                let entry = assemble(row);
                (entry.id, entry)
            })
            .collect::<Vec<_>>();

        Ok(read::audit::trail::Page::new(&arguments, edges, has_more))
    }
}
