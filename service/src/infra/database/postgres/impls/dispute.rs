//! [`Dispute`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{dispute, document, property, timeline, Dispute, Document},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{self, Active},
};

/// Assembles a [`Document`] from the provided [`Row`].
fn assemble_document(row: &Row) -> Document {
    let review = row
        .get::<_, Option<document::Verdict>>("review_verdict")
        .map(|verdict| document::Review {
            verdict,
            notes: row.get("review_notes"),
            reviewed_by: row.get("reviewed_by"),
            reviewed_at: row.get("reviewed_at"),
        });

    Document {
        id: row.get("id"),
        kind: row.get("kind"),
        file: row.get("file_id"),
        uploaded_at: row.get("uploaded_at"),
        review,
    }
}

/// Assembles a [`timeline::Entry`] from the provided [`Row`].
fn assemble_timeline_entry(row: &Row) -> timeline::Entry {
    timeline::Entry {
        action: row
            .get::<_, String>("action")
            .parse()
            .expect("valid `Action`"),
        performed_by: row.get("performed_by"),
        actor_role: row.get("actor_role"),
        notes: row.get("notes"),
        recorded_at: row.get("recorded_at"),
    }
}

impl<C> Database<Select<By<Option<Dispute>, dispute::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Dispute>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Dispute>, dispute::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: dispute::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, property_id, disputant_id, kind, title, description, \
                   status, created_at, \
                   resolution_outcome, resolved_by, resolved_at \
            FROM disputes \
            WHERE id = $1::UUID \
            LIMIT 1";
        let Some(row) =
            self.query_opt(SQL, &[&id]).await.map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        const EVIDENCE_SQL: &str = "\
            SELECT id, kind, file_id, uploaded_at, \
                   review_verdict, review_notes, reviewed_by, reviewed_at \
            FROM dispute_evidence \
            WHERE dispute_id = $1::UUID \
            ORDER BY seq ASC";
        let evidence = self
            .query(EVIDENCE_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(assemble_document)
            .collect();

        const TIMELINE_SQL: &str = "\
            SELECT action, performed_by, actor_role, notes, recorded_at \
            FROM dispute_timeline \
            WHERE dispute_id = $1::UUID \
            ORDER BY seq ASC";
        let timeline = self
            .query(TIMELINE_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(assemble_timeline_entry)
            .collect();

        let resolution = row
            .get::<_, Option<dispute::Outcome>>("resolution_outcome")
            .map(|outcome| dispute::Resolution {
                outcome,
                resolved_by: row.get("resolved_by"),
                resolved_at: row.get("resolved_at"),
            });

        Ok(Some(Dispute {
            id: row.get("id"),
            property_id: row.get("property_id"),
            disputant: row.get("disputant_id"),
            kind: row.get("kind"),
            title: row.get("title"),
            description: row.get("description"),
            evidence,
            status: row.get("status"),
            timeline,
            created_at: row.get("created_at"),
            resolution,
        }))
    }
}

impl<C> Database<Select<By<Option<Active<Dispute>>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Dispute>, dispute::Id>>,
        Ok = Option<Dispute>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Active<Dispute>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Dispute>>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM disputes \
            WHERE property_id = $1::UUID \
              AND status NOT IN ($2::INT2, $3::INT2) \
            LIMIT 1";
        let Some(row) = self
            .query_opt(
                SQL,
                &[
                    &property_id,
                    &dispute::Status::Resolved,
                    &dispute::Status::Withdrawn,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, dispute::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
            .map(|d| d.map(Active))
    }
}

impl<C>
    Database<
        Select<By<read::dispute::OtherActive, (property::Id, dispute::Id)>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::dispute::OtherActive;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::dispute::OtherActive, (property::Id, dispute::Id)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (property_id, excluded) = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM disputes \
            WHERE property_id = $1::UUID \
              AND id <> $2::UUID \
              AND status NOT IN ($3::INT2, $4::INT2) \
            LIMIT 1";
        self.query_opt(
            SQL,
            &[
                &property_id,
                &excluded,
                &dispute::Status::Resolved,
                &dispute::Status::Withdrawn,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| read::dispute::OtherActive(row.is_some()))
    }
}

impl<C> Database<Insert<Dispute>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Dispute>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(dispute): Insert<Dispute>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(dispute)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Dispute>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(dispute): Update<Dispute>,
    ) -> Result<Self::Ok, Self::Err> {
        let Dispute {
            id,
            property_id,
            disputant,
            kind,
            title,
            description,
            evidence,
            status,
            timeline,
            created_at,
            resolution,
        } = dispute;

        let outcome = resolution.as_ref().map(|r| r.outcome.clone());
        let resolved_by = resolution.as_ref().map(|r| r.resolved_by);
        let resolved_at = resolution.as_ref().map(|r| r.resolved_at);

        const SQL: &str = "\
            INSERT INTO disputes (\
                id, property_id, disputant_id, kind, title, description, \
                status, created_at, \
                resolution_outcome, resolved_by, resolved_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, $5::VARCHAR, \
                $6::VARCHAR, $7::INT2, $8::TIMESTAMPTZ, \
                $9::VARCHAR, $10::UUID, $11::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                resolution_outcome = EXCLUDED.resolution_outcome, \
                resolved_by = EXCLUDED.resolved_by, \
                resolved_at = EXCLUDED.resolved_at";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &disputant,
                &kind,
                &title,
                &description,
                &status,
                &created_at,
                &outcome,
                &resolved_by,
                &resolved_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        const EVIDENCE_SQL: &str = "\
            INSERT INTO dispute_evidence (\
                id, dispute_id, seq, kind, file_id, uploaded_at, \
                review_verdict, review_notes, reviewed_by, reviewed_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::INT4, $4::INT2, $5::VARCHAR, \
                $6::TIMESTAMPTZ, $7::INT2, $8::VARCHAR, $9::UUID, \
                $10::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO NOTHING";
        for (seq, doc) in evidence.iter().enumerate() {
            let seq = i32::try_from(seq).expect("`seq` overflow");
            let verdict = doc.review.as_ref().map(|r| r.verdict);
            let notes = doc.review.as_ref().map(|r| r.notes.clone());
            let reviewed_by = doc.review.as_ref().map(|r| r.reviewed_by);
            let reviewed_at = doc.review.as_ref().map(|r| r.reviewed_at);
            self.exec(
                EVIDENCE_SQL,
                &[
                    &doc.id,
                    &id,
                    &seq,
                    &doc.kind,
                    &doc.file,
                    &doc.uploaded_at,
                    &verdict,
                    &notes,
                    &reviewed_by,
                    &reviewed_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        }

        // The timeline is append-only: existing rows are never touched.
        const TIMELINE_SQL: &str = "\
            INSERT INTO dispute_timeline (\
                dispute_id, seq, action, performed_by, actor_role, \
                notes, recorded_at \
            ) VALUES (\
                $1::UUID, $2::INT4, $3::VARCHAR, $4::UUID, $5::INT2, \
                $6::VARCHAR, $7::TIMESTAMPTZ \
            ) \
            ON CONFLICT (dispute_id, seq) DO NOTHING";
        for (seq, entry) in timeline.iter().enumerate() {
            let seq = i32::try_from(seq).expect("`seq` overflow");
            let action = entry.action.to_string();
            self.exec(
                TIMELINE_SQL,
                &[
                    &id,
                    &seq,
                    &action,
                    &entry.performed_by,
                    &entry.actor_role,
                    &entry.notes,
                    &entry.recorded_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        }

        Ok(())
    }
}
