//! [`Transfer`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        document, property, timeline,
        transfer::{self, compliance, ComplianceChecks},
        Document, Transfer,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::Active,
};

/// Assembles the [`ComplianceChecks`] of a [`Transfer`] from its [`Row`].
fn assemble_compliance(row: &Row) -> Option<ComplianceChecks> {
    let law: Option<compliance::CheckStatus> = row.get("law_status");
    let tax: Option<compliance::CheckStatus> = row.get("tax_status");
    let fraud: Option<compliance::CheckStatus> = row.get("fraud_status");
    let risk: Option<compliance::RiskLevel> = row.get("fraud_risk");

    let (Some(law), Some(tax), Some(fraud), Some(risk)) =
        (law, tax, fraud, risk)
    else {
        return None;
    };

    Some(ComplianceChecks {
        ethiopian_law: compliance::Check {
            status: law,
            notes: row.get("law_notes"),
        },
        tax_clearance: compliance::Check {
            status: tax,
            notes: row.get("tax_notes"),
        },
        fraud_prevention: compliance::FraudCheck {
            check: compliance::Check {
                status: fraud,
                notes: row.get("fraud_notes"),
            },
            risk_level: risk,
        },
    })
}

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

impl<C> Database<Select<By<Option<Transfer>, transfer::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Transfer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Transfer>, transfer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: transfer::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, property_id, previous_owner_id, new_owner_id, \
                   kind, value_amount, value_currency, reason, status, \
                   law_status, law_notes, \
                   tax_status, tax_notes, \
                   fraud_status, fraud_notes, fraud_risk, \
                   created_at, decided_at \
            FROM transfers \
            WHERE id = $1::UUID \
            LIMIT 1";
        let Some(row) =
            self.query_opt(SQL, &[&id]).await.map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        const DOCUMENTS_SQL: &str = "\
            SELECT id, kind, file_id, uploaded_at, \
                   review_verdict, review_notes, reviewed_by, reviewed_at \
            FROM transfer_documents \
            WHERE transfer_id = $1::UUID \
            ORDER BY seq ASC";
        let documents = self
            .query(DOCUMENTS_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(assemble_document)
            .collect();

        const TIMELINE_SQL: &str = "\
            SELECT action, performed_by, actor_role, notes, recorded_at \
            FROM transfer_timeline \
            WHERE transfer_id = $1::UUID \
            ORDER BY seq ASC";
        let timeline = self
            .query(TIMELINE_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(assemble_timeline_entry)
            .collect();

        Ok(Some(Transfer {
            id: row.get("id"),
            property_id: row.get("property_id"),
            previous_owner: row.get("previous_owner_id"),
            new_owner: row.get("new_owner_id"),
            kind: row.get("kind"),
            value: common::Money {
                amount: row.get("value_amount"),
                currency: row.get("value_currency"),
            },
            reason: row.get("reason"),
            status: row.get("status"),
            documents,
            compliance: assemble_compliance(&row),
            timeline,
            created_at: row.get("created_at"),
            decided_at: row.get("decided_at"),
        }))
    }
}

impl<C> Database<Select<By<Option<Active<Transfer>>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Transfer>, transfer::Id>>,
        Ok = Option<Transfer>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Active<Transfer>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Transfer>>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM transfers \
            WHERE property_id = $1::UUID \
              AND status NOT IN ($2::INT2, $3::INT2, $4::INT2) \
            LIMIT 1";
        let Some(row) = self
            .query_opt(
                SQL,
                &[
                    &property_id,
                    &transfer::Status::Rejected,
                    &transfer::Status::Completed,
                    &transfer::Status::Cancelled,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, transfer::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
            .map(|t| t.map(Active))
    }
}

impl<C> Database<Insert<Transfer>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Transfer>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(transfer): Insert<Transfer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(transfer))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Transfer>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transfer): Update<Transfer>,
    ) -> Result<Self::Ok, Self::Err> {
        let Transfer {
            id,
            property_id,
            previous_owner,
            new_owner,
            kind,
            value,
            reason,
            status,
            documents,
            compliance,
            timeline,
            created_at,
            decided_at,
        } = transfer;

        let (law_status, law_notes) = compliance
            .as_ref()
            .map(|c| (c.ethiopian_law.status, c.ethiopian_law.notes.clone()))
            .unzip();
        let (tax_status, tax_notes) = compliance
            .as_ref()
            .map(|c| (c.tax_clearance.status, c.tax_clearance.notes.clone()))
            .unzip();
        let (fraud_status, fraud_notes) = compliance
            .as_ref()
            .map(|c| {
                (
                    c.fraud_prevention.check.status,
                    c.fraud_prevention.check.notes.clone(),
                )
            })
            .unzip();
        let fraud_risk =
            compliance.as_ref().map(|c| c.fraud_prevention.risk_level);

        const SQL: &str = "\
            INSERT INTO transfers (\
                id, property_id, previous_owner_id, new_owner_id, \
                kind, value_amount, value_currency, reason, status, \
                law_status, law_notes, \
                tax_status, tax_notes, \
                fraud_status, fraud_notes, fraud_risk, \
                created_at, decided_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::INT2, $6::NUMERIC, $7::INT2, $8::VARCHAR, $9::INT2, \
                $10::INT2, $11::VARCHAR, \
                $12::INT2, $13::VARCHAR, \
                $14::INT2, $15::VARCHAR, $16::INT2, \
                $17::TIMESTAMPTZ, $18::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                law_status = EXCLUDED.law_status, \
                law_notes = EXCLUDED.law_notes, \
                tax_status = EXCLUDED.tax_status, \
                tax_notes = EXCLUDED.tax_notes, \
                fraud_status = EXCLUDED.fraud_status, \
                fraud_notes = EXCLUDED.fraud_notes, \
                fraud_risk = EXCLUDED.fraud_risk, \
                decided_at = EXCLUDED.decided_at";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &previous_owner,
                &new_owner,
                &kind,
                &value.amount,
                &value.currency,
                &reason,
                &status,
                &law_status,
                &law_notes,
                &tax_status,
                &tax_notes,
                &fraud_status,
                &fraud_notes,
                &fraud_risk,
                &created_at,
                &decided_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        const DOCUMENT_SQL: &str = "\
            INSERT INTO transfer_documents (\
                id, transfer_id, seq, kind, file_id, uploaded_at, \
                review_verdict, review_notes, reviewed_by, reviewed_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::INT4, $4::INT2, $5::VARCHAR, \
                $6::TIMESTAMPTZ, $7::INT2, $8::VARCHAR, $9::UUID, \
                $10::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET review_verdict = EXCLUDED.review_verdict, \
                review_notes = EXCLUDED.review_notes, \
                reviewed_by = EXCLUDED.reviewed_by, \
                reviewed_at = EXCLUDED.reviewed_at";
        for (seq, doc) in documents.iter().enumerate() {
            let seq = i32::try_from(seq).expect("`seq` overflow");
            let verdict = doc.review.as_ref().map(|r| r.verdict);
            let notes = doc.review.as_ref().map(|r| r.notes.clone());
            let reviewed_by = doc.review.as_ref().map(|r| r.reviewed_by);
            let reviewed_at = doc.review.as_ref().map(|r| r.reviewed_at);
            self.exec(
                DOCUMENT_SQL,
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
            INSERT INTO transfer_timeline (\
                transfer_id, seq, action, performed_by, actor_role, \
                notes, recorded_at \
            ) VALUES (\
                $1::UUID, $2::INT4, $3::VARCHAR, $4::UUID, $5::INT2, \
                $6::VARCHAR, $7::TIMESTAMPTZ \
            ) \
            ON CONFLICT (transfer_id, seq) DO NOTHING";
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
