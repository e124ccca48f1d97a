use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use heapless::Vec as HeaplessVec;
use rx_audit_api::{AuditOutcome, AuditQueue, AuditState, AuditStatus, Coverage};
use rx_audit_db::{
    models::audit::AuditTrailEntryModel,
    models::prescription::{MedicationLineModel, MonthApprovalMatrix, PrescriptionAuditModel},
    repository::{
        commit_transition::{CommitOutcome, CommitTransition},
        find_by_queue::FindByQueue,
        load_batch::LoadBatch,
    },
};
use sqlx::{postgres::PgRow, PgConnection, PgPool, Postgres, Row};
use uuid::Uuid;

use crate::utils::{get_from_integer, get_from_smallint, get_optional_heapless_string, TryFromRow};

pub struct PrescriptionAuditRepositoryImpl {
    pub(crate) pool: Arc<PgPool>,
}

impl PrescriptionAuditRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Audit row without its lines; `lines` is filled by [`attach_lines`].
impl TryFromRow<PgRow> for PrescriptionAuditModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let status: AuditStatus = row.try_get("status")?;
        let outcome: Option<AuditOutcome> = row.try_get("outcome")?;

        let stored_ids: Vec<Uuid> = row.try_get("prescription_ids")?;
        let mut prescription_ids = HeaplessVec::new();
        for id in stored_ids {
            prescription_ids
                .push(id)
                .map_err(|_| "Too many prescriptions stored for one audit")?;
        }

        Ok(PrescriptionAuditModel {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            prescriber_id: row.try_get("prescriber_id")?,
            prescription_ids,
            origin_date: row.try_get("origin_date")?,
            requested_months: get_from_smallint(row, "requested_months")?,
            coverage_group_id: row.try_get("coverage_group_id")?,
            note: get_optional_heapless_string(row, "note")?,
            state: AuditState::from_parts(status, outcome)?,
            escalated_at: row.try_get("escalated_at")?,
            escalated_by: row.try_get("escalated_by")?,
            decided_at: row.try_get("decided_at")?,
            decided_by: row.try_get("decided_by")?,
            lines: Vec::new(),
            hash: row.try_get("hash")?,
            last_trail_entry_id: row.try_get("last_trail_entry_id")?,
        })
    }
}

/// Line row joined with its audit's `requested_months`.
impl TryFromRow<PgRow> for MedicationLineModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let requested_months: u8 = get_from_smallint(row, "requested_months")?;
        let approved_bits: u16 = get_from_smallint(row, "approved_months")?;
        let percentage: Option<i16> = row.try_get("coverage_percentage")?;
        let coverage_type: Option<String> = row.try_get("coverage_type")?;

        let coverage = match (percentage, coverage_type) {
            (Some(percentage), Some(coverage_type)) => {
                let percentage = u8::try_from(percentage)
                    .map_err(|_| format!("Invalid coverage percentage {percentage}"))?;
                Some(Coverage::parse(percentage, &coverage_type)?)
            }
            (None, None) => None,
            _ => return Err("Coverage percentage and type must be stored together".into()),
        };

        Ok(MedicationLineModel {
            prescription_id: row.try_get("prescription_id")?,
            line_number: get_from_smallint(row, "line_number")?,
            medication_id: row.try_get("medication_id")?,
            prescribed_quantity: get_from_integer(row, "prescribed_quantity")?,
            dosage_instructions: get_optional_heapless_string(row, "dosage_instructions")?,
            observation: get_optional_heapless_string(row, "observation")?,
            months: MonthApprovalMatrix::from_bits(requested_months, approved_bits)?,
            coverage,
            decision: row.try_get("decision")?,
        })
    }
}

pub(crate) const AUDIT_COLUMNS: &str = r#"
    id, patient_id, prescriber_id, prescription_ids, origin_date, requested_months,
    coverage_group_id, note, status, outcome, escalated_at, escalated_by,
    decided_at, decided_by, hash, last_trail_entry_id
"#;

/// Loads the lines of the given audits, grouped by audit and ordered by line key.
pub(crate) async fn load_lines(
    conn: &mut PgConnection,
    audit_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<MedicationLineModel>>, Box<dyn std::error::Error + Send + Sync>> {
    if audit_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query(
        r#"
        SELECT l.audit_id, l.prescription_id, l.line_number, l.medication_id,
               l.prescribed_quantity, l.dosage_instructions, l.observation,
               l.approved_months, l.coverage_percentage, l.coverage_type, l.decision,
               a.requested_months
        FROM medication_line l
        JOIN prescription_audit a ON a.id = l.audit_id
        WHERE l.audit_id = ANY($1)
        ORDER BY l.audit_id, l.prescription_id, l.line_number
        "#,
    )
    .bind(audit_ids)
    .fetch_all(conn)
    .await?;

    let mut lines: HashMap<Uuid, Vec<MedicationLineModel>> = HashMap::new();
    for row in rows {
        let audit_id: Uuid = row.try_get("audit_id")?;
        lines
            .entry(audit_id)
            .or_default()
            .push(MedicationLineModel::try_from_row(&row)?);
    }
    Ok(lines)
}

/// Turns audit rows into full aggregates, keeping the row order.
pub(crate) async fn attach_lines(
    conn: &mut PgConnection,
    rows: Vec<PgRow>,
) -> Result<Vec<PrescriptionAuditModel>, Box<dyn std::error::Error + Send + Sync>> {
    let mut audits = rows
        .iter()
        .map(PrescriptionAuditModel::try_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let ids: Vec<Uuid> = audits.iter().map(|audit| audit.id).collect();
    let mut lines = load_lines(conn, &ids).await?;
    for audit in audits.iter_mut() {
        audit.lines = lines.remove(&audit.id).unwrap_or_default();
    }
    Ok(audits)
}

#[async_trait]
impl LoadBatch<Postgres, PrescriptionAuditModel> for PrescriptionAuditRepositoryImpl {
    async fn load_batch(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<PrescriptionAuditModel>>, Box<dyn std::error::Error + Send + Sync>> {
        super::load_batch::load_batch_impl(self, ids).await
    }
}

#[async_trait]
impl FindByQueue<Postgres> for PrescriptionAuditRepositoryImpl {
    async fn find_by_queue(
        &self,
        queue: AuditQueue,
    ) -> Result<Vec<PrescriptionAuditModel>, Box<dyn std::error::Error + Send + Sync>> {
        super::find_by_queue::find_by_queue_impl(self, queue).await
    }
}

#[async_trait]
impl CommitTransition<Postgres> for PrescriptionAuditRepositoryImpl {
    async fn commit_transition(
        &self,
        audit: PrescriptionAuditModel,
        expected_hash: Option<i64>,
        entry: Option<AuditTrailEntryModel>,
    ) -> Result<CommitOutcome, Box<dyn std::error::Error + Send + Sync>> {
        super::commit_transition::commit_transition_impl(self, audit, expected_hash, entry).await
    }
}
