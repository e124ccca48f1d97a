use rx_audit_db::{
    models::audit::AuditTrailEntryModel,
    models::prescription::PrescriptionAuditModel,
    repository::commit_transition::CommitOutcome,
};
use sqlx::PgConnection;

use super::repo_impl::PrescriptionAuditRepositoryImpl;
use crate::repository::audit::audit_trail_repository::repo_impl::chain_and_insert;

pub(super) async fn commit_transition_impl(
    repo: &PrescriptionAuditRepositoryImpl,
    audit: PrescriptionAuditModel,
    expected_hash: Option<i64>,
    entry: Option<AuditTrailEntryModel>,
) -> Result<CommitOutcome, Box<dyn std::error::Error + Send + Sync>> {
    let mut tx = repo.pool.begin().await?;

    let written = match expected_hash {
        None => insert_audit(&mut *tx, &audit).await?,
        Some(expected) => update_audit(&mut *tx, &audit, expected).await?,
    };
    if !written {
        tx.rollback().await?;
        tracing::warn!(
            audit_id = %audit.id,
            expected_hash = ?expected_hash,
            "Audit commit lost the optimistic race"
        );
        return Ok(CommitOutcome::Conflict);
    }

    sqlx::query("DELETE FROM medication_line WHERE audit_id = $1")
        .bind(audit.id)
        .execute(&mut *tx)
        .await?;
    insert_lines(&mut *tx, &audit).await?;

    let entry = match entry {
        Some(entry) => Some(chain_and_insert(&mut *tx, entry).await?),
        None => None,
    };

    tx.commit().await?;
    tracing::debug!(audit_id = %audit.id, hash = audit.hash, "Audit committed");
    Ok(CommitOutcome::Committed { audit, entry })
}

/// Inserts a new aggregate row; `false` when the id is already taken.
async fn insert_audit(
    conn: &mut PgConnection,
    audit: &PrescriptionAuditModel,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let result = sqlx::query(
        r#"
        INSERT INTO prescription_audit (
            id, patient_id, prescriber_id, prescription_ids, origin_date, requested_months,
            coverage_group_id, note, status, outcome, escalated_at, escalated_by,
            decided_at, decided_by, line_count, hash, last_trail_entry_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(audit.id)
    .bind(audit.patient_id)
    .bind(audit.prescriber_id)
    .bind(audit.prescription_ids.as_slice())
    .bind(audit.origin_date)
    .bind(i16::from(audit.requested_months))
    .bind(audit.coverage_group_id)
    .bind(audit.note.as_ref().map(|note| note.as_str()))
    .bind(audit.state.status())
    .bind(audit.state.outcome())
    .bind(audit.escalated_at)
    .bind(audit.escalated_by)
    .bind(audit.decided_at)
    .bind(audit.decided_by)
    .bind(i32::try_from(audit.line_count())?)
    .bind(audit.hash)
    .bind(audit.last_trail_entry_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Compare-and-swap on the stored hash; `false` when another writer got there first.
async fn update_audit(
    conn: &mut PgConnection,
    audit: &PrescriptionAuditModel,
    expected_hash: i64,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let result = sqlx::query(
        r#"
        UPDATE prescription_audit
        SET note = $2, status = $3, outcome = $4, escalated_at = $5, escalated_by = $6,
            decided_at = $7, decided_by = $8, line_count = $9, hash = $10,
            last_trail_entry_id = $11
        WHERE id = $1 AND hash = $12
        "#,
    )
    .bind(audit.id)
    .bind(audit.note.as_ref().map(|note| note.as_str()))
    .bind(audit.state.status())
    .bind(audit.state.outcome())
    .bind(audit.escalated_at)
    .bind(audit.escalated_by)
    .bind(audit.decided_at)
    .bind(audit.decided_by)
    .bind(i32::try_from(audit.line_count())?)
    .bind(audit.hash)
    .bind(audit.last_trail_entry_id)
    .bind(expected_hash)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

async fn insert_lines(
    conn: &mut PgConnection,
    audit: &PrescriptionAuditModel,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for line in &audit.lines {
        sqlx::query(
            r#"
            INSERT INTO medication_line (
                audit_id, prescription_id, line_number, medication_id, prescribed_quantity,
                dosage_instructions, observation, approved_months,
                coverage_percentage, coverage_type, decision
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(audit.id)
        .bind(line.prescription_id)
        .bind(i16::from(line.line_number))
        .bind(line.medication_id)
        .bind(i32::from(line.prescribed_quantity))
        .bind(line.dosage_instructions.as_ref().map(|text| text.as_str()))
        .bind(line.observation.as_ref().map(|text| text.as_str()))
        .bind(i16::try_from(line.months.bits())?)
        .bind(line.coverage.map(|coverage| i16::from(coverage.percentage.percent())))
        .bind(line.coverage.map(|coverage| coverage.coverage_type.code()))
        .bind(line.decision)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
