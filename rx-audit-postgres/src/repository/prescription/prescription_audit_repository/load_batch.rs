use std::collections::HashMap;

use rx_audit_db::models::prescription::PrescriptionAuditModel;
use uuid::Uuid;

use super::repo_impl::{attach_lines, PrescriptionAuditRepositoryImpl, AUDIT_COLUMNS};

pub(super) async fn load_batch_impl(
    repo: &PrescriptionAuditRepositoryImpl,
    ids: &[Uuid],
) -> Result<Vec<Option<PrescriptionAuditModel>>, Box<dyn std::error::Error + Send + Sync>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let mut conn = repo.pool.acquire().await?;
    let sql = format!("SELECT {AUDIT_COLUMNS} FROM prescription_audit WHERE id = ANY($1)");
    let rows = sqlx::query(&sql).bind(ids).fetch_all(&mut *conn).await?;
    let audits = attach_lines(&mut conn, rows).await?;

    // Build a map of id -> model
    let mut map: HashMap<Uuid, PrescriptionAuditModel> =
        audits.into_iter().map(|audit| (audit.id, audit)).collect();

    // Return results in the same order as input ids
    Ok(ids.iter().map(|id| map.remove(id)).collect())
}
