use rx_audit_api::{AuditQueue, AuditStatus};
use rx_audit_db::models::prescription::PrescriptionAuditModel;

use super::repo_impl::{attach_lines, PrescriptionAuditRepositoryImpl, AUDIT_COLUMNS};

/// Status and minimum line count selecting a queue.
fn queue_filter(queue: AuditQueue) -> (AuditStatus, i32) {
    match queue {
        AuditQueue::Auditor => (AuditStatus::Pending, 1),
        AuditQueue::Physician => (AuditStatus::EscalatedToPhysician, 0),
        AuditQueue::Historical => (AuditStatus::Finalized, 0),
    }
}

pub(super) async fn find_by_queue_impl(
    repo: &PrescriptionAuditRepositoryImpl,
    queue: AuditQueue,
) -> Result<Vec<PrescriptionAuditModel>, Box<dyn std::error::Error + Send + Sync>> {
    let (status, min_lines) = queue_filter(queue);

    let mut conn = repo.pool.acquire().await?;
    let sql = format!(
        "SELECT {AUDIT_COLUMNS} FROM prescription_audit \
         WHERE status = $1 AND line_count >= $2 \
         ORDER BY origin_date, id"
    );
    let rows = sqlx::query(&sql)
        .bind(status)
        .bind(min_lines)
        .fetch_all(&mut *conn)
        .await?;

    attach_lines(&mut conn, rows).await
}
