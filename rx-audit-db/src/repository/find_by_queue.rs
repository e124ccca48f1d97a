use async_trait::async_trait;
use rx_audit_api::AuditQueue;
use sqlx::Database;

use crate::models::prescription::PrescriptionAuditModel;

/// Read-time work queue filter over the audit collection.
///
/// Implementations apply the same predicate as
/// [`PrescriptionAuditModel::in_queue`] and order the result by
/// `(origin_date, id)`, so repeated reads without mutation are identical.
#[async_trait]
pub trait FindByQueue<DB: Database>: Send + Sync {
    async fn find_by_queue(
        &self,
        queue: AuditQueue,
    ) -> Result<Vec<PrescriptionAuditModel>, Box<dyn std::error::Error + Send + Sync>>;
}
