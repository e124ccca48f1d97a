use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::audit::AuditTrailEntryModel;
use crate::repository::pagination::{Page, PageRequest};

/// Reads the trail of one audit, ordered by sequence ascending.
///
/// # Example
/// ```ignore
/// use rx_audit_db::repository::pagination::PageRequest;
///
/// let page = repo.load_trail(audit_id, PageRequest::new(20, 0)).await?;
/// println!("{} of {} entries", page.items.len(), page.total);
/// ```
#[async_trait]
pub trait LoadTrail<DB: Database>: Send + Sync {
    /// Paginated window of the trail
    async fn load_trail(
        &self,
        audit_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<AuditTrailEntryModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Whole trail, used for hash chain verification
    async fn load_full_trail(
        &self,
        audit_id: Uuid,
    ) -> Result<Vec<AuditTrailEntryModel>, Box<dyn std::error::Error + Send + Sync>>;
}
