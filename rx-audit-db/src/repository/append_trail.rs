use async_trait::async_trait;
use sqlx::Database;

use crate::models::audit::AuditTrailEntryModel;

/// Appends a trail entry that does not accompany an aggregate change, such as
/// a rejected attempt.
///
/// The implementation serializes appends per audit, assigns the chain fields
/// with [`AuditTrailEntryModel::chain_after`] and returns the stored entry.
#[async_trait]
pub trait AppendTrail<DB: Database>: Send + Sync {
    async fn append_trail(
        &self,
        entry: AuditTrailEntryModel,
    ) -> Result<AuditTrailEntryModel, Box<dyn std::error::Error + Send + Sync>>;
}
