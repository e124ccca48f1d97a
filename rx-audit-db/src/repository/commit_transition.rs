use async_trait::async_trait;
use sqlx::Database;

use crate::models::audit::AuditTrailEntryModel;
use crate::models::prescription::PrescriptionAuditModel;

/// Result of an optimistic commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The aggregate (and trail entry, if any) were written
    Committed {
        audit: PrescriptionAuditModel,
        entry: Option<AuditTrailEntryModel>,
    },
    /// Another writer changed or created the audit first; nothing was written
    Conflict,
}

/// Atomically writes an audit aggregate, its lines and an optional trail entry.
///
/// # Concurrency
/// - `expected_hash = None` inserts a new audit and yields `Conflict` if the id
///   already exists.
/// - `expected_hash = Some(h)` updates only if the stored hash is still `h`;
///   otherwise yields `Conflict`.
/// - The caller seals `audit` (see [`PrescriptionAuditModel::seal`]) before
///   committing; the trail entry is chained inside the same transaction.
#[async_trait]
pub trait CommitTransition<DB: Database>: Send + Sync {
    async fn commit_transition(
        &self,
        audit: PrescriptionAuditModel,
        expected_hash: Option<i64>,
        entry: Option<AuditTrailEntryModel>,
    ) -> Result<CommitOutcome, Box<dyn std::error::Error + Send + Sync>>;
}
