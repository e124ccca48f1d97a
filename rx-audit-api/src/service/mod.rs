pub mod requests;
pub mod views;

pub use requests::*;
pub use views::*;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Actor, ActorRole};
use crate::error::AuditResult;

/// Command and query surface of the prescription audit core.
///
/// Every mutating call carries the already authenticated [`Actor`]. Errors are
/// returned as [`crate::AuditError`] values and are never retried internally.
#[async_trait]
pub trait PrescriptionAuditService: Send + Sync {
    /// Work queue for the given role, ordered by origin date.
    async fn get_pending(&self, role: ActorRole) -> AuditResult<Vec<AuditSummary>>;

    /// Audits currently routed to the physician-auditor.
    async fn get_escalated(&self) -> AuditResult<Vec<AuditSummary>>;

    /// Finalized audits.
    async fn get_historical(&self) -> AuditResult<Vec<AuditSummary>>;

    async fn load_detail(&self, audit_id: Uuid) -> AuditResult<AuditDetail>;

    /// Registers an audit received from the coverage system.
    async fn open_audit(&self, actor: Actor, request: OpenAuditRequest) -> AuditResult<AuditSummary>;

    async fn set_month_approval(
        &self,
        actor: Actor,
        request: SetMonthApprovalRequest,
    ) -> AuditResult<MedicationLineView>;

    /// Approves or rejects every requested month of one line.
    async fn bulk_set_all_months(
        &self,
        actor: Actor,
        request: BulkSetMonthsRequest,
    ) -> AuditResult<MedicationLineView>;

    async fn set_coverage(&self, actor: Actor, request: SetCoverageRequest) -> AuditResult<MedicationLineView>;

    async fn set_observation(
        &self,
        actor: Actor,
        request: SetObservationRequest,
    ) -> AuditResult<MedicationLineView>;

    /// Freezes line decisions and moves the audit to the historical queue.
    async fn process_audit(&self, actor: Actor, request: ProcessAuditRequest) -> AuditResult<AuditDetail>;

    async fn escalate_to_physician(&self, actor: Actor, audit_id: Uuid) -> AuditResult<AuditSummary>;

    /// Privileged recovery: return to pending or withdraw from all queues.
    async fn revert_or_delete(&self, actor: Actor, request: RevertRequest) -> AuditResult<AuditSummary>;

    async fn load_trail(&self, audit_id: Uuid, limit: usize, offset: usize) -> AuditResult<TrailPage>;

    /// Recomputes the trail hash chain of an audit.
    async fn verify_trail(&self, audit_id: Uuid) -> AuditResult<bool>;
}
