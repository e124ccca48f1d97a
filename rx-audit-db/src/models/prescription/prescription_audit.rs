use chrono::{DateTime, NaiveDate, Utc};
use heapless::{String as HeaplessString, Vec as HeaplessVec};
use rx_audit_api::{
    AuditError, AuditOutcome, AuditQueue, AuditResult, AuditState, LineDecision, LineKey,
    MAX_PRESCRIPTIONS_PER_AUDIT,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::medication_line::{DecisionPhase, MedicationLineModel};
use crate::models::identifiable::Identifiable;
use crate::utils::hash_as_i64;

/// # Documentation
/// Aggregate root of a prescription audit.
/// - Owns its medication lines and their month grids; lifetime bound to the audit.
/// - `state` is the explicit lifecycle tag; the timestamp fields only record when
///   the escalation and the decision happened.
/// - `hash` covers the whole aggregate with `hash` set to 0 and is the optimistic
///   concurrency token: a commit only lands if the stored hash still matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionAuditModel {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub prescriber_id: Uuid,
    pub prescription_ids: HeaplessVec<Uuid, MAX_PRESCRIPTIONS_PER_AUDIT>,
    pub origin_date: NaiveDate,
    pub requested_months: u8,

    /// Coverage group (health plan) the patient belongs to
    pub coverage_group_id: i32,

    pub note: Option<HeaplessString<500>>,
    pub state: AuditState,

    /// Set while the audit is routed to the physician-auditor
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalated_by: Option<Uuid>,

    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<Uuid>,

    pub lines: Vec<MedicationLineModel>,

    /// Hash of the aggregate with this field set to 0 (0 for unsaved aggregates)
    pub hash: i64,

    /// Latest trail entry written together with this version of the aggregate
    pub last_trail_entry_id: Option<Uuid>,
}

impl Identifiable for PrescriptionAuditModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl PrescriptionAuditModel {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Audits without lines never enter the workflow.
    pub fn ensure_has_lines(&self) -> AuditResult<()> {
        if self.lines.is_empty() {
            return Err(AuditError::ValidationError(format!(
                "audit {} has no medication lines",
                self.id
            )));
        }
        Ok(())
    }

    pub fn line(&self, key: &LineKey) -> AuditResult<&MedicationLineModel> {
        self.lines
            .iter()
            .find(|line| line.key() == *key)
            .ok_or_else(|| AuditError::NotFound(format!("line {key} in audit {}", self.id)))
    }

    pub fn line_mut(&mut self, key: &LineKey) -> AuditResult<&mut MedicationLineModel> {
        let audit_id = self.id;
        self.lines
            .iter_mut()
            .find(|line| line.key() == *key)
            .ok_or_else(|| AuditError::NotFound(format!("line {key} in audit {audit_id}")))
    }

    /// Phase used to derive live decisions, `None` once the audit is closed.
    pub fn decision_phase(&self) -> Option<DecisionPhase> {
        match self.state {
            AuditState::Pending => Some(DecisionPhase::Pending),
            AuditState::EscalatedToPhysician => Some(DecisionPhase::Escalated),
            AuditState::Finalized { .. } | AuditState::Withdrawn => None,
        }
    }

    /// Aggregate outcome over the frozen line decisions.
    pub fn aggregate_outcome(&self) -> AuditOutcome {
        if self
            .lines
            .iter()
            .all(|line| line.decision == LineDecision::Rejected)
        {
            AuditOutcome::Rejected
        } else if self
            .lines
            .iter()
            .any(|line| line.decision == LineDecision::Observed)
        {
            AuditOutcome::Observed
        } else {
            AuditOutcome::Approved
        }
    }

    /// Read-time queue predicate, mirrored by the SQL of the PostgreSQL repository.
    pub fn in_queue(&self, queue: AuditQueue) -> bool {
        match queue {
            AuditQueue::Auditor => self.state == AuditState::Pending && !self.lines.is_empty(),
            AuditQueue::Physician => self.state == AuditState::EscalatedToPhysician,
            AuditQueue::Historical => matches!(self.state, AuditState::Finalized { .. }),
        }
    }

    pub fn compute_hash(&self) -> Result<i64, String> {
        let mut for_hashing = self.clone();
        for_hashing.hash = 0;
        hash_as_i64(&for_hashing)
    }

    /// Recomputes and stores the aggregate hash.
    pub fn seal(&mut self) -> Result<i64, String> {
        self.hash = self.compute_hash()?;
        Ok(self.hash)
    }
}
