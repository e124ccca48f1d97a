use heapless::String as HeaplessString;
use rx_audit_api::{AuditError, AuditResult, AuditState, Coverage, LineDecision, LineKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::month_approval::MonthApprovalMatrix;
use crate::utils::optional_bounded_string;

/// Where a decision is being derived in the audit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionPhase {
    /// Working on a pending audit
    Pending,
    /// Working on an audit routed to the physician-auditor
    Escalated,
    /// Explicit decision pass at finalization
    Final,
}

/// # Documentation
/// One prescribed medication within an audit, keyed by `(prescription_id, line_number)`.
/// Owned by its [`super::PrescriptionAuditModel`]; carries its own month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationLineModel {
    pub prescription_id: Uuid,
    pub line_number: u8,
    pub medication_id: Uuid,
    pub prescribed_quantity: u16,
    pub dosage_instructions: Option<HeaplessString<250>>,

    /// Auditor remark; a non-empty remark on a partially approved line marks it Observed
    pub observation: Option<HeaplessString<250>>,

    pub months: MonthApprovalMatrix,
    pub coverage: Option<Coverage>,

    /// Decision frozen at finalization; `Pending` until then
    pub decision: LineDecision,
}

impl MedicationLineModel {
    pub fn key(&self) -> LineKey {
        LineKey::new(self.prescription_id, self.line_number)
    }

    pub fn has_observation(&self) -> bool {
        self.observation
            .as_ref()
            .is_some_and(|text| !text.trim().is_empty())
    }

    /// Pure derivation over the month grid and observation.
    pub fn derive_decision(&self, phase: DecisionPhase) -> LineDecision {
        if self.months.is_empty() {
            return match phase {
                DecisionPhase::Pending => LineDecision::Pending,
                DecisionPhase::Escalated => LineDecision::PendingPhysician,
                DecisionPhase::Final => LineDecision::Rejected,
            };
        }
        if self.has_observation() && !self.months.is_complete() {
            LineDecision::Observed
        } else {
            LineDecision::Approved
        }
    }

    /// Decision as seen by a reader: live while the audit is open, frozen afterwards.
    pub fn current_decision(&self, state: &AuditState) -> LineDecision {
        match state {
            AuditState::Pending => self.derive_decision(DecisionPhase::Pending),
            AuditState::EscalatedToPhysician => self.derive_decision(DecisionPhase::Escalated),
            AuditState::Finalized { .. } | AuditState::Withdrawn => self.decision,
        }
    }

    pub fn set_month(&mut self, month: u8, approved: bool) -> AuditResult<()> {
        self.months.set(month, approved)
    }

    pub fn set_all_months(&mut self, approved: bool) {
        self.months.set_all(approved);
    }

    /// Coverage only applies to lines with at least one approved month.
    pub fn set_coverage(&mut self, coverage: Coverage) -> AuditResult<()> {
        if self.months.is_empty() {
            return Err(AuditError::ValidationError(format!(
                "line {} has no approved month; coverage cannot be set",
                self.key()
            )));
        }
        self.coverage = Some(coverage);
        Ok(())
    }

    pub fn set_observation(&mut self, text: &str) -> AuditResult<()> {
        self.observation = optional_bounded_string("observation", Some(text))?;
        Ok(())
    }

    /// Freezes the final decision. Approved lines without coverage get the
    /// default; rejected lines carry none.
    pub fn freeze(&mut self, default_coverage: Coverage) -> LineDecision {
        self.decision = self.derive_decision(DecisionPhase::Final);
        if self.decision.is_approved() {
            self.coverage = Some(self.coverage.unwrap_or(default_coverage));
        } else {
            self.coverage = None;
        }
        self.decision
    }

    /// Drops the frozen decision; the grid is kept.
    pub fn reopen(&mut self) {
        self.decision = LineDecision::Pending;
    }
}
