//! State transitions on a loaded aggregate.
//!
//! Each function works on a scratch copy of the audit: on error the copy is
//! dropped, on success the engine commits it against the hash it was loaded
//! with.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use heapless::Vec as HeaplessVec;
use rx_audit_api::{
    authorize, Actor, AuditError, AuditResult, AuditState, Command, Coverage, LineDecision,
    LineDecisionInput, OpenAuditRequest, RevertMode,
};
use rx_audit_db::models::{MedicationLineModel, MonthApprovalMatrix, PrescriptionAuditModel};
use rx_audit_db::utils::optional_bounded_string;

/// Builds a new pending aggregate from an intake request.
pub fn open(request: &OpenAuditRequest) -> AuditResult<PrescriptionAuditModel> {
    if request.prescription_ids.is_empty() {
        return Err(AuditError::ValidationError(
            "an audit bundles one to three prescriptions".to_string(),
        ));
    }
    let mut prescription_ids = HeaplessVec::new();
    for id in &request.prescription_ids {
        if prescription_ids.contains(id) {
            return Err(AuditError::ValidationError(format!(
                "prescription {id} is listed twice"
            )));
        }
        prescription_ids.push(*id).map_err(|_| {
            AuditError::ValidationError("an audit bundles one to three prescriptions".to_string())
        })?;
    }

    let mut seen = HashSet::new();
    let mut lines = Vec::with_capacity(request.lines.len());
    for line in &request.lines {
        let key = line.key;
        if key.line_number == 0 {
            return Err(AuditError::ValidationError(format!(
                "line {key} must be numbered from 1"
            )));
        }
        if !prescription_ids.contains(&key.prescription_id) {
            return Err(AuditError::ValidationError(format!(
                "line {key} references a prescription outside the audit"
            )));
        }
        if !seen.insert(key) {
            return Err(AuditError::ValidationError(format!("line {key} is listed twice")));
        }
        lines.push(MedicationLineModel {
            prescription_id: key.prescription_id,
            line_number: key.line_number,
            medication_id: line.medication_id,
            prescribed_quantity: line.prescribed_quantity,
            dosage_instructions: optional_bounded_string(
                "dosage instructions",
                line.dosage_instructions.as_deref(),
            )?,
            observation: optional_bounded_string("observation", line.observation.as_deref())?,
            months: MonthApprovalMatrix::new(request.requested_months)?,
            coverage: None,
            decision: LineDecision::Pending,
        });
    }
    lines.sort_by_key(|line| line.key());

    Ok(PrescriptionAuditModel {
        id: request.audit_id,
        patient_id: request.patient_id,
        prescriber_id: request.prescriber_id,
        prescription_ids,
        origin_date: request.origin_date,
        requested_months: request.requested_months,
        coverage_group_id: request.coverage_group_id,
        note: optional_bounded_string("note", request.note.as_deref())?,
        state: AuditState::Pending,
        escalated_at: None,
        escalated_by: None,
        decided_at: None,
        decided_by: None,
        lines,
        hash: 0,
        last_trail_entry_id: None,
    })
}

/// Checks that the actor may edit month approvals, coverage and observations.
pub fn ensure_ledger_editable(audit: &PrescriptionAuditModel, actor: &Actor) -> AuditResult<()> {
    audit.ensure_has_lines()?;
    authorize(actor.role, Command::EditLedger, audit.state.status())
}

/// Applies the decision set, freezes every line and closes the audit.
pub fn finalize(
    audit: &mut PrescriptionAuditModel,
    actor: &Actor,
    decisions: &[LineDecisionInput],
    note: Option<&str>,
    default_coverage: Coverage,
    now: DateTime<Utc>,
) -> AuditResult<()> {
    audit.ensure_has_lines()?;
    authorize(actor.role, Command::Finalize, audit.state.status())?;

    if decisions.is_empty() {
        return Err(AuditError::ValidationError(
            "decision set must not be empty".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for decision in decisions {
        if !seen.insert(decision.key) {
            return Err(AuditError::ValidationError(format!(
                "line {} appears twice in the decision set",
                decision.key
            )));
        }
    }

    let requested_months = audit.requested_months;
    for decision in decisions {
        let months = MonthApprovalMatrix::from_months(requested_months, &decision.approved_months)?;
        let coverage = decision
            .coverage
            .as_ref()
            .map(|input| input.parse())
            .transpose()?;
        let line = audit.line_mut(&decision.key)?;
        line.months = months;
        if let Some(observation) = decision.observation.as_deref() {
            line.set_observation(observation)?;
        }
        if let Some(coverage) = coverage {
            line.set_coverage(coverage)?;
        }
    }

    for line in audit.lines.iter_mut() {
        line.freeze(default_coverage);
    }
    if let Some(note) = note {
        audit.note = optional_bounded_string("note", Some(note))?;
    }

    audit.state = AuditState::Finalized {
        outcome: audit.aggregate_outcome(),
    };
    audit.escalated_at = None;
    audit.escalated_by = None;
    audit.decided_at = Some(now);
    audit.decided_by = Some(actor.id);
    Ok(())
}

/// Routes a pending audit to the physician-auditor.
pub fn escalate(audit: &mut PrescriptionAuditModel, actor: &Actor, now: DateTime<Utc>) -> AuditResult<()> {
    audit.ensure_has_lines()?;
    authorize(actor.role, Command::Escalate, audit.state.status())?;
    audit.state = AuditState::EscalatedToPhysician;
    audit.escalated_at = Some(now);
    audit.escalated_by = Some(actor.id);
    Ok(())
}

/// Privileged recovery from any state.
pub fn revert(audit: &mut PrescriptionAuditModel, actor: &Actor, mode: RevertMode) -> AuditResult<()> {
    audit.ensure_has_lines()?;
    authorize(actor.role, Command::Revert, audit.state.status())?;
    audit.escalated_at = None;
    audit.escalated_by = None;
    match mode {
        RevertMode::ReturnToPending => {
            audit.state = AuditState::Pending;
            audit.decided_at = None;
            audit.decided_by = None;
            for line in audit.lines.iter_mut() {
                line.reopen();
            }
        }
        RevertMode::Withdraw => {
            audit.state = AuditState::Withdrawn;
        }
    }
    Ok(())
}
