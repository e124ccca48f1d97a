use chrono::NaiveDate;
use rx_audit_api::{AuditDetail, AuditState, AuditSummary, MedicationLineView, PatientView, TrailEntryView};
use rx_audit_db::models::{
    AuditTrailEntryModel, MedicationLineModel, PatientRecordModel, PrescriptionAuditModel,
};

pub fn summary(audit: &PrescriptionAuditModel) -> AuditSummary {
    AuditSummary {
        audit_id: audit.id,
        patient_id: audit.patient_id,
        prescriber_id: audit.prescriber_id,
        origin_date: audit.origin_date,
        line_count: audit.line_count(),
        requested_months: audit.requested_months,
        coverage_group_id: audit.coverage_group_id,
        state: audit.state,
        escalated_at: audit.escalated_at,
    }
}

/// Line as read under the audit's current state; decisions are live until frozen.
pub fn line(line: &MedicationLineModel, state: &AuditState) -> MedicationLineView {
    MedicationLineView {
        key: line.key(),
        medication_id: line.medication_id,
        prescribed_quantity: line.prescribed_quantity,
        dosage_instructions: line.dosage_instructions.as_ref().map(|s| s.to_string()),
        observation: line.observation.as_ref().map(|s| s.to_string()),
        approved_months: line.months.approved_months(),
        coverage: line.coverage,
        coverage_rate: line.coverage.map(|c| c.percentage.as_rate()),
        decision: line.current_decision(state),
    }
}

pub fn patient(record: &PatientRecordModel, today: NaiveDate) -> PatientView {
    PatientView {
        patient_id: record.id,
        dni: record.dni.to_string(),
        full_name: record.full_name(),
        birth_date: record.birth_date,
        age: record.age_on(today),
    }
}

pub fn detail(
    audit: &PrescriptionAuditModel,
    patient_record: Option<&PatientRecordModel>,
    today: NaiveDate,
) -> AuditDetail {
    AuditDetail {
        summary: summary(audit),
        prescription_ids: audit.prescription_ids.iter().copied().collect(),
        note: audit.note.as_ref().map(|s| s.to_string()),
        escalated_by: audit.escalated_by,
        decided_at: audit.decided_at,
        decided_by: audit.decided_by,
        lines: audit.lines.iter().map(|l| line(l, &audit.state)).collect(),
        patient: patient_record.map(|p| patient(p, today)),
    }
}

pub fn trail_entry(entry: AuditTrailEntryModel) -> TrailEntryView {
    TrailEntryView {
        entry_id: entry.id,
        sequence: entry.sequence,
        actor_id: entry.actor_id,
        actor_role: entry.actor_role,
        action: entry.action,
        result: entry.result,
        resulting_state: entry.resulting_state,
        occurred_at: entry.occurred_at,
        detail: entry.detail.map(|s| s.to_string()),
    }
}
