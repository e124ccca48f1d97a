use chrono::{NaiveDate, Utc};
use heapless::Vec as HeaplessVec;
use rx_audit_api::{ActorRole, AttemptResult, AuditState, LineDecision, TrailAction};
use rx_audit_db::models::audit::AuditTrailEntryModel;
use rx_audit_db::models::prescription::{
    MedicationLineModel, MonthApprovalMatrix, PrescriptionAuditModel,
};
use uuid::Uuid;

/// Sealed pending audit over one prescription with `line_count` lines.
pub fn new_test_audit(
    line_count: u8,
    requested_months: u8,
) -> Result<PrescriptionAuditModel, Box<dyn std::error::Error + Send + Sync>> {
    let prescription_id = Uuid::new_v4();
    let mut prescription_ids = HeaplessVec::new();
    prescription_ids
        .push(prescription_id)
        .map_err(|_| "prescription list full")?;

    let mut lines = Vec::new();
    for line_number in 1..=line_count {
        lines.push(MedicationLineModel {
            prescription_id,
            line_number,
            medication_id: Uuid::new_v4(),
            prescribed_quantity: 30,
            dosage_instructions: None,
            observation: None,
            months: MonthApprovalMatrix::new(requested_months)?,
            coverage: None,
            decision: LineDecision::Pending,
        });
    }

    let mut audit = PrescriptionAuditModel {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        prescriber_id: Uuid::new_v4(),
        prescription_ids,
        origin_date: NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("invalid date")?,
        requested_months,
        coverage_group_id: 7,
        note: None,
        state: AuditState::Pending,
        escalated_at: None,
        escalated_by: None,
        decided_at: None,
        decided_by: None,
        lines,
        hash: 0,
        last_trail_entry_id: None,
    };
    audit.seal()?;
    Ok(audit)
}

pub fn new_test_entry(audit: &PrescriptionAuditModel, action: TrailAction) -> AuditTrailEntryModel {
    AuditTrailEntryModel::new(
        audit.id,
        Uuid::new_v4(),
        ActorRole::Auditor,
        action,
        AttemptResult::Succeeded,
        audit.state,
        Utc::now(),
        None,
    )
}
