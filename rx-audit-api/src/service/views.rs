use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    ActorRole, AttemptResult, AuditState, Coverage, LineDecision, LineKey, TrailAction,
};

/// Queue row for an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub audit_id: Uuid,
    pub patient_id: Uuid,
    pub prescriber_id: Uuid,
    pub origin_date: NaiveDate,
    pub line_count: usize,
    pub requested_months: u8,
    pub coverage_group_id: i32,
    pub state: AuditState,
    pub escalated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationLineView {
    pub key: LineKey,
    pub medication_id: Uuid,
    pub prescribed_quantity: u16,
    pub dosage_instructions: Option<String>,
    pub observation: Option<String>,
    /// 1-based months currently approved
    pub approved_months: Vec<u8>,
    pub coverage: Option<Coverage>,
    pub coverage_rate: Option<Decimal>,
    /// Frozen decision once finalized, derived from the matrix otherwise
    pub decision: LineDecision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientView {
    pub patient_id: Uuid,
    pub dni: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub age: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDetail {
    pub summary: AuditSummary,
    pub prescription_ids: Vec<Uuid>,
    pub note: Option<String>,
    pub escalated_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<Uuid>,
    pub lines: Vec<MedicationLineView>,
    /// Absent when the coverage system has no record for the patient
    pub patient: Option<PatientView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailEntryView {
    pub entry_id: Uuid,
    pub sequence: i64,
    pub actor_id: Uuid,
    pub actor_role: ActorRole,
    pub action: TrailAction,
    pub result: AttemptResult,
    pub resulting_state: AuditState,
    pub occurred_at: DateTime<Utc>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailPage {
    pub entries: Vec<TrailEntryView>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}
