use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Coverage, LineKey, RevertMode};
use crate::error::AuditResult;

/// Audit record set handed over by the coverage system.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OpenAuditRequest {
    pub audit_id: Uuid,
    pub patient_id: Uuid,
    pub prescriber_id: Uuid,
    #[validate(length(min = 1, max = 3, message = "an audit bundles one to three prescriptions"))]
    pub prescription_ids: Vec<Uuid>,
    pub origin_date: NaiveDate,
    #[validate(range(min = 1, max = 6, message = "requested months must be between 1 and 6"))]
    pub requested_months: u8,
    pub coverage_group_id: i32,
    #[validate(length(max = 500))]
    pub note: Option<String>,
    #[validate(nested)]
    pub lines: Vec<OpenMedicationLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OpenMedicationLine {
    pub key: LineKey,
    pub medication_id: Uuid,
    #[validate(range(min = 1, message = "prescribed quantity must be positive"))]
    pub prescribed_quantity: u16,
    #[validate(length(max = 250))]
    pub dosage_instructions: Option<String>,
    #[validate(length(max = 250))]
    pub observation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetMonthApprovalRequest {
    pub audit_id: Uuid,
    pub key: LineKey,
    #[validate(range(min = 1, max = 6, message = "month index must be between 1 and 6"))]
    pub month: u8,
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSetMonthsRequest {
    pub audit_id: Uuid,
    pub key: LineKey,
    pub approved: bool,
}

/// Coverage as entered by the caller, before enumeration checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageInput {
    pub percentage: u8,
    pub coverage_type: String,
}

impl CoverageInput {
    pub fn parse(&self) -> AuditResult<Coverage> {
        Coverage::parse(self.percentage, &self.coverage_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCoverageRequest {
    pub audit_id: Uuid,
    pub key: LineKey,
    pub coverage: CoverageInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetObservationRequest {
    pub audit_id: Uuid,
    pub key: LineKey,
    #[validate(length(max = 250))]
    pub observation: String,
}

/// Final decision for one medication line.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineDecisionInput {
    pub key: LineKey,
    /// Months (1-based) approved for this line; all others are rejected
    #[validate(length(max = 6))]
    pub approved_months: Vec<u8>,
    pub coverage: Option<CoverageInput>,
    #[validate(length(max = 250))]
    pub observation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessAuditRequest {
    pub audit_id: Uuid,
    #[validate(length(min = 1, message = "decision set must not be empty"), nested)]
    pub decisions: Vec<LineDecisionInput>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RevertRequest {
    pub audit_id: Uuid,
    pub mode: RevertMode,
    #[validate(length(max = 250))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_decision_set_fails_validation() {
        let request = ProcessAuditRequest {
            audit_id: Uuid::new_v4(),
            decisions: vec![],
            note: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("decisions"));
    }

    #[test]
    fn test_month_index_bounds() {
        let mut request = SetMonthApprovalRequest {
            audit_id: Uuid::new_v4(),
            key: LineKey::new(Uuid::new_v4(), 1),
            month: 0,
            approved: true,
        };
        assert!(request.validate().is_err());
        request.month = 6;
        assert!(request.validate().is_ok());
        request.month = 7;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_open_request_limits_prescriptions() {
        let request = OpenAuditRequest {
            audit_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            prescriber_id: Uuid::new_v4(),
            prescription_ids: (0..4).map(|_| Uuid::new_v4()).collect(),
            origin_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            requested_months: 3,
            coverage_group_id: 12,
            note: None,
            lines: vec![],
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("prescription_ids"));
    }
}
