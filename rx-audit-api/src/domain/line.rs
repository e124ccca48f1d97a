use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one medication line within an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub prescription_id: Uuid,
    pub line_number: u8,
}

impl LineKey {
    pub fn new(prescription_id: Uuid, line_number: u8) -> Self {
        Self {
            prescription_id,
            line_number,
        }
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.prescription_id, self.line_number)
    }
}

/// Decision state of a single medication line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "line_decision", rename_all = "PascalCase"))]
pub enum LineDecision {
    Pending,
    Approved,
    Rejected,
    /// Approved for part of the requested months, with an auditor observation
    Observed,
    PendingPhysician,
}

impl LineDecision {
    /// True for decisions that grant coverage for at least one month.
    pub fn is_approved(&self) -> bool {
        matches!(self, LineDecision::Approved | LineDecision::Observed)
    }
}
