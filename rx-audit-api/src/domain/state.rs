use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};

/// Lifecycle discriminant, as persisted in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "audit_status", rename_all = "PascalCase"))]
pub enum AuditStatus {
    Pending,
    EscalatedToPhysician,
    Finalized,
    Withdrawn,
}

impl AuditStatus {
    pub const ALL: [AuditStatus; 4] = [
        AuditStatus::Pending,
        AuditStatus::EscalatedToPhysician,
        AuditStatus::Finalized,
        AuditStatus::Withdrawn,
    ];
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Pending => write!(f, "Pending"),
            AuditStatus::EscalatedToPhysician => write!(f, "EscalatedToPhysician"),
            AuditStatus::Finalized => write!(f, "Finalized"),
            AuditStatus::Withdrawn => write!(f, "Withdrawn"),
        }
    }
}

/// Aggregate result of a finalized audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "audit_outcome", rename_all = "PascalCase"))]
pub enum AuditOutcome {
    Approved,
    Rejected,
    Observed,
}

/// Explicit lifecycle state of a prescription audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum AuditState {
    Pending,
    EscalatedToPhysician,
    Finalized { outcome: AuditOutcome },
    Withdrawn,
}

impl AuditState {
    pub fn status(&self) -> AuditStatus {
        match self {
            AuditState::Pending => AuditStatus::Pending,
            AuditState::EscalatedToPhysician => AuditStatus::EscalatedToPhysician,
            AuditState::Finalized { .. } => AuditStatus::Finalized,
            AuditState::Withdrawn => AuditStatus::Withdrawn,
        }
    }

    pub fn outcome(&self) -> Option<AuditOutcome> {
        match self {
            AuditState::Finalized { outcome } => Some(*outcome),
            _ => None,
        }
    }

    /// Rebuilds the tagged state from its persisted columns.
    pub fn from_parts(status: AuditStatus, outcome: Option<AuditOutcome>) -> AuditResult<Self> {
        match (status, outcome) {
            (AuditStatus::Pending, None) => Ok(AuditState::Pending),
            (AuditStatus::EscalatedToPhysician, None) => Ok(AuditState::EscalatedToPhysician),
            (AuditStatus::Finalized, Some(outcome)) => Ok(AuditState::Finalized { outcome }),
            (AuditStatus::Withdrawn, None) => Ok(AuditState::Withdrawn),
            (status, outcome) => Err(AuditError::InternalError(format!(
                "inconsistent stored state: status {status} with outcome {outcome:?}"
            ))),
        }
    }

    /// Whether month approvals and coverage may still change.
    pub fn is_open(&self) -> bool {
        matches!(self, AuditState::Pending | AuditState::EscalatedToPhysician)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_round_trips_every_state() {
        let states = [
            AuditState::Pending,
            AuditState::EscalatedToPhysician,
            AuditState::Finalized { outcome: AuditOutcome::Observed },
            AuditState::Withdrawn,
        ];
        for state in states {
            assert_eq!(AuditState::from_parts(state.status(), state.outcome()), Ok(state));
        }
    }

    #[test]
    fn test_from_parts_rejects_finalized_without_outcome() {
        let result = AuditState::from_parts(AuditStatus::Finalized, None);
        assert!(matches!(result, Err(AuditError::InternalError(_))));

        let result = AuditState::from_parts(AuditStatus::Pending, Some(AuditOutcome::Approved));
        assert!(matches!(result, Err(AuditError::InternalError(_))));
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let json = serde_json::to_value(AuditState::Finalized { outcome: AuditOutcome::Rejected }).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "Finalized", "outcome": "Rejected" }));
    }
}
