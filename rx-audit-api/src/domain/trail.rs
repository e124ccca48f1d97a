use serde::{Deserialize, Serialize};

/// What a trail entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "trail_action", rename_all = "PascalCase"))]
pub enum TrailAction {
    Open,
    Escalate,
    Finalize,
    Revert,
    Withdraw,
}

impl std::fmt::Display for TrailAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrailAction::Open => write!(f, "Open"),
            TrailAction::Escalate => write!(f, "Escalate"),
            TrailAction::Finalize => write!(f, "Finalize"),
            TrailAction::Revert => write!(f, "Revert"),
            TrailAction::Withdraw => write!(f, "Withdraw"),
        }
    }
}

/// Whether the recorded attempt changed the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "attempt_result", rename_all = "PascalCase"))]
pub enum AttemptResult {
    Succeeded,
    Rejected,
}

/// Administrative recovery applied by `revert_or_delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevertMode {
    /// Clear escalation and decision markers, back to the auditor queue
    ReturnToPending,
    /// Remove the audit from every work queue
    Withdraw,
}

impl RevertMode {
    pub fn action(&self) -> TrailAction {
        match self {
            RevertMode::ReturnToPending => TrailAction::Revert,
            RevertMode::Withdraw => TrailAction::Withdraw,
        }
    }
}
