use rx_audit_api::Coverage;
use serde::{Deserialize, Serialize};

/// Engine settings, resolved once at startup and passed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Trail rejected finalize, escalate and revert attempts on existing audits
    pub record_rejected_attempts: bool,

    /// Coverage given to approved lines finalized without one
    pub default_coverage: Coverage,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            record_rejected_attempts: true,
            default_coverage: Coverage::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn with_record_rejected_attempts(mut self, record: bool) -> Self {
        self.record_rejected_attempts = record;
        self
    }

    pub fn with_default_coverage(mut self, coverage: Coverage) -> Self {
        self.default_coverage = coverage;
        self
    }
}
