//! Role gating for workflow commands.
//!
//! Every mutating command is checked against a single total function of
//! `(role, command, status)`. The match below is the table; adding a role,
//! command or status without extending it fails to compile.

use crate::domain::role::ActorRole;
use crate::domain::state::AuditStatus;
use crate::error::{AuditError, AuditResult};

/// Commands subject to role gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Month approval, coverage and observation edits
    EditLedger,
    Finalize,
    Escalate,
    Revert,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::EditLedger,
        Command::Finalize,
        Command::Escalate,
        Command::Revert,
    ];
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::EditLedger => write!(f, "EditLedger"),
            Command::Finalize => write!(f, "Finalize"),
            Command::Escalate => write!(f, "Escalate"),
            Command::Revert => write!(f, "Revert"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allow,
    Deny,
    Conflict,
}

pub fn gate(role: ActorRole, command: Command, status: AuditStatus) -> Gate {
    use ActorRole::{Administrator, Auditor, PhysicianAuditor};
    use AuditStatus::{EscalatedToPhysician, Finalized, Pending, Withdrawn};

    match (command, status, role) {
        (Command::Revert, _, Administrator) => Gate::Allow,
        (Command::Revert, _, Auditor | PhysicianAuditor) => Gate::Deny,

        (Command::EditLedger | Command::Finalize, Pending, _) => Gate::Allow,
        (Command::EditLedger | Command::Finalize, EscalatedToPhysician, PhysicianAuditor) => Gate::Allow,
        (Command::EditLedger | Command::Finalize, EscalatedToPhysician, Auditor | Administrator) => Gate::Deny,
        (Command::EditLedger | Command::Finalize, Finalized | Withdrawn, _) => Gate::Deny,

        (Command::Escalate, Pending, Auditor | Administrator) => Gate::Allow,
        (Command::Escalate, Pending, PhysicianAuditor) => Gate::Deny,
        (Command::Escalate, EscalatedToPhysician, _) => Gate::Conflict,
        (Command::Escalate, Finalized | Withdrawn, _) => Gate::Deny,
    }
}

/// Evaluates the gate and turns a refusal into the matching error kind.
pub fn authorize(role: ActorRole, command: Command, status: AuditStatus) -> AuditResult<()> {
    match gate(role, command, status) {
        Gate::Allow => Ok(()),
        Gate::Deny => Err(AuditError::InvalidTransition(format!(
            "{role} may not {command} an audit in state {status}"
        ))),
        Gate::Conflict => Err(AuditError::ConflictError(format!(
            "{command} is already in effect for an audit in state {status}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_is_total_and_revert_is_admin_only() {
        for role in ActorRole::ALL {
            for status in AuditStatus::ALL {
                for command in Command::ALL {
                    let result = gate(role, command, status);
                    if command == Command::Revert {
                        assert_eq!(result == Gate::Allow, role == ActorRole::Administrator);
                    }
                }
            }
        }
    }

    #[test]
    fn test_closed_audits_refuse_ledger_work() {
        for role in ActorRole::ALL {
            for status in [AuditStatus::Finalized, AuditStatus::Withdrawn] {
                assert_eq!(gate(role, Command::EditLedger, status), Gate::Deny);
                assert_eq!(gate(role, Command::Finalize, status), Gate::Deny);
                assert_eq!(gate(role, Command::Escalate, status), Gate::Deny);
            }
        }
    }

    #[test]
    fn test_escalated_audits_belong_to_physician() {
        let status = AuditStatus::EscalatedToPhysician;
        assert_eq!(gate(ActorRole::PhysicianAuditor, Command::Finalize, status), Gate::Allow);
        assert_eq!(gate(ActorRole::Auditor, Command::Finalize, status), Gate::Deny);
        assert_eq!(gate(ActorRole::Administrator, Command::EditLedger, status), Gate::Deny);
    }

    #[test]
    fn test_physician_cannot_escalate() {
        assert_eq!(
            gate(ActorRole::PhysicianAuditor, Command::Escalate, AuditStatus::Pending),
            Gate::Deny
        );
        assert_eq!(gate(ActorRole::Auditor, Command::Escalate, AuditStatus::Pending), Gate::Allow);
    }

    #[test]
    fn test_authorize_maps_gate_to_error_kind() {
        let denied = authorize(ActorRole::Auditor, Command::Finalize, AuditStatus::EscalatedToPhysician);
        assert!(matches!(denied, Err(AuditError::InvalidTransition(_))));

        let conflict = authorize(ActorRole::Auditor, Command::Escalate, AuditStatus::EscalatedToPhysician);
        assert!(matches!(conflict, Err(AuditError::ConflictError(_))));

        assert!(authorize(ActorRole::Auditor, Command::EditLedger, AuditStatus::Pending).is_ok());
    }
}
