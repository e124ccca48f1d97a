use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Closed set of roles that may act on an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "actor_role", rename_all = "PascalCase"))]
pub enum ActorRole {
    /// General auditor working the pending queue
    Auditor,
    /// Medical auditor receiving escalated audits
    PhysicianAuditor,
    /// Privileged operator allowed to revert or withdraw audits
    Administrator,
}

impl ActorRole {
    pub const ALL: [ActorRole; 3] = [
        ActorRole::Auditor,
        ActorRole::PhysicianAuditor,
        ActorRole::Administrator,
    ];

    /// The single work queue this role sees.
    pub fn queue(&self) -> AuditQueue {
        match self {
            ActorRole::Auditor | ActorRole::Administrator => AuditQueue::Auditor,
            ActorRole::PhysicianAuditor => AuditQueue::Physician,
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorRole::Auditor => write!(f, "Auditor"),
            ActorRole::PhysicianAuditor => write!(f, "PhysicianAuditor"),
            ActorRole::Administrator => write!(f, "Administrator"),
        }
    }
}

impl FromStr for ActorRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Auditor" => Ok(ActorRole::Auditor),
            "PhysicianAuditor" => Ok(ActorRole::PhysicianAuditor),
            "Administrator" => Ok(ActorRole::Administrator),
            _ => Err(()),
        }
    }
}

/// Authenticated identity supplied by the caller on every mutating command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: Uuid, role: ActorRole) -> Self {
        Self { id, role }
    }
}

/// Read-time views over the audit collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditQueue {
    /// Pending, not escalated, with at least one medication line
    Auditor,
    /// Escalated to a physician-auditor and not yet finalized
    Physician,
    /// Finalized audits
    Historical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_role_sees_one_queue() {
        assert_eq!(ActorRole::Auditor.queue(), AuditQueue::Auditor);
        assert_eq!(ActorRole::Administrator.queue(), AuditQueue::Auditor);
        assert_eq!(ActorRole::PhysicianAuditor.queue(), AuditQueue::Physician);
    }

    #[test]
    fn test_role_display_parses_back() {
        for role in ActorRole::ALL {
            assert_eq!(role.to_string().parse::<ActorRole>(), Ok(role));
        }
        assert!("rol9".parse::<ActorRole>().is_err());
    }
}
