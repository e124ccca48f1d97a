use chrono::{DateTime, SubsecRound, Utc};
use heapless::String as HeaplessString;
use rx_audit_api::{ActorRole, AttemptResult, AuditState, TrailAction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::identifiable::Identifiable;
use crate::utils::{hash_as_i64, truncated_string};

/// # Documentation
/// One immutable entry of an audit's trail.
/// - Entries of an audit form a hash chain ordered by `sequence`, starting at 1.
/// - `antecedent_hash`: the hash of the previous entry, 0 for the first one.
/// - `hash`: the hash of this entry with the `hash` field set to 0.
/// - Chain fields are assigned by the repository when the entry is appended, so
///   concurrent writers on the same audit are serialized before chaining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrailEntryModel {
    pub id: Uuid,
    pub audit_id: Uuid,
    pub sequence: i64,
    pub actor_id: Uuid,
    pub actor_role: ActorRole,
    pub action: TrailAction,
    pub result: AttemptResult,

    /// State the audit was in after this attempt
    pub resulting_state: AuditState,

    pub occurred_at: DateTime<Utc>,
    pub detail: Option<HeaplessString<250>>,
    pub antecedent_hash: i64,
    pub hash: i64,
}

impl Identifiable for AuditTrailEntryModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl AuditTrailEntryModel {
    /// Unchained entry; `detail` is cut to the column width and `occurred_at` to
    /// the microsecond precision of the store, so reloaded entries hash the same.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        audit_id: Uuid,
        actor_id: Uuid,
        actor_role: ActorRole,
        action: TrailAction,
        result: AttemptResult,
        resulting_state: AuditState,
        occurred_at: DateTime<Utc>,
        detail: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            audit_id,
            sequence: 0,
            actor_id,
            actor_role,
            action,
            result,
            resulting_state,
            occurred_at: occurred_at.trunc_subsecs(6),
            detail: detail.map(truncated_string),
            antecedent_hash: 0,
            hash: 0,
        }
    }

    pub fn compute_hash(&self) -> Result<i64, String> {
        let mut for_hashing = self.clone();
        for_hashing.hash = 0;
        hash_as_i64(&for_hashing)
    }

    /// Links this entry after `previous` (or as the first entry) and seals it.
    pub fn chain_after(&mut self, previous: Option<&AuditTrailEntryModel>) -> Result<(), String> {
        match previous {
            Some(previous) => {
                self.sequence = previous.sequence + 1;
                self.antecedent_hash = previous.hash;
            }
            None => {
                self.sequence = 1;
                self.antecedent_hash = 0;
            }
        }
        self.hash = self.compute_hash()?;
        Ok(())
    }

    /// Checks a full trail, ordered by sequence, for gaps and tampering.
    pub fn verify_chain(entries: &[AuditTrailEntryModel]) -> bool {
        let mut expected_sequence = 1;
        let mut antecedent_hash = 0;
        for entry in entries {
            if entry.sequence != expected_sequence || entry.antecedent_hash != antecedent_hash {
                return false;
            }
            match entry.compute_hash() {
                Ok(hash) if hash == entry.hash => {}
                _ => return false,
            }
            expected_sequence += 1;
            antecedent_hash = entry.hash;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_audit_api::AuditOutcome;

    fn entry(audit_id: Uuid, action: TrailAction) -> AuditTrailEntryModel {
        AuditTrailEntryModel::new(
            audit_id,
            Uuid::new_v4(),
            ActorRole::Auditor,
            action,
            AttemptResult::Succeeded,
            AuditState::Pending,
            Utc::now(),
            None,
        )
    }

    fn chain(audit_id: Uuid) -> Vec<AuditTrailEntryModel> {
        let mut entries: Vec<AuditTrailEntryModel> = Vec::new();
        for action in [TrailAction::Open, TrailAction::Escalate, TrailAction::Finalize] {
            let mut next = entry(audit_id, action);
            next.chain_after(entries.last()).unwrap();
            entries.push(next);
        }
        entries
    }

    #[test]
    fn test_chain_links_sequence_and_hashes() {
        let entries = chain(Uuid::new_v4());
        assert_eq!(entries[0].sequence, 1);
        assert_eq!(entries[0].antecedent_hash, 0);
        assert_eq!(entries[2].sequence, 3);
        assert_eq!(entries[2].antecedent_hash, entries[1].hash);
        assert!(AuditTrailEntryModel::verify_chain(&entries));
    }

    #[test]
    fn test_tampered_entry_breaks_chain() {
        let mut entries = chain(Uuid::new_v4());
        entries[1].resulting_state = AuditState::Finalized {
            outcome: AuditOutcome::Approved,
        };
        assert!(!AuditTrailEntryModel::verify_chain(&entries));
    }

    #[test]
    fn test_missing_entry_breaks_chain() {
        let mut entries = chain(Uuid::new_v4());
        entries.remove(1);
        assert!(!AuditTrailEntryModel::verify_chain(&entries));
    }

    #[test]
    fn test_long_detail_is_truncated() {
        let long = "x".repeat(400);
        let mut entry = entry(Uuid::new_v4(), TrailAction::Revert);
        entry.detail = Some(truncated_string(&long));
        assert_eq!(entry.detail.unwrap().len(), 250);
    }
}
