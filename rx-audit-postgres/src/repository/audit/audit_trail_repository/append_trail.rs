use rx_audit_db::models::audit::AuditTrailEntryModel;

use super::repo_impl::{chain_and_insert, AuditTrailRepositoryImpl};

pub(super) async fn append_trail_impl(
    repo: &AuditTrailRepositoryImpl,
    entry: AuditTrailEntryModel,
) -> Result<AuditTrailEntryModel, Box<dyn std::error::Error + Send + Sync>> {
    let mut tx = repo.pool.begin().await?;

    // The audit row lock serializes appends with commits on the same audit
    let locked = sqlx::query("SELECT id FROM prescription_audit WHERE id = $1 FOR UPDATE")
        .bind(entry.audit_id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        tx.rollback().await?;
        return Err(format!("Audit {} not found", entry.audit_id).into());
    }

    let stored = chain_and_insert(&mut *tx, entry).await?;
    tx.commit().await?;
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use rx_audit_api::{AttemptResult, TrailAction};
    use rx_audit_db::models::audit::AuditTrailEntryModel;
    use rx_audit_db::repository::append_trail::AppendTrail;
    use rx_audit_db::repository::commit_transition::CommitTransition;
    use rx_audit_db::repository::load_trail::LoadTrail;
    use serial_test::serial;

    use crate::repository::prescription::prescription_audit_repository::test_utils::{
        new_test_audit, new_test_entry,
    };
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_append_chains_after_commit_entry() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let audits = &ctx.audit_repos().prescription_audit_repository;
        let trail = &ctx.audit_repos().audit_trail_repository;

        let audit = new_test_audit(1, 2)?;
        let opened = new_test_entry(&audit, TrailAction::Open);
        audits.commit_transition(audit.clone(), None, Some(opened)).await?;

        let mut rejected = new_test_entry(&audit, TrailAction::Finalize);
        rejected.result = AttemptResult::Rejected;
        let stored = trail.append_trail(rejected).await?;
        assert_eq!(stored.sequence, 2);

        let full = trail.load_full_trail(audit.id).await?;
        assert_eq!(full.len(), 2);
        assert_eq!(full[1].antecedent_hash, full[0].hash);
        assert!(AuditTrailEntryModel::verify_chain(&full));
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_append_to_unknown_audit_fails() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let trail = &ctx.audit_repos().audit_trail_repository;

        let audit = new_test_audit(1, 1)?;
        let result = trail.append_trail(new_test_entry(&audit, TrailAction::Escalate)).await;
        assert!(result.is_err());
        Ok(())
    }
}
