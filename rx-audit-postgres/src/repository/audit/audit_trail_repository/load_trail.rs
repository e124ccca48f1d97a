use rx_audit_db::{
    models::audit::AuditTrailEntryModel,
    repository::pagination::{Page, PageRequest},
};
use uuid::Uuid;

use super::repo_impl::{AuditTrailRepositoryImpl, TRAIL_COLUMNS};
use crate::utils::TryFromRow;

pub(super) async fn load_trail_impl(
    repo: &AuditTrailRepositoryImpl,
    audit_id: Uuid,
    page: PageRequest,
) -> Result<Page<AuditTrailEntryModel>, Box<dyn std::error::Error + Send + Sync>> {
    let page = page.clamped();
    let mut conn = repo.pool.acquire().await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_trail_entry WHERE audit_id = $1")
        .bind(audit_id)
        .fetch_one(&mut *conn)
        .await?;

    let sql = format!(
        "SELECT {TRAIL_COLUMNS} FROM audit_trail_entry \
         WHERE audit_id = $1 ORDER BY sequence ASC LIMIT $2 OFFSET $3"
    );
    let rows = sqlx::query(&sql)
        .bind(audit_id)
        .bind(i64::try_from(page.limit)?)
        .bind(i64::try_from(page.offset)?)
        .fetch_all(&mut *conn)
        .await?;

    let items = rows
        .iter()
        .map(AuditTrailEntryModel::try_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page::new(items, usize::try_from(total)?, page.limit, page.offset))
}

pub(super) async fn load_full_trail_impl(
    repo: &AuditTrailRepositoryImpl,
    audit_id: Uuid,
) -> Result<Vec<AuditTrailEntryModel>, Box<dyn std::error::Error + Send + Sync>> {
    let sql = format!(
        "SELECT {TRAIL_COLUMNS} FROM audit_trail_entry \
         WHERE audit_id = $1 ORDER BY sequence ASC"
    );
    let rows = sqlx::query(&sql)
        .bind(audit_id)
        .fetch_all(repo.pool.as_ref())
        .await?;

    rows.iter().map(AuditTrailEntryModel::try_from_row).collect()
}

#[cfg(test)]
mod tests {
    use rx_audit_api::TrailAction;
    use rx_audit_db::repository::append_trail::AppendTrail;
    use rx_audit_db::repository::commit_transition::CommitTransition;
    use rx_audit_db::repository::load_trail::LoadTrail;
    use rx_audit_db::repository::pagination::PageRequest;
    use serial_test::serial;

    use crate::repository::prescription::prescription_audit_repository::test_utils::{
        new_test_audit, new_test_entry,
    };
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_load_trail_pages_in_sequence_order() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let audits = &ctx.audit_repos().prescription_audit_repository;
        let trail = &ctx.audit_repos().audit_trail_repository;

        let audit = new_test_audit(1, 1)?;
        audits
            .commit_transition(audit.clone(), None, Some(new_test_entry(&audit, TrailAction::Open)))
            .await?;
        for _ in 0..4 {
            trail.append_trail(new_test_entry(&audit, TrailAction::Escalate)).await?;
        }

        let page = trail.load_trail(audit.id, PageRequest::new(2, 2)).await?;
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].sequence, 3);
        assert_eq!(page.items[1].sequence, 4);
        assert!(page.has_more());

        let tail = trail.load_trail(audit.id, PageRequest::new(2, 4)).await?;
        assert_eq!(tail.items.len(), 1);
        assert!(!tail.has_more());
        Ok(())
    }
}
