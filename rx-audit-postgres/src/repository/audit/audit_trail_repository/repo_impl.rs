use std::sync::Arc;

use async_trait::async_trait;
use rx_audit_api::{AuditOutcome, AuditState, AuditStatus};
use rx_audit_db::{
    models::audit::AuditTrailEntryModel,
    repository::{
        append_trail::AppendTrail,
        load_trail::LoadTrail,
        pagination::{Page, PageRequest},
    },
};
use sqlx::{postgres::PgRow, PgConnection, PgPool, Postgres, Row};
use uuid::Uuid;

use crate::utils::{get_optional_heapless_string, TryFromRow};

pub struct AuditTrailRepositoryImpl {
    pub(crate) pool: Arc<PgPool>,
}

impl AuditTrailRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for AuditTrailEntryModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let status: AuditStatus = row.try_get("resulting_status")?;
        let outcome: Option<AuditOutcome> = row.try_get("resulting_outcome")?;

        Ok(AuditTrailEntryModel {
            id: row.try_get("id")?,
            audit_id: row.try_get("audit_id")?,
            sequence: row.try_get("sequence")?,
            actor_id: row.try_get("actor_id")?,
            actor_role: row.try_get("actor_role")?,
            action: row.try_get("action")?,
            result: row.try_get("result")?,
            resulting_state: AuditState::from_parts(status, outcome)?,
            occurred_at: row.try_get("occurred_at")?,
            detail: get_optional_heapless_string(row, "detail")?,
            antecedent_hash: row.try_get("antecedent_hash")?,
            hash: row.try_get("hash")?,
        })
    }
}

pub(crate) const TRAIL_COLUMNS: &str = r#"
    id, audit_id, sequence, actor_id, actor_role, action, result,
    resulting_status, resulting_outcome, occurred_at, detail, antecedent_hash, hash
"#;

/// Latest entry of an audit's trail. Callers hold the audit row lock.
pub(crate) async fn last_entry(
    conn: &mut PgConnection,
    audit_id: Uuid,
) -> Result<Option<AuditTrailEntryModel>, Box<dyn std::error::Error + Send + Sync>> {
    let sql = format!(
        "SELECT {TRAIL_COLUMNS} FROM audit_trail_entry \
         WHERE audit_id = $1 ORDER BY sequence DESC LIMIT 1"
    );
    let row = sqlx::query(&sql).bind(audit_id).fetch_optional(conn).await?;
    row.as_ref().map(AuditTrailEntryModel::try_from_row).transpose()
}

/// Chains `entry` after the current tail and inserts it.
pub(crate) async fn chain_and_insert(
    conn: &mut PgConnection,
    mut entry: AuditTrailEntryModel,
) -> Result<AuditTrailEntryModel, Box<dyn std::error::Error + Send + Sync>> {
    let previous = last_entry(conn, entry.audit_id).await?;
    entry.chain_after(previous.as_ref())?;

    sqlx::query(
        r#"
        INSERT INTO audit_trail_entry (
            id, audit_id, sequence, actor_id, actor_role, action, result,
            resulting_status, resulting_outcome, occurred_at, detail, antecedent_hash, hash
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(entry.id)
    .bind(entry.audit_id)
    .bind(entry.sequence)
    .bind(entry.actor_id)
    .bind(entry.actor_role)
    .bind(entry.action)
    .bind(entry.result)
    .bind(entry.resulting_state.status())
    .bind(entry.resulting_state.outcome())
    .bind(entry.occurred_at)
    .bind(entry.detail.as_ref().map(|detail| detail.as_str()))
    .bind(entry.antecedent_hash)
    .bind(entry.hash)
    .execute(conn)
    .await?;

    Ok(entry)
}

#[async_trait]
impl AppendTrail<Postgres> for AuditTrailRepositoryImpl {
    async fn append_trail(
        &self,
        entry: AuditTrailEntryModel,
    ) -> Result<AuditTrailEntryModel, Box<dyn std::error::Error + Send + Sync>> {
        super::append_trail::append_trail_impl(self, entry).await
    }
}

#[async_trait]
impl LoadTrail<Postgres> for AuditTrailRepositoryImpl {
    async fn load_trail(
        &self,
        audit_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<AuditTrailEntryModel>, Box<dyn std::error::Error + Send + Sync>> {
        super::load_trail::load_trail_impl(self, audit_id, page).await
    }

    async fn load_full_trail(
        &self,
        audit_id: Uuid,
    ) -> Result<Vec<AuditTrailEntryModel>, Box<dyn std::error::Error + Send + Sync>> {
        super::load_trail::load_full_trail_impl(self, audit_id).await
    }
}
