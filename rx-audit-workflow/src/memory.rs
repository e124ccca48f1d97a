use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use rx_audit_api::AuditQueue;
use rx_audit_db::models::{AuditTrailEntryModel, PatientRecordModel, PrescriptionAuditModel};
use rx_audit_db::repository::{
    AppendTrail, CommitOutcome, CommitTransition, CreateBatch, FindByQueue, LoadBatch, LoadTrail,
    Page, PageRequest,
};
use sqlx::Database;
use uuid::Uuid;

type RepoResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Debug, Default)]
struct MemoryTables {
    audits: HashMap<Uuid, PrescriptionAuditModel>,
    trails: HashMap<Uuid, Vec<AuditTrailEntryModel>>,
    patients: HashMap<Uuid, PatientRecordModel>,
}

impl MemoryTables {
    fn append(&mut self, mut entry: AuditTrailEntryModel) -> RepoResult<AuditTrailEntryModel> {
        let trail = self.trails.entry(entry.audit_id).or_default();
        entry.chain_after(trail.last())?;
        trail.push(entry.clone());
        Ok(entry)
    }

    fn commit(
        &mut self,
        audit: PrescriptionAuditModel,
        expected_hash: Option<i64>,
        entry: Option<AuditTrailEntryModel>,
    ) -> RepoResult<CommitOutcome> {
        let current = self.audits.get(&audit.id).map(|stored| stored.hash);
        match (expected_hash, current) {
            (None, None) => {}
            (Some(expected), Some(stored)) if expected == stored => {}
            _ => return Ok(CommitOutcome::Conflict),
        }
        let entry = entry.map(|entry| self.append(entry)).transpose()?;
        self.audits.insert(audit.id, audit.clone());
        Ok(CommitOutcome::Committed { audit, entry })
    }
}

/// Shared in-process store; the repositories it hands out see the same data.
///
/// Writers take the write lock for the whole compare-and-swap, so commits on
/// one store are serialized the way row locks serialize them in PostgreSQL.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepositories {
    tables: Arc<RwLock<MemoryTables>>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audit_repository(&self) -> InMemoryAuditRepository {
        InMemoryAuditRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn trail_repository(&self) -> InMemoryTrailRepository {
        InMemoryTrailRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn patient_repository(&self) -> InMemoryPatientRepository {
        InMemoryPatientRepository {
            tables: self.tables.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryAuditRepository {
    tables: Arc<RwLock<MemoryTables>>,
}

#[derive(Debug, Clone)]
pub struct InMemoryTrailRepository {
    tables: Arc<RwLock<MemoryTables>>,
}

#[derive(Debug, Clone)]
pub struct InMemoryPatientRepository {
    tables: Arc<RwLock<MemoryTables>>,
}

#[async_trait]
impl<DB: Database> LoadBatch<DB, PrescriptionAuditModel> for InMemoryAuditRepository {
    async fn load_batch(&self, ids: &[Uuid]) -> RepoResult<Vec<Option<PrescriptionAuditModel>>> {
        let tables = self.tables.read();
        Ok(ids.iter().map(|id| tables.audits.get(id).cloned()).collect())
    }
}

#[async_trait]
impl<DB: Database> FindByQueue<DB> for InMemoryAuditRepository {
    async fn find_by_queue(&self, queue: AuditQueue) -> RepoResult<Vec<PrescriptionAuditModel>> {
        let mut found: Vec<PrescriptionAuditModel> = {
            let tables = self.tables.read();
            tables
                .audits
                .values()
                .filter(|audit| audit.in_queue(queue))
                .cloned()
                .collect()
        };
        found.sort_by(|a, b| (a.origin_date, a.id).cmp(&(b.origin_date, b.id)));
        Ok(found)
    }
}

#[async_trait]
impl<DB: Database> CommitTransition<DB> for InMemoryAuditRepository {
    async fn commit_transition(
        &self,
        audit: PrescriptionAuditModel,
        expected_hash: Option<i64>,
        entry: Option<AuditTrailEntryModel>,
    ) -> RepoResult<CommitOutcome> {
        self.tables.write().commit(audit, expected_hash, entry)
    }
}

#[async_trait]
impl<DB: Database> AppendTrail<DB> for InMemoryTrailRepository {
    async fn append_trail(&self, entry: AuditTrailEntryModel) -> RepoResult<AuditTrailEntryModel> {
        self.tables.write().append(entry)
    }
}

#[async_trait]
impl<DB: Database> LoadTrail<DB> for InMemoryTrailRepository {
    async fn load_trail(
        &self,
        audit_id: Uuid,
        page: PageRequest,
    ) -> RepoResult<Page<AuditTrailEntryModel>> {
        let all = self.tables.read().trails.get(&audit_id).cloned().unwrap_or_default();
        Ok(Page::from_full(all, page))
    }

    async fn load_full_trail(&self, audit_id: Uuid) -> RepoResult<Vec<AuditTrailEntryModel>> {
        Ok(self.tables.read().trails.get(&audit_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl<DB: Database> LoadBatch<DB, PatientRecordModel> for InMemoryPatientRepository {
    async fn load_batch(&self, ids: &[Uuid]) -> RepoResult<Vec<Option<PatientRecordModel>>> {
        let tables = self.tables.read();
        Ok(ids.iter().map(|id| tables.patients.get(id).cloned()).collect())
    }
}

#[async_trait]
impl<DB: Database> CreateBatch<DB, PatientRecordModel> for InMemoryPatientRepository {
    async fn create_batch(&self, items: Vec<PatientRecordModel>) -> RepoResult<Vec<PatientRecordModel>> {
        let mut tables = self.tables.write();
        if let Some(duplicate) = items.iter().find(|p| tables.patients.contains_key(&p.id)) {
            return Err(format!("patient {} already exists", duplicate.id).into());
        }
        for patient in &items {
            tables.patients.insert(patient.id, patient.clone());
        }
        Ok(items)
    }
}
