use std::error::Error;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use rx_audit_api::{
    Actor, ActorRole, AttemptResult, AuditDetail, AuditError, AuditQueue, AuditResult,
    AuditSummary, BulkSetMonthsRequest, LineKey, MedicationLineView, OpenAuditRequest,
    PrescriptionAuditService, ProcessAuditRequest, RevertRequest, SetCoverageRequest,
    SetMonthApprovalRequest, SetObservationRequest, TrailAction, TrailPage,
};
use rx_audit_db::models::{
    AuditTrailEntryModel, MedicationLineModel, PatientRecordModel, PrescriptionAuditModel,
};
use rx_audit_db::repository::{
    AppendTrail, CommitOutcome, CommitTransition, FindByQueue, LoadBatch, LoadTrail, PageRequest,
};
use sqlx::Database;
use uuid::Uuid;
use validator::Validate;

use crate::config::WorkflowConfig;
use crate::memory::{
    InMemoryAuditRepository, InMemoryPatientRepository, InMemoryRepositories,
    InMemoryTrailRepository,
};
use crate::{transitions, views};

fn db_error(err: Box<dyn Error + Send + Sync>) -> AuditError {
    AuditError::DatabaseError(err.to_string())
}

fn hash_error(err: String) -> AuditError {
    AuditError::InternalError(err)
}

/// Current time at the microsecond precision of the store.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Audit workflow engine over injected repositories.
///
/// Every mutating command loads the aggregate, applies the transition to a
/// copy and commits it with the loaded hash as the expected token. Ledger edits
/// are committed without a trail entry; lifecycle transitions commit their
/// trail entry in the same write.
pub struct AuditWorkflowEngine<DB, A, T, P>
where
    DB: Database,
    A: LoadBatch<DB, PrescriptionAuditModel> + FindByQueue<DB> + CommitTransition<DB>,
    T: AppendTrail<DB> + LoadTrail<DB>,
    P: LoadBatch<DB, PatientRecordModel>,
{
    audits: Arc<A>,
    trail: Arc<T>,
    patients: Arc<P>,
    config: WorkflowConfig,
    _db: PhantomData<fn() -> DB>,
}

/// Engine wired to the in-process store.
pub type InMemoryAuditEngine<DB> =
    AuditWorkflowEngine<DB, InMemoryAuditRepository, InMemoryTrailRepository, InMemoryPatientRepository>;

impl<DB: Database> InMemoryAuditEngine<DB> {
    pub fn in_memory(repositories: &InMemoryRepositories, config: WorkflowConfig) -> Self {
        Self::new(
            Arc::new(repositories.audit_repository()),
            Arc::new(repositories.trail_repository()),
            Arc::new(repositories.patient_repository()),
            config,
        )
    }
}

impl<DB, A, T, P> AuditWorkflowEngine<DB, A, T, P>
where
    DB: Database,
    A: LoadBatch<DB, PrescriptionAuditModel> + FindByQueue<DB> + CommitTransition<DB>,
    T: AppendTrail<DB> + LoadTrail<DB>,
    P: LoadBatch<DB, PatientRecordModel>,
{
    pub fn new(audits: Arc<A>, trail: Arc<T>, patients: Arc<P>, config: WorkflowConfig) -> Self {
        Self {
            audits,
            trail,
            patients,
            config,
            _db: PhantomData,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    async fn load_audit(&self, audit_id: Uuid) -> AuditResult<PrescriptionAuditModel> {
        let mut loaded = LoadBatch::<DB, PrescriptionAuditModel>::load_batch(self.audits.as_ref(), &[audit_id])
            .await
            .map_err(db_error)?;
        loaded
            .pop()
            .flatten()
            .ok_or_else(|| AuditError::NotFound(format!("audit {audit_id}")))
    }

    async fn queue(&self, queue: AuditQueue) -> AuditResult<Vec<AuditSummary>> {
        let audits = self.audits.find_by_queue(queue).await.map_err(db_error)?;
        Ok(audits.iter().map(views::summary).collect())
    }

    /// Seals and commits `audit`; a lost race becomes `ConflictError`.
    async fn commit(
        &self,
        mut audit: PrescriptionAuditModel,
        expected_hash: Option<i64>,
        entry: Option<AuditTrailEntryModel>,
    ) -> AuditResult<PrescriptionAuditModel> {
        if let Some(entry) = &entry {
            audit.last_trail_entry_id = Some(entry.id);
        }
        audit.seal().map_err(hash_error)?;
        let audit_id = audit.id;
        match self
            .audits
            .commit_transition(audit, expected_hash, entry)
            .await
            .map_err(db_error)?
        {
            CommitOutcome::Committed { audit, .. } => Ok(audit),
            CommitOutcome::Conflict if expected_hash.is_none() => {
                Err(AuditError::ConflictError(format!("audit {audit_id} already exists")))
            }
            CommitOutcome::Conflict => {
                tracing::warn!(%audit_id, "audit was changed by another writer");
                Err(AuditError::ConflictError(format!(
                    "audit {audit_id} was changed concurrently; reload and retry"
                )))
            }
        }
    }

    fn entry(
        &self,
        audit: &PrescriptionAuditModel,
        actor: &Actor,
        action: TrailAction,
        result: AttemptResult,
        detail: Option<&str>,
    ) -> AuditTrailEntryModel {
        AuditTrailEntryModel::new(
            audit.id,
            actor.id,
            actor.role,
            action,
            result,
            audit.state,
            now(),
            detail,
        )
    }

    /// Trails a refused lifecycle command and hands the refusal back.
    async fn reject(
        &self,
        audit: &PrescriptionAuditModel,
        actor: &Actor,
        action: TrailAction,
        err: AuditError,
    ) -> AuditError {
        tracing::warn!(audit_id = %audit.id, actor_id = %actor.id, role = %actor.role, %action, "{err}");
        if self.config.record_rejected_attempts {
            let detail = format!("{}: {err}", err.kind());
            let entry = self.entry(audit, actor, action, AttemptResult::Rejected, Some(&detail));
            if let Err(trail_err) = self.trail.append_trail(entry).await {
                tracing::warn!(audit_id = %audit.id, "failed to trail rejected attempt: {trail_err}");
            }
        }
        err
    }

    /// Shared path of the ledger edits: gate, mutate one line, commit untrailed.
    async fn edit_line<F>(
        &self,
        actor: &Actor,
        audit_id: Uuid,
        key: LineKey,
        edit: F,
    ) -> AuditResult<MedicationLineView>
    where
        F: FnOnce(&mut MedicationLineModel) -> AuditResult<()> + Send,
    {
        let mut audit = self.load_audit(audit_id).await?;
        transitions::ensure_ledger_editable(&audit, actor)?;
        let expected = audit.hash;
        edit(audit.line_mut(&key)?)?;
        let audit = self.commit(audit, Some(expected), None).await?;
        tracing::debug!(%audit_id, %key, "ledger updated");
        Ok(views::line(audit.line(&key)?, &audit.state))
    }
}

#[async_trait]
impl<DB, A, T, P> PrescriptionAuditService for AuditWorkflowEngine<DB, A, T, P>
where
    DB: Database,
    A: LoadBatch<DB, PrescriptionAuditModel> + FindByQueue<DB> + CommitTransition<DB>,
    T: AppendTrail<DB> + LoadTrail<DB>,
    P: LoadBatch<DB, PatientRecordModel>,
{
    async fn get_pending(&self, role: ActorRole) -> AuditResult<Vec<AuditSummary>> {
        self.queue(role.queue()).await
    }

    async fn get_escalated(&self) -> AuditResult<Vec<AuditSummary>> {
        self.queue(AuditQueue::Physician).await
    }

    async fn get_historical(&self) -> AuditResult<Vec<AuditSummary>> {
        self.queue(AuditQueue::Historical).await
    }

    async fn load_detail(&self, audit_id: Uuid) -> AuditResult<AuditDetail> {
        let audit = self.load_audit(audit_id).await?;
        let patient = LoadBatch::<DB, PatientRecordModel>::load_batch(self.patients.as_ref(), &[audit.patient_id])
            .await
            .map_err(db_error)?
            .pop()
            .flatten();
        Ok(views::detail(&audit, patient.as_ref(), Utc::now().date_naive()))
    }

    async fn open_audit(&self, actor: Actor, request: OpenAuditRequest) -> AuditResult<AuditSummary> {
        request.validate()?;
        let audit = transitions::open(&request)?;
        let entry = self.entry(&audit, &actor, TrailAction::Open, AttemptResult::Succeeded, None);
        let audit = self.commit(audit, None, Some(entry)).await?;
        tracing::info!(audit_id = %audit.id, lines = audit.line_count(), "audit opened");
        Ok(views::summary(&audit))
    }

    async fn set_month_approval(
        &self,
        actor: Actor,
        request: SetMonthApprovalRequest,
    ) -> AuditResult<MedicationLineView> {
        request.validate()?;
        let SetMonthApprovalRequest {
            audit_id,
            key,
            month,
            approved,
        } = request;
        self.edit_line(&actor, audit_id, key, move |line| line.set_month(month, approved))
            .await
    }

    async fn bulk_set_all_months(
        &self,
        actor: Actor,
        request: BulkSetMonthsRequest,
    ) -> AuditResult<MedicationLineView> {
        let approved = request.approved;
        self.edit_line(&actor, request.audit_id, request.key, move |line| {
            line.set_all_months(approved);
            Ok(())
        })
        .await
    }

    async fn set_coverage(&self, actor: Actor, request: SetCoverageRequest) -> AuditResult<MedicationLineView> {
        let coverage = request.coverage.parse()?;
        self.edit_line(&actor, request.audit_id, request.key, move |line| line.set_coverage(coverage))
            .await
    }

    async fn set_observation(
        &self,
        actor: Actor,
        request: SetObservationRequest,
    ) -> AuditResult<MedicationLineView> {
        request.validate()?;
        let SetObservationRequest {
            audit_id,
            key,
            observation,
        } = request;
        self.edit_line(&actor, audit_id, key, move |line| line.set_observation(&observation))
            .await
    }

    async fn process_audit(&self, actor: Actor, request: ProcessAuditRequest) -> AuditResult<AuditDetail> {
        let loaded = self.load_audit(request.audit_id).await?;
        let mut audit = loaded.clone();
        let applied = request.validate().map_err(AuditError::from).and_then(|_| {
            transitions::finalize(
                &mut audit,
                &actor,
                &request.decisions,
                request.note.as_deref(),
                self.config.default_coverage,
                now(),
            )
        });
        if let Err(err) = applied {
            return Err(self.reject(&loaded, &actor, TrailAction::Finalize, err).await);
        }

        let entry = self.entry(&audit, &actor, TrailAction::Finalize, AttemptResult::Succeeded, None);
        let audit = self.commit(audit, Some(loaded.hash), Some(entry)).await?;
        tracing::info!(
            audit_id = %audit.id,
            actor_id = %actor.id,
            outcome = ?audit.state.outcome(),
            "audit finalized"
        );

        let patient = LoadBatch::<DB, PatientRecordModel>::load_batch(self.patients.as_ref(), &[audit.patient_id])
            .await
            .map_err(db_error)?
            .pop()
            .flatten();
        Ok(views::detail(&audit, patient.as_ref(), Utc::now().date_naive()))
    }

    async fn escalate_to_physician(&self, actor: Actor, audit_id: Uuid) -> AuditResult<AuditSummary> {
        let loaded = self.load_audit(audit_id).await?;
        let mut audit = loaded.clone();
        if let Err(err) = transitions::escalate(&mut audit, &actor, now()) {
            return Err(self.reject(&loaded, &actor, TrailAction::Escalate, err).await);
        }

        let entry = self.entry(&audit, &actor, TrailAction::Escalate, AttemptResult::Succeeded, None);
        let audit = self.commit(audit, Some(loaded.hash), Some(entry)).await?;
        tracing::info!(%audit_id, actor_id = %actor.id, "audit escalated to physician-auditor");
        Ok(views::summary(&audit))
    }

    async fn revert_or_delete(&self, actor: Actor, request: RevertRequest) -> AuditResult<AuditSummary> {
        let action = request.mode.action();
        let loaded = self.load_audit(request.audit_id).await?;
        let mut audit = loaded.clone();
        let applied = request
            .validate()
            .map_err(AuditError::from)
            .and_then(|_| transitions::revert(&mut audit, &actor, request.mode));
        if let Err(err) = applied {
            return Err(self.reject(&loaded, &actor, action, err).await);
        }

        let entry = self.entry(
            &audit,
            &actor,
            action,
            AttemptResult::Succeeded,
            request.reason.as_deref(),
        );
        let audit = self.commit(audit, Some(loaded.hash), Some(entry)).await?;
        tracing::info!(audit_id = %audit.id, actor_id = %actor.id, %action, "audit reverted");
        Ok(views::summary(&audit))
    }

    async fn load_trail(&self, audit_id: Uuid, limit: usize, offset: usize) -> AuditResult<TrailPage> {
        self.load_audit(audit_id).await?;
        let page = self
            .trail
            .load_trail(audit_id, PageRequest::new(limit, offset).clamped())
            .await
            .map_err(db_error)?
            .map(views::trail_entry);
        Ok(TrailPage {
            entries: page.items,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    async fn verify_trail(&self, audit_id: Uuid) -> AuditResult<bool> {
        let audit = self.load_audit(audit_id).await?;
        let entries = self.trail.load_full_trail(audit_id).await.map_err(db_error)?;
        let anchored = match audit.last_trail_entry_id {
            Some(id) => entries.iter().any(|entry| entry.id == id),
            None => true,
        };
        let verified = anchored && AuditTrailEntryModel::verify_chain(&entries);
        if !verified {
            tracing::warn!(%audit_id, "audit trail failed verification");
        }
        Ok(verified)
    }
}
