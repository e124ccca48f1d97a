use std::sync::Arc;

use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::repository::audit::AuditTrailRepositoryImpl;
use crate::repository::patient::PatientRepositoryImpl;
use crate::repository::prescription::PrescriptionAuditRepositoryImpl;

/// Owns the connection pool shared by every repository.
///
/// Each repository call acquires its own connection; operations that must be
/// atomic open their own transaction.
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = config.connect().await?;
        tracing::info!(
            max_connections = config.max_connections(),
            "Connected to the prescription audit database"
        );
        Ok(Self::new(Arc::new(pool)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn create_audit_repositories(&self) -> AuditRepositories {
        AuditRepositories {
            prescription_audit_repository: Arc::new(PrescriptionAuditRepositoryImpl::new(
                self.pool.clone(),
            )),
            audit_trail_repository: Arc::new(AuditTrailRepositoryImpl::new(self.pool.clone())),
            patient_repository: Arc::new(PatientRepositoryImpl::new(self.pool.clone())),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Container for the repositories backing the audit workflow
pub struct AuditRepositories {
    pub prescription_audit_repository: Arc<PrescriptionAuditRepositoryImpl>,
    pub audit_trail_repository: Arc<AuditTrailRepositoryImpl>,
    pub patient_repository: Arc<PatientRepositoryImpl>,
}
