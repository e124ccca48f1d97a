use std::sync::Arc;

use async_trait::async_trait;
use rx_audit_db::{
    models::patient::PatientRecordModel,
    repository::{create_batch::CreateBatch, load_batch::LoadBatch},
};
use sqlx::{postgres::PgRow, PgPool, Postgres, Row};
use uuid::Uuid;

use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};

pub struct PatientRepositoryImpl {
    pub(crate) pool: Arc<PgPool>,
}

impl PatientRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for PatientRecordModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(PatientRecordModel {
            id: row.try_get("id")?,
            dni: get_heapless_string(row, "dni")?,
            first_name: get_heapless_string(row, "first_name")?,
            last_name: get_heapless_string(row, "last_name")?,
            birth_date: row.try_get("birth_date")?,
            phone: get_optional_heapless_string(row, "phone")?,
            email: get_optional_heapless_string(row, "email")?,
        })
    }
}

#[async_trait]
impl CreateBatch<Postgres, PatientRecordModel> for PatientRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<PatientRecordModel>,
    ) -> Result<Vec<PatientRecordModel>, Box<dyn std::error::Error + Send + Sync>> {
        super::create_batch::create_batch_impl(self, items).await
    }
}

#[async_trait]
impl LoadBatch<Postgres, PatientRecordModel> for PatientRepositoryImpl {
    async fn load_batch(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<PatientRecordModel>>, Box<dyn std::error::Error + Send + Sync>> {
        super::load_batch::load_batch_impl(self, ids).await
    }
}
