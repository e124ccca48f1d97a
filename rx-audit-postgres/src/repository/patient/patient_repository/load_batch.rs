use std::collections::HashMap;

use rx_audit_db::models::patient::PatientRecordModel;
use uuid::Uuid;

use super::repo_impl::PatientRepositoryImpl;
use crate::utils::TryFromRow;

pub(super) async fn load_batch_impl(
    repo: &PatientRepositoryImpl,
    ids: &[Uuid],
) -> Result<Vec<Option<PatientRecordModel>>, Box<dyn std::error::Error + Send + Sync>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let rows = sqlx::query(
        r#"
        SELECT id, dni, first_name, last_name, birth_date, phone, email
        FROM patient
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(repo.pool.as_ref())
    .await?;

    let mut map: HashMap<Uuid, PatientRecordModel> = HashMap::new();
    for row in rows {
        let patient = PatientRecordModel::try_from_row(&row)?;
        map.insert(patient.id, patient);
    }

    // Return results in the same order as input ids
    Ok(ids.iter().map(|id| map.remove(id)).collect())
}
