use rx_audit_db::models::patient::PatientRecordModel;

use super::repo_impl::PatientRepositoryImpl;

pub(super) async fn create_batch_impl(
    repo: &PatientRepositoryImpl,
    items: Vec<PatientRecordModel>,
) -> Result<Vec<PatientRecordModel>, Box<dyn std::error::Error + Send + Sync>> {
    if items.is_empty() {
        return Ok(items);
    }

    let mut tx = repo.pool.begin().await?;
    for item in &items {
        sqlx::query(
            r#"
            INSERT INTO patient (id, dni, first_name, last_name, birth_date, phone, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.id)
        .bind(item.dni.as_str())
        .bind(item.first_name.as_str())
        .bind(item.last_name.as_str())
        .bind(item.birth_date)
        .bind(item.phone.as_ref().map(|phone| phone.as_str()))
        .bind(item.email.as_ref().map(|email| email.as_str()))
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(items)
}

#[cfg(test)]
mod tests {
    use rx_audit_db::repository::create_batch::CreateBatch;
    use rx_audit_db::repository::load_batch::LoadBatch;
    use serial_test::serial;

    use super::super::test_utils::new_test_patient;
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_create_batch() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = &ctx.audit_repos().patient_repository;

        let patients = vec![new_test_patient("Ana", "Ruiz")?, new_test_patient("Juan", "Paz")?];
        let created = repo.create_batch(patients.clone()).await?;
        assert_eq!(created.len(), 2);

        let loaded = repo.load_batch(&[patients[0].id, patients[1].id]).await?;
        assert_eq!(loaded[0].as_ref(), Some(&patients[0]));
        assert_eq!(loaded[1].as_ref(), Some(&patients[1]));
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_create_batch_is_all_or_nothing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = &ctx.audit_repos().patient_repository;

        let first = new_test_patient("Ana", "Ruiz")?;
        let mut clash = new_test_patient("Eva", "Gil")?;
        clash.dni = first.dni.clone();

        assert!(repo.create_batch(vec![first.clone(), clash]).await.is_err());
        let loaded = repo.load_batch(&[first.id]).await?;
        assert!(loaded[0].is_none());
        Ok(())
    }
}
