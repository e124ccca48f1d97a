use std::str::FromStr;

use chrono::NaiveDate;
use heapless::String as HeaplessString;
use rx_audit_db::models::patient::PatientRecordModel;
use uuid::Uuid;

pub fn new_test_patient(
    first_name: &str,
    last_name: &str,
) -> Result<PatientRecordModel, Box<dyn std::error::Error + Send + Sync>> {
    // Unique per call so repeated runs do not trip the dni constraint
    let dni = Uuid::new_v4().simple().to_string()[..12].to_string();
    Ok(PatientRecordModel {
        id: Uuid::new_v4(),
        dni: HeaplessString::from_str(&dni).map_err(|_| "dni too long")?,
        first_name: HeaplessString::from_str(first_name).map_err(|_| "first name too long")?,
        last_name: HeaplessString::from_str(last_name).map_err(|_| "last name too long")?,
        birth_date: NaiveDate::from_ymd_opt(1961, 7, 14),
        phone: None,
        email: Some(HeaplessString::from_str("patient@example.org").map_err(|_| "email too long")?),
    })
}
