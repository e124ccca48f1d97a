use chrono::{Datelike, NaiveDate};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// Database model for a patient, owned by the coverage system.
///
/// The audit core reads these records and never changes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecordModel {
    pub id: Uuid,
    /// National identity document number
    pub dni: HeaplessString<16>,
    pub first_name: HeaplessString<100>,
    pub last_name: HeaplessString<100>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<HeaplessString<32>>,
    pub email: Option<HeaplessString<100>>,
}

impl Identifiable for PatientRecordModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl PatientRecordModel {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.as_str(), self.last_name.as_str())
            .trim()
            .to_string()
    }

    /// Full years elapsed between the birth date and `on`.
    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        if on < birth {
            return None;
        }
        let mut years = on.year() - birth.year();
        if (on.month(), on.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}
