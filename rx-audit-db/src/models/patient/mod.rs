pub mod patient_record;

pub use patient_record::*;
