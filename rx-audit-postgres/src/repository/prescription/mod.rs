pub mod prescription_audit_repository;

pub use prescription_audit_repository::PrescriptionAuditRepositoryImpl;
