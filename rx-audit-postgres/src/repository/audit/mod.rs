pub mod audit_trail_repository;

pub use audit_trail_repository::AuditTrailRepositoryImpl;
