pub mod config;
pub mod postgres_repositories;
pub mod repository;
pub mod utils;

pub use config::{ConfigError, DatabaseConfig};
pub use postgres_repositories::{AuditRepositories, PostgresRepositories};
pub use repository::audit::AuditTrailRepositoryImpl;
pub use repository::patient::PatientRepositoryImpl;
pub use repository::prescription::PrescriptionAuditRepositoryImpl;

#[cfg(test)]
pub mod test_helper;
