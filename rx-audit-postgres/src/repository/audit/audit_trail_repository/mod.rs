pub mod repo_impl;
pub mod append_trail;
pub mod load_trail;

pub use repo_impl::AuditTrailRepositoryImpl;
