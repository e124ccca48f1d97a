pub mod config;
pub mod engine;
pub mod memory;
pub mod transitions;
pub mod views;

pub use config::WorkflowConfig;
pub use engine::{AuditWorkflowEngine, InMemoryAuditEngine};
pub use memory::InMemoryRepositories;
