pub mod identifiable;
pub mod audit;
pub mod patient;
pub mod prescription;

// Re-exports
pub use identifiable::*;
pub use audit::*;
pub use patient::*;
pub use prescription::*;
