pub mod append_trail;
pub mod commit_transition;
pub mod create_batch;
pub mod find_by_queue;
pub mod load_batch;
pub mod load_trail;
pub mod pagination;

// Re-exports
pub use append_trail::*;
pub use commit_transition::*;
pub use create_batch::*;
pub use find_by_queue::*;
pub use load_batch::*;
pub use load_trail::*;
pub use pagination::*;
