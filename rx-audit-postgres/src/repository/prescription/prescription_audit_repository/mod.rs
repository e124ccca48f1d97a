pub mod repo_impl;
pub mod commit_transition;
pub mod find_by_queue;
pub mod load_batch;

#[cfg(test)]
pub mod test_utils;

pub use repo_impl::PrescriptionAuditRepositoryImpl;
