pub mod repo_impl;
pub mod create_batch;
pub mod load_batch;

#[cfg(test)]
pub mod test_utils;

pub use repo_impl::PatientRepositoryImpl;
