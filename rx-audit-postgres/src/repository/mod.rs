pub mod audit;
pub mod db_init;
pub mod patient;
pub mod prescription;
