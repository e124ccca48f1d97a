pub mod trail_entry;

pub use trail_entry::*;
