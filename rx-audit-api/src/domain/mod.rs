pub mod coverage;
pub mod gating;
pub mod line;
pub mod role;
pub mod state;
pub mod trail;

pub use coverage::*;
pub use gating::*;
pub use line::*;
pub use role::*;
pub use state::*;
pub use trail::*;

/// Upper bound for `requested_months` on an audit.
///
/// The request validators carry the same literal bound.
pub const MAX_REQUESTED_MONTHS: u8 = 6;

/// Maximum number of prescriptions bundled in one audit.
pub const MAX_PRESCRIPTIONS_PER_AUDIT: usize = 3;
