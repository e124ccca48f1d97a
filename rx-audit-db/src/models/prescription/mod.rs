pub mod medication_line;
pub mod month_approval;
pub mod prescription_audit;

pub use medication_line::*;
pub use month_approval::*;
pub use prescription_audit::*;
