//! Export of yearly summaries.

pub mod csv;
pub mod error;

pub use self::csv::{BALANCE_LABEL, write_yearly_csv};
pub use error::ExportError;
