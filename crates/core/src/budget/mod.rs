//! Budget records, validation, entry status and templates.

pub mod error;
pub mod status;
pub mod template;
pub mod types;
pub mod validation;

pub use error::BudgetError;
pub use status::EntryStatus;
pub use template::{BudgetTemplate, TemplateCategory};
pub use types::{
    ActualBalance, AmortizationMode, Budget, BudgetSnapshot, Category, CategoryKind,
    DeductionType, Entry, MONTHS_PER_YEAR, Month, SalaryDeduction, TaxRule,
};
pub use validation::{flagged_payroll_source, parse_amount};
