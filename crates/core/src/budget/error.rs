//! Budget error types.

use haushalt_shared::AppError;
use haushalt_shared::types::CategoryId;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::Month;

/// Budget-related errors.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// A raw amount could not be parsed as a decimal.
    #[error("Invalid decimal for {field}: {value:?}")]
    Parse {
        /// Field the value was entered for.
        field: String,
        /// The rejected raw input.
        value: String,
    },

    /// Month outside 1..=12.
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u8),

    /// Year outside the supported planning range.
    #[error("Year must be between 2000 and 2100, got {0}")]
    InvalidYear(i32),

    /// CUSTOM category without a usable installment count.
    #[error("Category {category}: installment count must be between 1 and 12")]
    InvalidInstallmentCount {
        /// Category name.
        category: String,
    },

    /// CUSTOM category with a start month outside 1..=12.
    #[error("Category {category}: start month must be between 1 and 12, got {month}")]
    InvalidStartMonth {
        /// Category name.
        category: String,
        /// Rejected start month.
        month: u8,
    },

    /// Percentage outside 0..=100.
    #[error("{name}: percentage must be between 0 and 100, got {value}")]
    InvalidPercentage {
        /// Tax rule or deduction name.
        name: String,
        /// Rejected percentage.
        value: Decimal,
    },

    /// Amount cannot be negative.
    #[error("{name}: amount cannot be negative")]
    NegativeAmount {
        /// Record name.
        name: String,
    },

    /// Amount beyond 8 integer digits or 2 decimal places.
    #[error("{name}: {value} exceeds 8 integer digits or 2 decimal places")]
    AmountOutOfRange {
        /// Record name.
        name: String,
        /// Rejected amount.
        value: Decimal,
    },

    /// More than one entry for the same category and month.
    #[error("Duplicate entry for category {category_id} in {year}/{month}")]
    DuplicateEntry {
        /// Owning category.
        category_id: CategoryId,
        /// Entry month.
        month: Month,
        /// Entry year.
        year: i32,
    },

    /// More than one actual balance for the same month.
    #[error("Duplicate actual balance for {year}/{month}")]
    DuplicateActualBalance {
        /// Balance month.
        month: Month,
        /// Balance year.
        year: i32,
    },

    /// Category name already used in this budget.
    #[error("Category name already exists in this budget: {0}")]
    DuplicateCategoryName(String),

    /// Record belongs to a different budget than the snapshot.
    #[error("{0} belongs to another budget")]
    ForeignRecord(String),

    /// More than one category carries the payroll flag.
    #[error("Multiple categories are flagged as payroll source")]
    MultiplePayrollSources,

    /// The payroll flag is set on a non-income category.
    #[error("Payroll source must be an income category: {0}")]
    PayrollSourceNotIncome(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Decimal arithmetic overflowed.
    #[error("Arithmetic overflow while computing {0}")]
    Computation(&'static str),
}

impl BudgetError {
    /// Returns true if the error refers to a missing record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::CategoryNotFound(_))
    }
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::CategoryNotFound(_) => Self::NotFound(err.to_string()),
            BudgetError::Computation(_) => Self::Internal(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
