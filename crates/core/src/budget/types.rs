//! Budget data types.
//!
//! These mirror the records kept by the persistence layer. The aggregator
//! only reads them.

use haushalt_shared::types::{
    ActualBalanceId, BudgetId, CategoryId, Currency, DeductionId, EntryId, TaxRuleId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BudgetError;

/// Number of months in a planning year.
pub const MONTHS_PER_YEAR: u8 = 12;

/// A calendar month, always within 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

impl Month {
    const ABBREVIATIONS: [&'static str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// Creates a month from its number.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::InvalidMonth` outside 1..=12.
    pub fn new(number: u8) -> Result<Self, BudgetError> {
        if (1..=MONTHS_PER_YEAR).contains(&number) {
            Ok(Self(number))
        } else {
            Err(BudgetError::InvalidMonth(number))
        }
    }

    /// Creates a month from any offset, wrapping into 1..=12.
    #[must_use]
    pub const fn wrapping(number: u32) -> Self {
        // 0 wraps to December, 13 to January.
        let zero_based = (number + 11) % 12;
        #[allow(clippy::cast_possible_truncation)]
        Self(zero_based as u8 + 1)
    }

    /// All twelve months in calendar order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=MONTHS_PER_YEAR).map(Self)
    }

    /// Month number, 1..=12.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position in a twelve-month table.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Three-letter English abbreviation.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        Self::ABBREVIATIONS[self.index()]
    }
}

impl TryFrom<u8> for Month {
    type Error = BudgetError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryKind {
    /// Money coming in.
    Income,
    /// Recurring costs such as rent or insurance.
    FixedExpense,
    /// Costs that change from month to month.
    VariableExpense,
    /// Money put aside.
    Savings,
}

impl CategoryKind {
    /// Returns true for income categories; everything else counts as an expense.
    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self, Self::Income)
    }
}

/// How a category's amount is spread over the year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmortizationMode {
    /// Amounts are entered per month as entries.
    #[default]
    Monthly,
    /// `period_amount` is the annual amount, spread evenly.
    Yearly,
    /// `period_amount` is paid in a fixed number of installments.
    Custom,
}

/// Salary deduction type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeductionType {
    /// Percentage of gross salary.
    #[default]
    Percentage,
    /// Fixed amount per month.
    Fixed,
}

/// A budget plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Budget name.
    pub name: String,
    /// Currency code; the configured default applies when absent.
    #[serde(default)]
    pub currency: Option<Currency>,
}

/// An income or expense category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Owning budget.
    pub budget_id: BudgetId,
    /// Display name.
    pub name: String,
    /// Income or expense classification.
    pub kind: CategoryKind,
    /// Distribution mode.
    #[serde(default)]
    pub amortization_mode: AmortizationMode,
    /// Number of installments for CUSTOM mode.
    #[serde(default)]
    pub custom_installment_count: Option<u8>,
    /// First installment month for CUSTOM mode (defaults to January).
    #[serde(default)]
    pub custom_start_month: Option<u8>,
    /// Annual amount (YEARLY) or per-installment amount (CUSTOM).
    #[serde(default)]
    pub period_amount: Option<Decimal>,
    /// Sort order within the budget.
    #[serde(default)]
    pub order: i32,
    /// Inactive categories are ignored by every total.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Marks the category whose amount is gross salary.
    #[serde(default)]
    pub is_payroll_source: bool,
}

/// A planned/actual amount for a MONTHLY category in one month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Entry ID.
    pub id: EntryId,
    /// Owning category.
    pub category_id: CategoryId,
    /// Month of the entry.
    pub month: Month,
    /// Year of the entry.
    pub year: i32,
    /// Planned amount.
    #[serde(default)]
    pub planned_amount: Decimal,
    /// Actual amount, once known.
    #[serde(default)]
    pub actual_amount: Option<Decimal>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl Entry {
    /// The amount that counts for totals: actual if recorded, planned otherwise.
    #[must_use]
    pub fn effective_amount(&self) -> Decimal {
        self.actual_amount.unwrap_or(self.planned_amount)
    }
}

/// A percentage tax on gross salary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxRule {
    /// Tax rule ID.
    pub id: TaxRuleId,
    /// Owning budget.
    pub budget_id: BudgetId,
    /// Tax name.
    pub name: String,
    /// Percentage of gross salary (e.g. 10.5 for 10.5%).
    pub percentage: Decimal,
    /// Inactive rules contribute nothing.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Sort order.
    #[serde(default)]
    pub order: i32,
}

/// A reduction from gross to net salary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalaryDeduction {
    /// Deduction ID.
    pub id: DeductionId,
    /// Owning budget.
    pub budget_id: BudgetId,
    /// Deduction name (e.g. pension fund, health insurance).
    pub name: String,
    /// Percentage or fixed.
    #[serde(default)]
    pub deduction_type: DeductionType,
    /// Percentage (0-100) or fixed amount.
    pub value: Decimal,
    /// Inactive deductions contribute nothing.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Sort order.
    #[serde(default)]
    pub order: i32,
}

/// Recorded real-world totals for one month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActualBalance {
    /// Actual balance ID.
    pub id: ActualBalanceId,
    /// Owning budget.
    pub budget_id: BudgetId,
    /// Month.
    pub month: Month,
    /// Year.
    pub year: i32,
    /// Actual income for the month.
    #[serde(default)]
    pub actual_income: Decimal,
    /// Actual expenses for the month.
    #[serde(default)]
    pub actual_expenses: Decimal,
}

impl ActualBalance {
    /// Income minus expenses.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.actual_income - self.actual_expenses
    }
}

/// Everything the aggregator needs for one budget year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    /// The budget.
    pub budget: Budget,
    /// Planning year.
    pub year: i32,
    /// Budget categories.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Monthly entries (may include other years).
    #[serde(default)]
    pub entries: Vec<Entry>,
    /// Tax rules.
    #[serde(default)]
    pub tax_rules: Vec<TaxRule>,
    /// Salary deductions.
    #[serde(default)]
    pub deductions: Vec<SalaryDeduction>,
    /// Recorded actual balances (may include other years).
    #[serde(default)]
    pub actual_balances: Vec<ActualBalance>,
}

impl BudgetSnapshot {
    /// Entries that belong to the planning year.
    #[must_use]
    pub fn year_entries(&self) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|e| e.year == self.year)
            .cloned()
            .collect()
    }

    /// Looks up a category by ID.
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

fn default_true() -> bool {
    true
}
