//! Aggregation result types.

use haushalt_shared::types::{BudgetId, CategoryId, Currency, TaxRuleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::budget::{AmortizationMode, BudgetError, CategoryKind, EntryStatus, Month};

/// Income, expenses and their difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Total income.
    pub income: Decimal,
    /// Total expenses, taxes included.
    pub expenses: Decimal,
    /// Income minus expenses.
    pub balance: Decimal,
}

impl Totals {
    /// Builds totals from income and expenses.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` if the balance overflows.
    pub fn new(income: Decimal, expenses: Decimal) -> Result<Self, BudgetError> {
        let balance = income
            .checked_sub(expenses)
            .ok_or(BudgetError::Computation("balance"))?;
        Ok(Self {
            income,
            expenses,
            balance,
        })
    }

    /// Adds two totals component-wise.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, BudgetError> {
        let income = checked_sum(self.income, other.income, "income")?;
        let expenses = checked_sum(self.expenses, other.expenses, "expenses")?;
        Self::new(income, expenses)
    }

    /// Rounds every component for display.
    #[must_use]
    pub fn round_dp(self, decimal_places: u32) -> Self {
        Self {
            income: self.income.round_dp(decimal_places),
            expenses: self.expenses.round_dp(decimal_places),
            balance: self.balance.round_dp(decimal_places),
        }
    }
}

pub(crate) fn checked_sum(
    total: Decimal,
    amount: Decimal,
    what: &'static str,
) -> Result<Decimal, BudgetError> {
    total
        .checked_add(amount)
        .ok_or(BudgetError::Computation(what))
}

/// Gross to net salary for one month, plus the taxes derived from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    /// Gross salary.
    pub gross: Decimal,
    /// Sum of active deductions.
    pub deductions: Decimal,
    /// Gross minus deductions, never negative.
    pub net: Decimal,
    /// Sum of active taxes on gross salary.
    pub taxes: Decimal,
}

/// Period selector for planned vs. actual comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// A single month of the year.
    Month(Month),
    /// The whole year.
    Year,
}

/// Planned (SOLL) vs. actual (IST) comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedVsActual {
    /// Planned totals from the categories.
    pub planned: Totals,
    /// Totals from recorded actual balances.
    pub actual: Totals,
    /// `actual.balance - planned.balance`.
    pub delta: Decimal,
    /// Number of recorded months in the period.
    pub recorded_months: usize,
}

/// Grouping of a summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineGroup {
    /// Income categories.
    Income,
    /// Fixed expense categories.
    FixedExpense,
    /// Variable expense categories.
    VariableExpense,
    /// Savings categories.
    Savings,
    /// Taxes on gross salary.
    Tax,
}

impl LineGroup {
    /// All groups in display order.
    pub const ALL: [Self; 5] = [
        Self::Income,
        Self::FixedExpense,
        Self::VariableExpense,
        Self::Savings,
        Self::Tax,
    ];

    /// Returns true if the group adds to income.
    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self, Self::Income)
    }

    /// Heading used in tables and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::FixedExpense => "Fixed costs",
            Self::VariableExpense => "Variable costs",
            Self::Savings => "Savings",
            Self::Tax => "Taxes",
        }
    }
}

impl From<CategoryKind> for LineGroup {
    fn from(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Income => Self::Income,
            CategoryKind::FixedExpense => Self::FixedExpense,
            CategoryKind::VariableExpense => Self::VariableExpense,
            CategoryKind::Savings => Self::Savings,
        }
    }
}

/// Record a summary line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum LineSource {
    /// A budget category.
    Category(CategoryId),
    /// A tax rule.
    Tax(TaxRuleId),
}

/// One category's or tax's contribution in a single month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    /// Origin of the amount.
    pub source: LineSource,
    /// Display label.
    pub label: String,
    /// Income or expense group.
    pub group: LineGroup,
    /// Amount counted in the month's totals.
    pub amount: Decimal,
}

/// Everything that flows into one month's totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthContributions {
    /// Month.
    pub month: Month,
    /// Per-category and per-tax amounts, in display order.
    pub lines: Vec<Contribution>,
    /// Payroll figures for the month.
    pub payroll: PayrollBreakdown,
}

impl MonthContributions {
    /// Folds the contributions into income/expense totals.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` on overflow.
    pub fn totals(&self) -> Result<Totals, BudgetError> {
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;

        for line in &self.lines {
            if line.group.is_income() {
                income = checked_sum(income, line.amount, "monthly income")?;
            } else {
                expenses = checked_sum(expenses, line.amount, "monthly expenses")?;
            }
        }

        Totals::new(income, expenses)
    }
}

/// One row of the twelve-month table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Month.
    pub month: Month,
    /// Planned totals.
    pub planned: Totals,
    /// Payroll figures.
    pub payroll: PayrollBreakdown,
    /// Recorded actual totals, if a balance was recorded for the month.
    pub actual: Option<Totals>,
    /// `actual.balance - planned.balance`, if recorded.
    pub delta: Option<Decimal>,
}

/// A category or tax across the twelve months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    /// Origin of the line.
    pub source: LineSource,
    /// Display label.
    pub label: String,
    /// Income or expense group.
    pub group: LineGroup,
    /// Amount per month, January first.
    pub monthly: Vec<Decimal>,
    /// Sum of the monthly amounts.
    pub total: Decimal,
}

/// Full-year summary of a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    /// Budget ID.
    pub budget_id: BudgetId,
    /// Budget name.
    pub budget_name: String,
    /// Currency code.
    pub currency: Currency,
    /// Planning year.
    pub year: i32,
    /// One row per month.
    pub months: Vec<MonthlySummary>,
    /// One line per active category and tax rule.
    pub lines: Vec<SummaryLine>,
    /// Planned yearly totals (sum of the monthly rows).
    pub planned: Totals,
    /// Yearly actual totals, if any month was recorded.
    pub actual: Option<Totals>,
    /// Yearly `actual.balance - planned.balance`, if any month was recorded.
    pub delta: Option<Decimal>,
}

/// One month of a category overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMonth {
    /// Month.
    pub month: Month,
    /// Planned amount.
    pub planned: Decimal,
    /// Actual amount, if entered.
    pub actual: Option<Decimal>,
    /// Status of the actual against the plan.
    pub status: EntryStatus,
}

/// Planned vs. actual for a single category over the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOverview {
    /// Category ID.
    pub category_id: CategoryId,
    /// Category name.
    pub name: String,
    /// Category kind.
    pub kind: CategoryKind,
    /// Distribution mode.
    pub amortization_mode: AmortizationMode,
    /// One row per month.
    pub months: Vec<CategoryMonth>,
    /// Sum of planned amounts.
    pub planned_total: Decimal,
    /// Sum of entered actual amounts.
    pub actual_total: Decimal,
}
