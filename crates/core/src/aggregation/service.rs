//! Summary service: monthly/yearly tables and category overviews.

use haushalt_shared::config::PlannerConfig;
use haushalt_shared::types::{CategoryId, Currency};
use rust_decimal::Decimal;

use super::aggregator::BudgetAggregator;
use super::types::{
    CategoryMonth, CategoryOverview, MonthContributions, MonthlySummary, Period, SummaryLine,
    Totals, YearlySummary, checked_sum,
};
use crate::budget::{
    ActualBalance, AmortizationMode, Budget, BudgetError, BudgetSnapshot, Category, Entry,
    EntryStatus, Month,
};

/// Builds summaries of a budget snapshot.
#[derive(Debug, Clone)]
pub struct SummaryService {
    aggregator: BudgetAggregator,
    warning_threshold: Decimal,
    default_currency: Currency,
}

impl SummaryService {
    /// Creates a summary service.
    #[must_use]
    pub const fn new(aggregator: BudgetAggregator, warning_threshold: Decimal) -> Self {
        Self {
            aggregator,
            warning_threshold,
            default_currency: Currency::Chf,
        }
    }

    /// Sets the currency used for budgets that do not name one.
    #[must_use]
    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = currency;
        self
    }

    /// Creates a summary service from planner configuration.
    #[must_use]
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(
            BudgetAggregator::from_config(config),
            config.warning_threshold_percent,
        )
        .with_default_currency(config.currency)
    }

    /// The underlying aggregator.
    #[must_use]
    pub const fn aggregator(&self) -> &BudgetAggregator {
        &self.aggregator
    }

    /// Currency of `budget`, falling back to the configured default.
    #[must_use]
    pub fn currency(&self, budget: &Budget) -> Currency {
        budget.currency.unwrap_or(self.default_currency)
    }

    /// Summary row for a single month of the snapshot's year.
    ///
    /// # Errors
    ///
    /// Returns an error if the payroll flag is ambiguous or on overflow.
    pub fn monthly_summary(
        &self,
        snapshot: &BudgetSnapshot,
        month: Month,
    ) -> Result<MonthlySummary, BudgetError> {
        let entries = snapshot.year_entries();
        let payroll_category = self.aggregator.payroll_category(&snapshot.categories)?;
        let contributions = Self::contributions(snapshot, payroll_category, &entries, month)?;
        Self::month_row(snapshot, &contributions)
    }

    /// Twelve-month table with per-line breakdown, yearly totals and the
    /// planned vs. actual comparison.
    ///
    /// # Errors
    ///
    /// Returns an error if the payroll flag is ambiguous or on overflow.
    pub fn yearly_summary(&self, snapshot: &BudgetSnapshot) -> Result<YearlySummary, BudgetError> {
        let entries = snapshot.year_entries();
        let payroll_category = self.aggregator.payroll_category(&snapshot.categories)?;
        let contributions = Month::all()
            .map(|month| Self::contributions(snapshot, payroll_category, &entries, month))
            .collect::<Result<Vec<_>, _>>()?;

        let months = contributions
            .iter()
            .map(|c| Self::month_row(snapshot, c))
            .collect::<Result<Vec<_>, _>>()?;

        let planned = months
            .iter()
            .try_fold(Totals::default(), |acc, row| acc.checked_add(row.planned))?;

        let comparison = BudgetAggregator::planned_vs_actual(
            planned,
            &snapshot.actual_balances,
            snapshot.year,
            Period::Year,
        )?;
        let recorded = comparison.recorded_months > 0;

        Ok(YearlySummary {
            budget_id: snapshot.budget.id,
            budget_name: snapshot.budget.name.clone(),
            currency: self.currency(&snapshot.budget),
            year: snapshot.year,
            months,
            lines: Self::lines(&contributions)?,
            planned,
            actual: recorded.then_some(comparison.actual),
            delta: recorded.then_some(comparison.delta),
        })
    }

    /// Planned vs. actual per month for one category.
    ///
    /// MONTHLY categories take planned and actual amounts from their entries.
    /// YEARLY and CUSTOM categories are planned from `period_amount` and have
    /// no actual amounts of their own.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::CategoryNotFound` if the category is not part of
    /// the snapshot.
    pub fn category_overview(
        &self,
        snapshot: &BudgetSnapshot,
        category_id: CategoryId,
    ) -> Result<CategoryOverview, BudgetError> {
        let category = snapshot
            .category(category_id)
            .ok_or(BudgetError::CategoryNotFound(category_id))?;
        let entries = snapshot.year_entries();

        let mut months = Vec::with_capacity(usize::from(crate::budget::MONTHS_PER_YEAR));
        let mut planned_total = Decimal::ZERO;
        let mut actual_total = Decimal::ZERO;

        for month in Month::all() {
            let (planned, actual) = match category.amortization_mode {
                AmortizationMode::Monthly => {
                    let month_entries: Vec<&Entry> = entries
                        .iter()
                        .filter(|e| e.category_id == category.id && e.month == month)
                        .collect();
                    let planned = month_entries.iter().try_fold(Decimal::ZERO, |acc, e| {
                        checked_sum(acc, e.planned_amount, "category planned amount")
                    })?;
                    let actual = month_entries
                        .iter()
                        .filter_map(|e| e.actual_amount)
                        .try_fold(None, |acc: Option<Decimal>, amount| {
                            let total = acc.unwrap_or(Decimal::ZERO);
                            checked_sum(total, amount, "category actual amount").map(Some)
                        })?;
                    (planned, actual)
                }
                AmortizationMode::Yearly | AmortizationMode::Custom => (
                    BudgetAggregator::monthly_amount_for_category(category, &entries, month)?,
                    None,
                ),
            };

            planned_total = checked_sum(planned_total, planned, "category planned total")?;
            if let Some(actual) = actual {
                actual_total = checked_sum(actual_total, actual, "category actual total")?;
            }

            months.push(CategoryMonth {
                month,
                planned,
                actual,
                status: EntryStatus::evaluate(
                    category.kind,
                    planned,
                    actual,
                    self.warning_threshold,
                )?,
            });
        }

        Ok(CategoryOverview {
            category_id: category.id,
            name: category.name.clone(),
            kind: category.kind,
            amortization_mode: category.amortization_mode,
            months,
            planned_total,
            actual_total,
        })
    }

    /// Years that have entries or recorded balances, ascending.
    #[must_use]
    pub fn available_years(entries: &[Entry], actual_balances: &[ActualBalance]) -> Vec<i32> {
        let mut years: Vec<i32> = entries
            .iter()
            .map(|e| e.year)
            .chain(actual_balances.iter().map(|b| b.year))
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    fn contributions(
        snapshot: &BudgetSnapshot,
        payroll_category: Option<&Category>,
        entries: &[Entry],
        month: Month,
    ) -> Result<MonthContributions, BudgetError> {
        BudgetAggregator::contributions_with_payroll(
            payroll_category,
            &snapshot.categories,
            entries,
            &snapshot.tax_rules,
            &snapshot.deductions,
            month,
        )
    }

    fn month_row(
        snapshot: &BudgetSnapshot,
        contributions: &MonthContributions,
    ) -> Result<MonthlySummary, BudgetError> {
        let planned = contributions.totals()?;
        let comparison = BudgetAggregator::planned_vs_actual(
            planned,
            &snapshot.actual_balances,
            snapshot.year,
            Period::Month(contributions.month),
        )?;
        let recorded = comparison.recorded_months > 0;

        Ok(MonthlySummary {
            month: contributions.month,
            planned,
            payroll: contributions.payroll,
            actual: recorded.then_some(comparison.actual),
            delta: recorded.then_some(comparison.delta),
        })
    }

    fn lines(contributions: &[MonthContributions]) -> Result<Vec<SummaryLine>, BudgetError> {
        let Some(first) = contributions.first() else {
            return Ok(Vec::new());
        };

        // Every month lists the same sources in the same order.
        first
            .lines
            .iter()
            .enumerate()
            .map(|(index, head)| {
                let monthly: Vec<Decimal> = contributions
                    .iter()
                    .map(|c| c.lines[index].amount)
                    .collect();
                let total = monthly
                    .iter()
                    .try_fold(Decimal::ZERO, |acc, amount| {
                        checked_sum(acc, *amount, "line total")
                    })?;
                Ok(SummaryLine {
                    source: head.source,
                    label: head.label.clone(),
                    group: head.group,
                    monthly,
                    total,
                })
            })
            .collect()
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}
