//! Budget aggregation: monthly amounts, payroll and totals.

use haushalt_shared::config::PlannerConfig;
use rust_decimal::Decimal;
use tracing::warn;

use super::amortization::InstallmentSchedule;
use super::types::{
    Contribution, LineGroup, LineSource, MonthContributions, PayrollBreakdown, Period,
    PlannedVsActual, Totals, checked_sum,
};
use crate::budget::{
    ActualBalance, AmortizationMode, BudgetError, Category, DeductionType, Entry, MONTHS_PER_YEAR,
    Month, SalaryDeduction, TaxRule, flagged_payroll_source,
};

/// Derives monthly and yearly figures from a budget's records.
///
/// All operations are pure; the only setting is the name fragment used to
/// find the payroll category when no category carries the payroll flag.
#[derive(Debug, Clone)]
pub struct BudgetAggregator {
    payroll_keyword: String,
}

impl BudgetAggregator {
    /// Creates an aggregator that falls back to `payroll_keyword` name matching.
    #[must_use]
    pub fn new(payroll_keyword: impl Into<String>) -> Self {
        Self {
            payroll_keyword: payroll_keyword.into().to_lowercase(),
        }
    }

    /// Creates an aggregator from planner configuration.
    #[must_use]
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.payroll_keyword.clone())
    }

    /// Amount a category contributes in `month`.
    ///
    /// - MONTHLY: sum of the category's entries for the month, actual amount
    ///   where recorded, planned otherwise.
    /// - YEARLY: `period_amount / 12`.
    /// - CUSTOM: `period_amount` in installment months, zero otherwise.
    ///
    /// `entries` should already be restricted to one year.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` if the entry sum overflows.
    pub fn monthly_amount_for_category(
        category: &Category,
        entries: &[Entry],
        month: Month,
    ) -> Result<Decimal, BudgetError> {
        let period_amount = category.period_amount.unwrap_or(Decimal::ZERO);

        match category.amortization_mode {
            AmortizationMode::Monthly => entries
                .iter()
                .filter(|e| e.category_id == category.id && e.month == month)
                .try_fold(Decimal::ZERO, |acc, e| {
                    checked_sum(acc, e.effective_amount(), "monthly entries")
                }),
            AmortizationMode::Yearly => period_amount
                .checked_div(Decimal::from(MONTHS_PER_YEAR))
                .ok_or(BudgetError::Computation("yearly installment")),
            AmortizationMode::Custom => {
                if InstallmentSchedule::for_category(category).contains(month) {
                    Ok(period_amount)
                } else {
                    Ok(Decimal::ZERO)
                }
            }
        }
    }

    /// Installment months of a CUSTOM category, in calendar order.
    ///
    /// Empty for other modes and for categories without a valid count.
    #[must_use]
    pub fn installment_months(category: &Category) -> Vec<Month> {
        if category.amortization_mode != AmortizationMode::Custom {
            return Vec::new();
        }
        InstallmentSchedule::for_category(category).months().collect()
    }

    /// Amount a category contributes over the whole year, computed directly.
    ///
    /// Agrees with the sum of `monthly_amount_for_category` over all months
    /// up to decimal rounding.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` on overflow.
    pub fn annual_amount_for_category(
        category: &Category,
        entries: &[Entry],
    ) -> Result<Decimal, BudgetError> {
        let period_amount = category.period_amount.unwrap_or(Decimal::ZERO);

        match category.amortization_mode {
            AmortizationMode::Monthly => entries
                .iter()
                .filter(|e| e.category_id == category.id)
                .try_fold(Decimal::ZERO, |acc, e| {
                    checked_sum(acc, e.effective_amount(), "annual entries")
                }),
            AmortizationMode::Yearly => Ok(period_amount),
            AmortizationMode::Custom => {
                let installments = InstallmentSchedule::for_category(category).len();
                period_amount
                    .checked_mul(Decimal::from(installments))
                    .ok_or(BudgetError::Computation("annual installments"))
            }
        }
    }

    /// Finds the category whose amount is gross salary.
    ///
    /// A flagged category wins. Otherwise the first active income category
    /// (by order, then name) whose name contains the payroll keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the payroll flag is ambiguous or misplaced.
    pub fn payroll_category<'a>(
        &self,
        categories: &'a [Category],
    ) -> Result<Option<&'a Category>, BudgetError> {
        if let Some(flagged) = flagged_payroll_source(categories)? {
            return Ok(Some(flagged));
        }
        if self.payroll_keyword.is_empty() {
            return Ok(None);
        }

        let mut matches: Vec<&Category> = categories
            .iter()
            .filter(|c| {
                c.is_active
                    && c.kind.is_income()
                    && c.name.to_lowercase().contains(&self.payroll_keyword)
            })
            .collect();
        matches.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));

        if matches.len() > 1 {
            warn!(
                keyword = %self.payroll_keyword,
                chosen = %matches[0].name,
                candidates = matches.len(),
                "Several income categories match the payroll keyword"
            );
        }

        Ok(matches.first().copied())
    }

    /// Gross salary in `month`; zero when there is no payroll category.
    ///
    /// # Errors
    ///
    /// Returns an error if the payroll flag is ambiguous or misplaced.
    pub fn gross_salary_for_month(
        &self,
        categories: &[Category],
        entries: &[Entry],
        month: Month,
    ) -> Result<Decimal, BudgetError> {
        Self::gross_salary_from(self.payroll_category(categories)?, entries, month)
    }

    fn gross_salary_from(
        payroll_category: Option<&Category>,
        entries: &[Entry],
        month: Month,
    ) -> Result<Decimal, BudgetError> {
        payroll_category.map_or(Ok(Decimal::ZERO), |c| {
            Self::monthly_amount_for_category(c, entries, month)
        })
    }

    /// Sum of active deductions on `gross_salary`.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` on overflow.
    pub fn total_deductions_for_month(
        deductions: &[SalaryDeduction],
        gross_salary: Decimal,
    ) -> Result<Decimal, BudgetError> {
        if gross_salary.is_zero() {
            return Ok(Decimal::ZERO);
        }

        deductions
            .iter()
            .filter(|d| d.is_active)
            .try_fold(Decimal::ZERO, |acc, d| {
                let amount = match d.deduction_type {
                    DeductionType::Percentage => percentage_of(gross_salary, d.value, "deduction")?,
                    DeductionType::Fixed => d.value,
                };
                checked_sum(acc, amount, "deductions")
            })
    }

    /// Gross salary minus deductions, floored at zero.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` on overflow.
    pub fn net_salary_for_month(
        deductions: &[SalaryDeduction],
        gross_salary: Decimal,
    ) -> Result<Decimal, BudgetError> {
        let deducted = Self::total_deductions_for_month(deductions, gross_salary)?;
        let net = gross_salary
            .checked_sub(deducted)
            .ok_or(BudgetError::Computation("net salary"))?;
        Ok(net.max(Decimal::ZERO))
    }

    /// Tax owed on `gross_salary` under one rule; zero if inactive.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` on overflow.
    pub fn tax_amount_for_month(
        tax_rule: &TaxRule,
        gross_salary: Decimal,
    ) -> Result<Decimal, BudgetError> {
        if !tax_rule.is_active {
            return Ok(Decimal::ZERO);
        }
        percentage_of(gross_salary, tax_rule.percentage, "tax")
    }

    /// Gross, deductions, net and taxes for `month`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payroll flag is ambiguous or misplaced.
    pub fn payroll_breakdown(
        &self,
        categories: &[Category],
        entries: &[Entry],
        tax_rules: &[TaxRule],
        deductions: &[SalaryDeduction],
        month: Month,
    ) -> Result<PayrollBreakdown, BudgetError> {
        let gross = self.gross_salary_for_month(categories, entries, month)?;
        Self::payroll_for_gross(tax_rules, deductions, gross)
    }

    /// Payroll figures for a given gross salary.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` on overflow.
    pub fn payroll_for_gross(
        tax_rules: &[TaxRule],
        deductions: &[SalaryDeduction],
        gross: Decimal,
    ) -> Result<PayrollBreakdown, BudgetError> {
        let taxes = tax_rules.iter().try_fold(Decimal::ZERO, |acc, t| {
            checked_sum(acc, Self::tax_amount_for_month(t, gross)?, "taxes")
        })?;

        Ok(PayrollBreakdown {
            gross,
            deductions: Self::total_deductions_for_month(deductions, gross)?,
            net: Self::net_salary_for_month(deductions, gross)?,
            taxes,
        })
    }

    /// Every amount that flows into `month`'s totals.
    ///
    /// Active categories in order, the payroll category counted at net
    /// salary, followed by one line per active tax rule. Deductions never
    /// appear as lines of their own; they are already inside net salary.
    ///
    /// # Errors
    ///
    /// Returns an error if the payroll flag is ambiguous or misplaced.
    pub fn monthly_contributions(
        &self,
        categories: &[Category],
        entries: &[Entry],
        tax_rules: &[TaxRule],
        deductions: &[SalaryDeduction],
        month: Month,
    ) -> Result<MonthContributions, BudgetError> {
        let payroll_category = self.payroll_category(categories)?;
        Self::contributions_with_payroll(
            payroll_category,
            categories,
            entries,
            tax_rules,
            deductions,
            month,
        )
    }

    /// Same as [`Self::monthly_contributions`] with the payroll category
    /// already resolved, so callers covering several months look it up once.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` on overflow.
    pub fn contributions_with_payroll(
        payroll_category: Option<&Category>,
        categories: &[Category],
        entries: &[Entry],
        tax_rules: &[TaxRule],
        deductions: &[SalaryDeduction],
        month: Month,
    ) -> Result<MonthContributions, BudgetError> {
        let gross = Self::gross_salary_from(payroll_category, entries, month)?;
        let payroll = Self::payroll_for_gross(tax_rules, deductions, gross)?;
        let payroll_id = payroll_category.map(|c| c.id);

        let mut active: Vec<&Category> = categories.iter().filter(|c| c.is_active).collect();
        active.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));

        let mut lines = Vec::with_capacity(active.len() + tax_rules.len());
        for category in active {
            let amount = if Some(category.id) == payroll_id {
                payroll.net
            } else {
                Self::monthly_amount_for_category(category, entries, month)?
            };
            lines.push(Contribution {
                source: LineSource::Category(category.id),
                label: category.name.clone(),
                group: LineGroup::from(category.kind),
                amount,
            });
        }

        let mut taxes: Vec<&TaxRule> = tax_rules.iter().filter(|t| t.is_active).collect();
        taxes.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        for rule in taxes {
            lines.push(Contribution {
                source: LineSource::Tax(rule.id),
                label: rule.name.clone(),
                group: LineGroup::Tax,
                amount: Self::tax_amount_for_month(rule, payroll.gross)?,
            });
        }

        Ok(MonthContributions {
            month,
            lines,
            payroll,
        })
    }

    /// Income, expenses and balance for `month`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payroll flag is ambiguous or misplaced, or
    /// `BudgetError::Computation` on overflow.
    pub fn monthly_totals(
        &self,
        categories: &[Category],
        entries: &[Entry],
        tax_rules: &[TaxRule],
        deductions: &[SalaryDeduction],
        month: Month,
    ) -> Result<Totals, BudgetError> {
        self.monthly_contributions(categories, entries, tax_rules, deductions, month)?
            .totals()
    }

    /// Income, expenses and balance for the year: the sum of the twelve
    /// monthly totals.
    ///
    /// # Errors
    ///
    /// Same as [`Self::monthly_totals`].
    pub fn yearly_totals(
        &self,
        categories: &[Category],
        entries: &[Entry],
        tax_rules: &[TaxRule],
        deductions: &[SalaryDeduction],
    ) -> Result<Totals, BudgetError> {
        let payroll_category = self.payroll_category(categories)?;
        Month::all().try_fold(Totals::default(), |acc, month| {
            let totals = Self::contributions_with_payroll(
                payroll_category,
                categories,
                entries,
                tax_rules,
                deductions,
                month,
            )?
            .totals()?;
            acc.checked_add(totals)
        })
    }

    /// Compares planned totals with the actual balances recorded for `period`.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` on overflow.
    pub fn planned_vs_actual(
        planned: Totals,
        actual_balances: &[ActualBalance],
        year: i32,
        period: Period,
    ) -> Result<PlannedVsActual, BudgetError> {
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        let mut recorded_months = 0;

        for balance in actual_balances.iter().filter(|b| {
            b.year == year
                && match period {
                    Period::Month(month) => b.month == month,
                    Period::Year => true,
                }
        }) {
            income = checked_sum(income, balance.actual_income, "actual income")?;
            expenses = checked_sum(expenses, balance.actual_expenses, "actual expenses")?;
            recorded_months += 1;
        }

        let actual = Totals::new(income, expenses)?;
        let delta = actual
            .balance
            .checked_sub(planned.balance)
            .ok_or(BudgetError::Computation("planned vs actual delta"))?;

        Ok(PlannedVsActual {
            planned,
            actual,
            delta,
            recorded_months,
        })
    }
}

impl Default for BudgetAggregator {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

/// `percentage`% of `amount`.
fn percentage_of(
    amount: Decimal,
    percentage: Decimal,
    what: &'static str,
) -> Result<Decimal, BudgetError> {
    amount
        .checked_mul(percentage)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(BudgetError::Computation(what))
}
