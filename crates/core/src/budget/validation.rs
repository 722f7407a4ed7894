//! Data-entry validation for budget snapshots.
//!
//! The aggregator itself is lenient (a CUSTOM category without installments
//! simply contributes nothing). These checks run at the boundary so that
//! malformed records are reported instead of silently computing to zero.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::BudgetError;
use super::types::{AmortizationMode, BudgetSnapshot, Category, DeductionType, MONTHS_PER_YEAR};

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

/// Stored amounts have at most 10 digits, 2 of them decimal places.
const MAX_AMOUNT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
const AMOUNT_SCALE: u32 = 2;

/// Parses a raw decimal string entered for `field`.
///
/// # Errors
///
/// Returns `BudgetError::Parse` for anything that is not a plain decimal
/// number. Blank input is rejected too, it is never read as zero.
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, BudgetError> {
    Decimal::from_str(raw.trim()).map_err(|_| BudgetError::Parse {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Returns the category flagged as payroll source, if any.
///
/// # Errors
///
/// Returns `BudgetError::MultiplePayrollSources` when more than one active
/// category is flagged and `BudgetError::PayrollSourceNotIncome` when the
/// flag sits on an expense category.
pub fn flagged_payroll_source(categories: &[Category]) -> Result<Option<&Category>, BudgetError> {
    let mut flagged = categories
        .iter()
        .filter(|c| c.is_active && c.is_payroll_source);

    let Some(source) = flagged.next() else {
        return Ok(None);
    };
    if flagged.next().is_some() {
        return Err(BudgetError::MultiplePayrollSources);
    }
    if !source.kind.is_income() {
        return Err(BudgetError::PayrollSourceNotIncome(source.name.clone()));
    }

    Ok(Some(source))
}

impl BudgetSnapshot {
    /// Validates every record of the snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), BudgetError> {
        validate_year(self.year)?;
        self.validate_categories()?;
        self.validate_entries()?;
        self.validate_rates()?;
        self.validate_actual_balances()?;
        flagged_payroll_source(&self.categories)?;
        Ok(())
    }

    fn validate_categories(&self) -> Result<(), BudgetError> {
        let mut names = HashSet::new();

        for category in &self.categories {
            if category.budget_id != self.budget.id {
                return Err(BudgetError::ForeignRecord(format!(
                    "Category {}",
                    category.name
                )));
            }
            if !names.insert(category.name.to_lowercase()) {
                return Err(BudgetError::DuplicateCategoryName(category.name.clone()));
            }
            if let Some(amount) = category.period_amount {
                validate_amount(&category.name, amount)?;
            }
            if category.amortization_mode == AmortizationMode::Custom {
                validate_custom(category)?;
            }
        }

        Ok(())
    }

    fn validate_entries(&self) -> Result<(), BudgetError> {
        let mut seen = HashSet::new();

        for entry in &self.entries {
            validate_year(entry.year)?;
            let Some(category) = self.category(entry.category_id) else {
                return Err(BudgetError::CategoryNotFound(entry.category_id));
            };
            let name = format!("Entry {} {}/{}", category.name, entry.year, entry.month);
            validate_amount(&name, entry.planned_amount)?;
            if let Some(actual) = entry.actual_amount {
                validate_amount(&name, actual)?;
            }
            if !seen.insert((entry.category_id, entry.month, entry.year)) {
                return Err(BudgetError::DuplicateEntry {
                    category_id: entry.category_id,
                    month: entry.month,
                    year: entry.year,
                });
            }
        }

        Ok(())
    }

    fn validate_rates(&self) -> Result<(), BudgetError> {
        for rule in &self.tax_rules {
            if rule.budget_id != self.budget.id {
                return Err(BudgetError::ForeignRecord(format!("Tax rule {}", rule.name)));
            }
            validate_percentage(&rule.name, rule.percentage)?;
        }

        for deduction in &self.deductions {
            if deduction.budget_id != self.budget.id {
                return Err(BudgetError::ForeignRecord(format!(
                    "Deduction {}",
                    deduction.name
                )));
            }
            match deduction.deduction_type {
                DeductionType::Percentage => validate_percentage(&deduction.name, deduction.value)?,
                DeductionType::Fixed => validate_amount(&deduction.name, deduction.value)?,
            }
        }

        Ok(())
    }

    fn validate_actual_balances(&self) -> Result<(), BudgetError> {
        let mut seen = HashSet::new();

        for balance in &self.actual_balances {
            if balance.budget_id != self.budget.id {
                return Err(BudgetError::ForeignRecord(format!(
                    "Actual balance {}/{}",
                    balance.year, balance.month
                )));
            }
            validate_year(balance.year)?;
            let name = format!("Actual balance {}/{}", balance.year, balance.month);
            validate_amount(&name, balance.actual_income)?;
            validate_amount(&name, balance.actual_expenses)?;
            if !seen.insert((balance.month, balance.year)) {
                return Err(BudgetError::DuplicateActualBalance {
                    month: balance.month,
                    year: balance.year,
                });
            }
        }

        Ok(())
    }
}

fn validate_year(year: i32) -> Result<(), BudgetError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(BudgetError::InvalidYear(year))
    }
}

fn validate_custom(category: &Category) -> Result<(), BudgetError> {
    match category.custom_installment_count {
        Some(count) if (1..=MONTHS_PER_YEAR).contains(&count) => {}
        _ => {
            return Err(BudgetError::InvalidInstallmentCount {
                category: category.name.clone(),
            });
        }
    }

    if let Some(month) = category.custom_start_month {
        if !(1..=MONTHS_PER_YEAR).contains(&month) {
            return Err(BudgetError::InvalidStartMonth {
                category: category.name.clone(),
                month,
            });
        }
    }

    Ok(())
}

fn validate_amount(name: &str, value: Decimal) -> Result<(), BudgetError> {
    if value < Decimal::ZERO {
        return Err(BudgetError::NegativeAmount {
            name: name.to_string(),
        });
    }
    if value >= MAX_AMOUNT || value.normalize().scale() > AMOUNT_SCALE {
        return Err(BudgetError::AmountOutOfRange {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

fn validate_percentage(name: &str, value: Decimal) -> Result<(), BudgetError> {
    if value < Decimal::ZERO
        || value > Decimal::ONE_HUNDRED
        || value.normalize().scale() > AMOUNT_SCALE
    {
        return Err(BudgetError::InvalidPercentage {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::types::{
        ActualBalance, Budget, CategoryKind, Entry, Month, SalaryDeduction, TaxRule,
    };
    use haushalt_shared::types::{
        ActualBalanceId, BudgetId, CategoryId, Currency, DeductionId, EntryId, TaxRuleId,
    };
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn snapshot() -> BudgetSnapshot {
        BudgetSnapshot {
            budget: Budget {
                id: BudgetId::new(),
                name: "Household".to_string(),
                currency: Some(Currency::Chf),
            },
            year: 2025,
            categories: vec![],
            entries: vec![],
            tax_rules: vec![],
            deductions: vec![],
            actual_balances: vec![],
        }
    }

    fn category(snapshot: &BudgetSnapshot, name: &str, mode: AmortizationMode) -> Category {
        Category {
            id: CategoryId::new(),
            budget_id: snapshot.budget.id,
            name: name.to_string(),
            kind: CategoryKind::FixedExpense,
            amortization_mode: mode,
            custom_installment_count: None,
            custom_start_month: None,
            period_amount: None,
            order: 0,
            is_active: true,
            is_payroll_source: false,
        }
    }

    #[rstest]
    #[case("250", dec!(250))]
    #[case(" 1200.50 ", dec!(1200.50))]
    #[case("-10", dec!(-10))]
    fn test_parse_amount_accepts_decimals(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount("value", raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("12,50")]
    #[case("NaN")]
    fn test_parse_amount_rejects_garbage(#[case] raw: &str) {
        let err = parse_amount("period_amount", raw).unwrap_err();
        assert!(matches!(err, BudgetError::Parse { ref field, .. } if field == "period_amount"));
    }

    #[test]
    fn test_empty_snapshot_is_valid() {
        assert!(snapshot().validate().is_ok());
    }

    #[test]
    fn test_year_out_of_range() {
        let mut s = snapshot();
        s.year = 1999;
        assert!(matches!(s.validate(), Err(BudgetError::InvalidYear(1999))));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(0))]
    #[case(Some(13))]
    fn test_custom_requires_installment_count(#[case] count: Option<u8>) {
        let mut s = snapshot();
        let mut c = category(&s, "Insurance", AmortizationMode::Custom);
        c.custom_installment_count = count;
        s.categories.push(c);

        assert!(matches!(
            s.validate(),
            Err(BudgetError::InvalidInstallmentCount { .. })
        ));
    }

    #[test]
    fn test_custom_start_month_range() {
        let mut s = snapshot();
        let mut c = category(&s, "Insurance", AmortizationMode::Custom);
        c.custom_installment_count = Some(4);
        c.custom_start_month = Some(0);
        s.categories.push(c);

        assert!(matches!(
            s.validate(),
            Err(BudgetError::InvalidStartMonth { month: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_category_names_case_insensitive() {
        let mut s = snapshot();
        let a = category(&s, "Rent", AmortizationMode::Monthly);
        let b = category(&s, "rent", AmortizationMode::Monthly);
        s.categories.extend([a, b]);

        assert!(matches!(
            s.validate(),
            Err(BudgetError::DuplicateCategoryName(_))
        ));
    }

    #[test]
    fn test_entry_must_reference_known_category() {
        let mut s = snapshot();
        let missing = CategoryId::new();
        s.entries.push(Entry {
            id: EntryId::new(),
            category_id: missing,
            month: Month::new(1).unwrap(),
            year: 2025,
            planned_amount: dec!(10),
            actual_amount: None,
            notes: None,
        });

        let err = s.validate().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut s = snapshot();
        let c = category(&s, "Food", AmortizationMode::Monthly);
        let entry = Entry {
            id: EntryId::new(),
            category_id: c.id,
            month: Month::new(5).unwrap(),
            year: 2025,
            planned_amount: dec!(600),
            actual_amount: None,
            notes: None,
        };
        let mut twin = entry.clone();
        twin.id = EntryId::new();
        s.categories.push(c);
        s.entries.extend([entry, twin]);

        assert!(matches!(s.validate(), Err(BudgetError::DuplicateEntry { .. })));
    }

    #[rstest]
    #[case(dec!(-1))]
    #[case(dec!(100.01))]
    #[case(dec!(7.125))]
    fn test_tax_percentage_range(#[case] percentage: Decimal) {
        let mut s = snapshot();
        s.tax_rules.push(TaxRule {
            id: TaxRuleId::new(),
            budget_id: s.budget.id,
            name: "Income tax".to_string(),
            percentage,
            is_active: true,
            order: 0,
        });

        assert!(matches!(
            s.validate(),
            Err(BudgetError::InvalidPercentage { .. })
        ));
    }

    #[test]
    fn test_negative_fixed_deduction_rejected() {
        let mut s = snapshot();
        s.deductions.push(SalaryDeduction {
            id: DeductionId::new(),
            budget_id: s.budget.id,
            name: "Pension".to_string(),
            deduction_type: DeductionType::Fixed,
            value: dec!(-50),
            is_active: true,
            order: 0,
        });

        assert!(matches!(
            s.validate(),
            Err(BudgetError::NegativeAmount { .. })
        ));
    }

    fn entry(category_id: CategoryId, planned: Decimal, actual: Option<Decimal>) -> Entry {
        Entry {
            id: EntryId::new(),
            category_id,
            month: Month::new(3).unwrap(),
            year: 2025,
            planned_amount: planned,
            actual_amount: actual,
            notes: None,
        }
    }

    #[rstest]
    #[case(dec!(0), None)]
    #[case(dec!(99999999.99), Some(dec!(0)))]
    #[case(dec!(12.50), Some(dec!(12.500)))]
    fn test_entry_amounts_within_range(#[case] planned: Decimal, #[case] actual: Option<Decimal>) {
        let mut s = snapshot();
        let c = category(&s, "Food", AmortizationMode::Monthly);
        s.entries.push(entry(c.id, planned, actual));
        s.categories.push(c);

        assert!(s.validate().is_ok());
    }

    #[rstest]
    #[case(dec!(100000000), None)]
    #[case(dec!(70000000000000000000000000000), None)]
    #[case(dec!(0.0000000000000000000000000001), Some(dec!(1000)))]
    #[case(dec!(10), Some(dec!(0.001)))]
    fn test_entry_amounts_out_of_range(#[case] planned: Decimal, #[case] actual: Option<Decimal>) {
        let mut s = snapshot();
        let c = category(&s, "Food", AmortizationMode::Monthly);
        s.entries.push(entry(c.id, planned, actual));
        s.categories.push(c);

        assert!(matches!(
            s.validate(),
            Err(BudgetError::AmountOutOfRange { .. })
        ));
    }

    #[rstest]
    #[case(dec!(-0.01), None)]
    #[case(dec!(100), Some(dec!(-5)))]
    fn test_negative_entry_amounts_rejected(
        #[case] planned: Decimal,
        #[case] actual: Option<Decimal>,
    ) {
        let mut s = snapshot();
        let c = category(&s, "Food", AmortizationMode::Monthly);
        s.entries.push(entry(c.id, planned, actual));
        s.categories.push(c);

        assert!(matches!(
            s.validate(),
            Err(BudgetError::NegativeAmount { .. })
        ));
    }

    #[rstest]
    #[case(dec!(-1))]
    #[case(dec!(123456789))]
    #[case(dec!(99.999))]
    fn test_period_amount_bounds(#[case] amount: Decimal) {
        let mut s = snapshot();
        let mut c = category(&s, "Insurance", AmortizationMode::Yearly);
        c.period_amount = Some(amount);
        s.categories.push(c);

        assert!(matches!(
            s.validate(),
            Err(BudgetError::NegativeAmount { .. } | BudgetError::AmountOutOfRange { .. })
        ));
    }

    #[rstest]
    #[case(dec!(-100), dec!(0))]
    #[case(dec!(0), dec!(-0.5))]
    #[case(dec!(100000000), dec!(0))]
    fn test_actual_balance_bounds(#[case] income: Decimal, #[case] expenses: Decimal) {
        let mut s = snapshot();
        s.actual_balances.push(ActualBalance {
            id: ActualBalanceId::new(),
            budget_id: s.budget.id,
            month: Month::new(1).unwrap(),
            year: 2025,
            actual_income: income,
            actual_expenses: expenses,
        });

        assert!(matches!(
            s.validate(),
            Err(BudgetError::NegativeAmount { .. } | BudgetError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn test_fixed_deduction_out_of_range() {
        let mut s = snapshot();
        s.deductions.push(SalaryDeduction {
            id: DeductionId::new(),
            budget_id: s.budget.id,
            name: "Pension".to_string(),
            deduction_type: DeductionType::Fixed,
            value: dec!(250.005),
            is_active: true,
            order: 0,
        });

        assert!(matches!(
            s.validate(),
            Err(BudgetError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn test_foreign_tax_rule_rejected() {
        let mut s = snapshot();
        s.tax_rules.push(TaxRule {
            id: TaxRuleId::new(),
            budget_id: BudgetId::new(),
            name: "Church tax".to_string(),
            percentage: dec!(1),
            is_active: true,
            order: 0,
        });

        assert!(matches!(s.validate(), Err(BudgetError::ForeignRecord(_))));
    }

    #[test]
    fn test_multiple_payroll_flags_rejected() {
        let mut s = snapshot();
        for name in ["Salary", "Bonus"] {
            let mut c = category(&s, name, AmortizationMode::Yearly);
            c.kind = CategoryKind::Income;
            c.is_payroll_source = true;
            s.categories.push(c);
        }

        assert!(matches!(
            s.validate(),
            Err(BudgetError::MultiplePayrollSources)
        ));
    }

    #[test]
    fn test_payroll_flag_on_expense_rejected() {
        let mut s = snapshot();
        let mut c = category(&s, "Rent", AmortizationMode::Monthly);
        c.is_payroll_source = true;
        s.categories.push(c);

        assert!(matches!(
            s.validate(),
            Err(BudgetError::PayrollSourceNotIncome(_))
        ));
    }
}
