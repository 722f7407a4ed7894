//! Twelve-month CSV table.
//!
//! Layout: a header `Category, Jan .. Dec, Total`, then one block per line
//! group (income, fixed costs, variable costs, savings, taxes), each opened
//! by a label row. Groups without lines are left out. The last row holds
//! the planned balance per month and for the year.

use std::io::Write;

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::ExportError;
use crate::aggregation::{LineGroup, YearlySummary};
use crate::budget::Month;

/// Label of the closing balance row.
pub const BALANCE_LABEL: &str = "BALANCE";

const FIELDS: usize = 14;

/// Writes `summary` as a CSV table, amounts rounded to `decimal_places`.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_yearly_csv<W: Write>(
    summary: &YearlySummary,
    decimal_places: u32,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut header = Vec::with_capacity(FIELDS);
    header.push("Category".to_string());
    header.extend(Month::all().map(|m| m.abbreviation().to_string()));
    header.push("Total".to_string());
    csv.write_record(&header)?;

    for group in LineGroup::ALL {
        let mut lines = summary.lines.iter().filter(|l| l.group == group).peekable();
        if lines.peek().is_none() {
            continue;
        }

        let mut label_row = vec![String::new(); FIELDS];
        label_row[0] = group.label().to_string();
        csv.write_record(&label_row)?;

        for line in lines {
            let mut row = Vec::with_capacity(FIELDS);
            row.push(line.label.clone());
            row.extend(line.monthly.iter().map(|a| format_amount(*a, decimal_places)));
            row.push(format_amount(line.total, decimal_places));
            csv.write_record(&row)?;
        }
    }

    let mut balance_row = Vec::with_capacity(FIELDS);
    balance_row.push(BALANCE_LABEL.to_string());
    balance_row.extend(
        summary
            .months
            .iter()
            .map(|m| format_amount(m.planned.balance, decimal_places)),
    );
    balance_row.push(format_amount(summary.planned.balance, decimal_places));
    csv.write_record(&balance_row)?;

    csv.flush()?;
    Ok(())
}

fn format_amount(amount: Decimal, decimal_places: u32) -> String {
    let rounded =
        amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = decimal_places as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{LineSource, MonthlySummary, PayrollBreakdown, SummaryLine, Totals};
    use haushalt_shared::types::{BudgetId, CategoryId, Currency, TaxRuleId};
    use rust_decimal_macros::dec;

    fn line(label: &str, group: LineGroup, monthly: Decimal) -> SummaryLine {
        let source = if group == LineGroup::Tax {
            LineSource::Tax(TaxRuleId::new())
        } else {
            LineSource::Category(CategoryId::new())
        };
        SummaryLine {
            source,
            label: label.to_string(),
            group,
            monthly: vec![monthly; 12],
            total: monthly * dec!(12),
        }
    }

    fn summary() -> YearlySummary {
        let monthly_totals = Totals::new(dec!(4500), dec!(2133.335)).unwrap();
        YearlySummary {
            budget_id: BudgetId::new(),
            budget_name: "Household".to_string(),
            currency: Currency::Chf,
            year: 2025,
            months: Month::all()
                .map(|month| MonthlySummary {
                    month,
                    planned: monthly_totals,
                    payroll: PayrollBreakdown::default(),
                    actual: None,
                    delta: None,
                })
                .collect(),
            lines: vec![
                line("Salary", LineGroup::Income, dec!(4500)),
                line("Rent", LineGroup::FixedExpense, dec!(1800)),
                line("Phone", LineGroup::FixedExpense, dec!(33.335)),
                line("Income tax", LineGroup::Tax, dec!(300)),
            ],
            planned: Totals::new(dec!(54000), dec!(25600.02)).unwrap(),
            actual: None,
            delta: None,
        }
    }

    fn export(summary: &YearlySummary, decimal_places: u32) -> Vec<String> {
        let mut out = Vec::new();
        write_yearly_csv(summary, decimal_places, &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_header() {
        let rows = export(&summary(), 2);
        assert_eq!(
            rows[0],
            "Category,Jan,Feb,Mar,Apr,May,Jun,Jul,Aug,Sep,Oct,Nov,Dec,Total"
        );
    }

    #[test]
    fn test_groups_skip_empty_blocks() {
        let rows = export(&summary(), 2);
        let labels: Vec<&str> = rows
            .iter()
            .map(|r| r.split(',').next().unwrap_or_default())
            .collect();

        assert_eq!(
            labels,
            [
                "Category",
                "Income",
                "Salary",
                "Fixed costs",
                "Rent",
                "Phone",
                "Taxes",
                "Income tax",
                BALANCE_LABEL,
            ]
        );
        assert_eq!(rows[1], format!("Income{}", ",".repeat(13)));
    }

    #[test]
    fn test_every_row_has_fourteen_fields() {
        let rows = export(&summary(), 2);
        assert!(rows.iter().all(|r| r.split(',').count() == FIELDS));
    }

    #[test]
    fn test_amounts_are_rounded() {
        let rows = export(&summary(), 2);

        let phone = rows.iter().find(|r| r.starts_with("Phone")).unwrap();
        assert!(phone.starts_with("Phone,33.34,33.34,"));
        assert!(phone.ends_with(",400.02"));

        let balance = rows.last().unwrap();
        assert!(balance.starts_with("BALANCE,2366.67,"));
        assert!(balance.ends_with(",28399.98"));
    }

    #[test]
    fn test_whole_units() {
        let rows = export(&summary(), 0);
        let salary = rows.iter().find(|r| r.starts_with("Salary")).unwrap();
        assert!(salary.ends_with(",54000"));
    }
}
