//! Plain-text output.

use rust_decimal::Decimal;

use haushalt_core::aggregation::{
    CategoryOverview, LineGroup, MonthlySummary, PayrollBreakdown, YearlySummary,
};
use haushalt_core::budget::Month;
use haushalt_shared::types::{Currency, Money};

const LABEL_WIDTH: usize = 18;
const AMOUNT_WIDTH: usize = 11;

pub fn yearly(summary: &YearlySummary, decimal_places: u32) {
    let currency = summary.currency;
    println!("{} {} ({currency})", summary.budget_name, summary.year);
    println!();

    let mut header = format!("{:<LABEL_WIDTH$}", "");
    for month in Month::all() {
        header.push_str(&format!("{:>AMOUNT_WIDTH$}", month.abbreviation()));
    }
    header.push_str(&format!("{:>AMOUNT_WIDTH$}", "Total"));
    println!("{header}");

    for group in LineGroup::ALL {
        let lines: Vec<_> = summary.lines.iter().filter(|l| l.group == group).collect();
        if lines.is_empty() {
            continue;
        }
        println!("{}", group.label());
        for line in lines {
            println!(
                "{}",
                row(&format!("  {}", line.label), &line.monthly, line.total, decimal_places)
            );
        }
    }

    let balances: Vec<Decimal> = summary.months.iter().map(|m| m.planned.balance).collect();
    println!(
        "{}",
        row("Balance", &balances, summary.planned.balance, decimal_places)
    );
    println!();

    println!("Planned income:   {}", money(summary.planned.income, currency, decimal_places));
    println!("Planned expenses: {}", money(summary.planned.expenses, currency, decimal_places));
    println!("Planned balance:  {}", money(summary.planned.balance, currency, decimal_places));
    if let (Some(actual), Some(delta)) = (summary.actual, summary.delta) {
        println!("Actual balance:   {}", money(actual.balance, currency, decimal_places));
        println!("Delta:            {}", money(delta, currency, decimal_places));
    }
}

pub fn month(summary: &MonthlySummary, currency: Currency, decimal_places: u32) {
    println!("Month {}", summary.month);
    println!("  Income:   {}", money(summary.planned.income, currency, decimal_places));
    println!("  Expenses: {}", money(summary.planned.expenses, currency, decimal_places));
    println!("  Balance:  {}", money(summary.planned.balance, currency, decimal_places));
    println!();
    payroll(&summary.payroll, currency, decimal_places);
    if let (Some(actual), Some(delta)) = (summary.actual, summary.delta) {
        println!();
        println!("  Actual income:   {}", money(actual.income, currency, decimal_places));
        println!("  Actual expenses: {}", money(actual.expenses, currency, decimal_places));
        println!("  Delta:           {}", money(delta, currency, decimal_places));
    }
}

pub fn category(overview: &CategoryOverview, currency: Currency, decimal_places: u32) {
    println!(
        "{} ({:?}, {:?})",
        overview.name, overview.kind, overview.amortization_mode
    );
    for month in &overview.months {
        let actual = month.actual.map_or_else(
            || "-".to_string(),
            |a| amount(a, decimal_places),
        );
        println!(
            "  {}  {:>AMOUNT_WIDTH$}  {:>AMOUNT_WIDTH$}  {:?}",
            month.month.abbreviation(),
            amount(month.planned, decimal_places),
            actual,
            month.status
        );
    }
    println!("  Planned: {}", money(overview.planned_total, currency, decimal_places));
    println!("  Actual:  {}", money(overview.actual_total, currency, decimal_places));
}

pub fn payroll(payroll: &PayrollBreakdown, currency: Currency, decimal_places: u32) {
    println!("  Gross salary: {}", money(payroll.gross, currency, decimal_places));
    println!("  Deductions:   {}", money(payroll.deductions, currency, decimal_places));
    println!("  Net salary:   {}", money(payroll.net, currency, decimal_places));
    println!("  Taxes:        {}", money(payroll.taxes, currency, decimal_places));
}

fn row(label: &str, monthly: &[Decimal], total: Decimal, decimal_places: u32) -> String {
    let mut out = format!("{label:<LABEL_WIDTH$}");
    for value in monthly.iter().chain(std::iter::once(&total)) {
        out.push_str(&format!("{:>AMOUNT_WIDTH$}", amount(*value, decimal_places)));
    }
    out
}

fn amount(value: Decimal, decimal_places: u32) -> String {
    let rounded = Money::new(value, Currency::default()).round_dp(decimal_places).amount;
    format!("{rounded:.prec$}", prec = decimal_places as usize)
}

fn money(value: Decimal, currency: Currency, decimal_places: u32) -> String {
    Money::new(value, currency).round_dp(decimal_places).to_string()
}
