//! Budget aggregation and summaries.
//!
//! Pure calculations over a [`BudgetSnapshot`](crate::budget::BudgetSnapshot):
//! - Monthly contribution of a category under its amortization mode
//! - Gross and net salary, deductions and taxes
//! - Monthly and yearly income/expense totals
//! - Planned vs. actual comparison

pub mod aggregator;
pub mod amortization;
pub mod cache;
pub mod service;
pub mod types;


pub use aggregator::BudgetAggregator;
pub use amortization::InstallmentSchedule;
pub use cache::{CachedSummary, SummaryCache};
pub use service::SummaryService;
pub use types::{
    CategoryMonth, CategoryOverview, Contribution, LineGroup, LineSource, MonthContributions,
    MonthlySummary, PayrollBreakdown, Period, PlannedVsActual, SummaryLine, Totals, YearlySummary,
};
