//! Planned vs. actual status of a single entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BudgetError;
use super::types::CategoryKind;

/// Entry status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    /// Income reached its target, or an expense stayed well under plan.
    WithinBudget,
    /// Close to the limit.
    Warning,
    /// Income fell short, or an expense overran the plan.
    OverBudget,
}

impl EntryStatus {
    /// Classifies an entry from its planned and actual amount.
    ///
    /// Utilization is `actual / planned * 100`. For income higher is better,
    /// for every other kind lower is better; `warning_threshold` (e.g. 90)
    /// separates the warning band from the comfortable one.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Computation` if the utilization overflows.
    pub fn evaluate(
        kind: CategoryKind,
        planned: Decimal,
        actual: Option<Decimal>,
        warning_threshold: Decimal,
    ) -> Result<Self, BudgetError> {
        let actual = match actual {
            Some(actual) if !actual.is_zero() => actual,
            _ => return Ok(Self::WithinBudget),
        };

        if planned.is_zero() {
            return Ok(if actual > Decimal::ZERO {
                Self::OverBudget
            } else {
                Self::WithinBudget
            });
        }

        let utilization = actual
            .checked_div(planned)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(BudgetError::Computation("utilization"))?;

        let status = if kind.is_income() {
            if utilization >= Decimal::ONE_HUNDRED {
                Self::WithinBudget
            } else if utilization >= warning_threshold {
                Self::Warning
            } else {
                Self::OverBudget
            }
        } else if utilization <= warning_threshold {
            Self::WithinBudget
        } else if utilization <= Decimal::ONE_HUNDRED {
            Self::Warning
        } else {
            Self::OverBudget
        };

        Ok(status)
    }
}
