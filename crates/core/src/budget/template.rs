//! Budget templates for quickly seeding categories.

use std::collections::HashSet;

use haushalt_shared::types::{BudgetId, CategoryId};
use serde::{Deserialize, Serialize};

use super::types::{AmortizationMode, Category, CategoryKind};

/// A reusable set of category definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetTemplate {
    /// Template name.
    pub name: String,
    /// Category definitions.
    #[serde(default)]
    pub categories: Vec<TemplateCategory>,
}

/// One category definition inside a template. Templates carry no amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateCategory {
    /// Category name.
    pub name: String,
    /// Category kind.
    pub kind: CategoryKind,
    /// Sort order.
    #[serde(default)]
    pub order: i32,
    /// Distribution mode.
    #[serde(default)]
    pub amortization_mode: AmortizationMode,
    /// Installment count for CUSTOM mode.
    #[serde(default)]
    pub custom_installment_count: Option<u8>,
    /// First installment month for CUSTOM mode.
    #[serde(default)]
    pub custom_start_month: Option<u8>,
}

impl BudgetTemplate {
    /// Builds the categories this template adds to a budget.
    ///
    /// Names already present in `existing` (case-sensitive, as stored) are
    /// skipped, so applying a template twice adds nothing the second time.
    #[must_use]
    pub fn apply(&self, budget_id: BudgetId, existing: &[Category]) -> Vec<Category> {
        let mut taken: HashSet<&str> = existing
            .iter()
            .filter(|c| c.budget_id == budget_id)
            .map(|c| c.name.as_str())
            .collect();

        let mut created = Vec::new();
        for row in &self.categories {
            if !taken.insert(row.name.as_str()) {
                continue;
            }
            created.push(Category {
                id: CategoryId::new(),
                budget_id,
                name: row.name.clone(),
                kind: row.kind,
                amortization_mode: row.amortization_mode,
                custom_installment_count: row.custom_installment_count,
                custom_start_month: row.custom_start_month,
                period_amount: None,
                order: row.order,
                is_active: true,
                is_payroll_source: false,
            });
        }

        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> BudgetTemplate {
        BudgetTemplate {
            name: "Basic".to_string(),
            categories: vec![
                TemplateCategory {
                    name: "Salary".to_string(),
                    kind: CategoryKind::Income,
                    order: 1,
                    amortization_mode: AmortizationMode::Yearly,
                    custom_installment_count: None,
                    custom_start_month: None,
                },
                TemplateCategory {
                    name: "Rent".to_string(),
                    kind: CategoryKind::FixedExpense,
                    order: 2,
                    amortization_mode: AmortizationMode::Monthly,
                    custom_installment_count: None,
                    custom_start_month: None,
                },
                TemplateCategory {
                    name: "Car insurance".to_string(),
                    kind: CategoryKind::FixedExpense,
                    order: 3,
                    amortization_mode: AmortizationMode::Custom,
                    custom_installment_count: Some(2),
                    custom_start_month: Some(3),
                },
            ],
        }
    }

    #[test]
    fn test_apply_creates_all_categories() {
        let budget_id = BudgetId::new();
        let created = template().apply(budget_id, &[]);

        assert_eq!(created.len(), 3);
        assert!(created.iter().all(|c| c.budget_id == budget_id));
        assert!(created.iter().all(|c| c.period_amount.is_none()));
        assert_eq!(created[2].custom_installment_count, Some(2));
        assert_eq!(created[2].custom_start_month, Some(3));
    }

    #[test]
    fn test_apply_skips_existing_names() {
        let budget_id = BudgetId::new();
        let first = template().apply(budget_id, &[]);
        let rent_only: Vec<Category> = first.into_iter().filter(|c| c.name == "Rent").collect();

        let created = template().apply(budget_id, &rent_only);

        let names: Vec<&str> = created.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Salary", "Car insurance"]);
    }

    #[test]
    fn test_apply_twice_adds_nothing() {
        let budget_id = BudgetId::new();
        let first = template().apply(budget_id, &[]);
        assert!(template().apply(budget_id, &first).is_empty());
    }

    #[test]
    fn test_other_budgets_do_not_block_names() {
        let other = template().apply(BudgetId::new(), &[]);
        assert_eq!(template().apply(BudgetId::new(), &other).len(), 3);
    }
}
