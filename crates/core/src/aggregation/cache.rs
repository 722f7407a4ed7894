//! Yearly summary caching using Moka.
//!
//! Summaries are recomputed whenever the snapshot they were built from
//! changes. Writers call [`SummaryCache::invalidate_budget`] after saving a
//! record so stale entries are dropped immediately.
//!
//! The cache owns the [`SummaryService`] that fills it, so every cached
//! summary was built with the same planner settings.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use haushalt_shared::config::{CacheConfig, PlannerConfig};
use haushalt_shared::types::BudgetId;
use moka::sync::Cache;
use tracing::{debug, warn};

use super::service::SummaryService;
use super::types::YearlySummary;
use crate::budget::{BudgetError, BudgetSnapshot};

type CacheKey = (BudgetId, i32);

/// A summary returned from the cache.
#[derive(Debug, Clone)]
pub struct CachedSummary {
    /// The yearly summary.
    pub summary: Arc<YearlySummary>,
    /// True if the summary was served without recomputation.
    pub cached: bool,
}

/// Cache for yearly summaries, keyed by budget and year.
///
/// Thread-safe and suitable for concurrent access.
#[derive(Clone)]
pub struct SummaryCache {
    cache: Cache<CacheKey, (u64, Arc<YearlySummary>)>,
    service: SummaryService,
}

impl SummaryCache {
    /// Creates a summary cache from configuration.
    #[must_use]
    pub fn new(cache: &CacheConfig, planner: &PlannerConfig) -> Self {
        Self::with_config(
            SummaryService::from_config(planner),
            cache.max_capacity,
            cache.ttl_secs,
        )
    }

    /// Creates a summary cache around `service` with custom limits.
    #[must_use]
    pub fn with_config(service: SummaryService, max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .support_invalidation_closures()
            .build();

        Self { cache, service }
    }

    /// The service used to compute summaries.
    #[must_use]
    pub const fn service(&self) -> &SummaryService {
        &self.service
    }

    /// Returns the summary of `snapshot`, computing it if needed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`SummaryService::yearly_summary`]; failures
    /// are not cached.
    pub fn get_or_compute(&self, snapshot: &BudgetSnapshot) -> Result<CachedSummary, BudgetError> {
        let key = (snapshot.budget.id, snapshot.year);
        let fingerprint = fingerprint(snapshot);

        if let Some((cached_fingerprint, summary)) = self.cache.get(&key) {
            if cached_fingerprint == fingerprint {
                debug!(budget_id = %key.0, year = key.1, "Summary cache hit");
                return Ok(CachedSummary {
                    summary,
                    cached: true,
                });
            }
            debug!(budget_id = %key.0, year = key.1, "Snapshot changed, recomputing summary");
        }

        let summary = Arc::new(self.service.yearly_summary(snapshot)?);
        self.cache.insert(key, (fingerprint, Arc::clone(&summary)));

        Ok(CachedSummary {
            summary,
            cached: false,
        })
    }

    /// Drops every cached year of a budget.
    pub fn invalidate_budget(&self, budget_id: BudgetId) {
        if let Err(err) = self
            .cache
            .invalidate_entries_if(move |key, _| key.0 == budget_id)
        {
            warn!(%budget_id, error = %err, "Selective invalidation failed, clearing cache");
            self.cache.invalidate_all();
        }
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Runs cache maintenance tasks.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default(), &PlannerConfig::default())
    }
}

fn fingerprint(snapshot: &BudgetSnapshot) -> u64 {
    let mut hasher = DefaultHasher::new();
    snapshot.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{
        AmortizationMode, Budget, Category, CategoryKind, DeductionType, SalaryDeduction,
    };
    use haushalt_shared::types::{CategoryId, Currency, DeductionId};
    use rust_decimal_macros::dec;

    fn budget_snapshot() -> BudgetSnapshot {
        let budget_id = BudgetId::new();
        BudgetSnapshot {
            budget: Budget {
                id: budget_id,
                name: "Household".to_string(),
                currency: Some(Currency::Chf),
            },
            year: 2025,
            categories: vec![Category {
                id: CategoryId::new(),
                budget_id,
                name: "Salary".to_string(),
                kind: CategoryKind::Income,
                amortization_mode: AmortizationMode::Yearly,
                custom_installment_count: None,
                custom_start_month: None,
                period_amount: Some(dec!(120000)),
                order: 0,
                is_active: true,
                is_payroll_source: true,
            }],
            entries: vec![],
            tax_rules: vec![],
            deductions: vec![],
            actual_balances: vec![],
        }
    }

    #[test]
    fn test_second_lookup_is_cached() {
        let cache = SummaryCache::default();
        let snapshot = budget_snapshot();

        let first = cache.get_or_compute(&snapshot).unwrap();
        let second = cache.get_or_compute(&snapshot).unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.summary, second.summary);
    }

    #[test]
    fn test_changed_snapshot_is_recomputed() {
        let cache = SummaryCache::default();
        let mut snapshot = budget_snapshot();

        cache.get_or_compute(&snapshot).unwrap();
        snapshot.categories[0].period_amount = Some(dec!(132000));
        let result = cache.get_or_compute(&snapshot).unwrap();

        assert!(!result.cached);
        assert_eq!(result.summary.planned.income, dec!(132000));
    }

    #[test]
    fn test_invalidate_budget() {
        let cache = SummaryCache::default();
        let snapshot = budget_snapshot();
        let other = budget_snapshot();

        cache.get_or_compute(&snapshot).unwrap();
        cache.get_or_compute(&other).unwrap();
        cache.invalidate_budget(snapshot.budget.id);

        assert!(!cache.get_or_compute(&snapshot).unwrap().cached);
        assert!(cache.get_or_compute(&other).unwrap().cached);
    }

    #[test]
    fn test_invalidate_all() {
        let cache = SummaryCache::with_config(SummaryService::default(), 10, 60);
        let snapshot = budget_snapshot();

        cache.get_or_compute(&snapshot).unwrap();
        cache.invalidate_all();

        assert!(!cache.get_or_compute(&snapshot).unwrap().cached);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = SummaryCache::default();
        let mut snapshot = budget_snapshot();
        let mut second = snapshot.categories[0].clone();
        second.id = CategoryId::new();
        second.name = "Bonus".to_string();
        snapshot.categories.push(second);

        assert!(cache.get_or_compute(&snapshot).is_err());
        cache.run_pending_tasks();
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn test_planner_settings_shape_cached_summaries() {
        let mut snapshot = budget_snapshot();
        snapshot.categories[0].is_payroll_source = false;
        snapshot.categories[0].name = "Lohn".to_string();
        snapshot.deductions.push(SalaryDeduction {
            id: DeductionId::new(),
            budget_id: snapshot.budget.id,
            name: "Pension fund".to_string(),
            deduction_type: DeductionType::Percentage,
            value: dec!(10),
            is_active: true,
            order: 0,
        });

        let by_salary = SummaryCache::default();
        let by_lohn = SummaryCache::new(
            &CacheConfig::default(),
            &PlannerConfig {
                payroll_keyword: "lohn".to_string(),
                ..PlannerConfig::default()
            },
        );

        let gross = by_salary.get_or_compute(&snapshot).unwrap();
        let net = by_lohn.get_or_compute(&snapshot).unwrap();

        assert!(!net.cached);
        assert_eq!(gross.summary.planned.income, dec!(120000));
        assert_eq!(net.summary.planned.income, dec!(108000));
        let payroll = by_lohn
            .service()
            .aggregator()
            .payroll_category(&snapshot.categories)
            .unwrap();
        assert_eq!(payroll.map(|c| c.name.as_str()), Some("Lohn"));
    }
}
