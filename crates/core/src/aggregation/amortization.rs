//! Installment schedules for CUSTOM categories.

use std::collections::BTreeSet;

use crate::budget::{Category, MONTHS_PER_YEAR, Month};

/// Months in which a CUSTOM category is paid.
///
/// Installment `i` of `n` falls on `start + round(i * 12 / n)`, rounded half
/// up and wrapped into the year. For `n` in 1..=12 the months are distinct,
/// so a schedule always has exactly `n` months.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallmentSchedule {
    months: BTreeSet<Month>,
}

impl InstallmentSchedule {
    /// Builds a schedule from an installment count and start month.
    ///
    /// A missing or out-of-range count yields an empty schedule. A missing
    /// or out-of-range start month means January.
    #[must_use]
    pub fn new(installments: Option<u8>, start_month: Option<u8>) -> Self {
        let count = match installments {
            Some(count) if (1..=MONTHS_PER_YEAR).contains(&count) => u32::from(count),
            _ => return Self::default(),
        };
        let start = start_month
            .and_then(|m| Month::new(m).ok())
            .map_or(1, |m| u32::from(m.number()));
        let year = u32::from(MONTHS_PER_YEAR);

        let months = (0..count)
            .map(|i| {
                // round(i * 12 / count), half up, in integers
                let offset = (2 * i * year + count) / (2 * count);
                Month::wrapping(start + offset)
            })
            .collect();

        Self { months }
    }

    /// Schedule of a category's CUSTOM settings.
    #[must_use]
    pub fn for_category(category: &Category) -> Self {
        Self::new(
            category.custom_installment_count,
            category.custom_start_month,
        )
    }

    /// Returns true if `month` carries an installment.
    #[must_use]
    pub fn contains(&self, month: Month) -> bool {
        self.months.contains(&month)
    }

    /// Number of installments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Returns true if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Installment months in calendar order.
    pub fn months(&self) -> impl Iterator<Item = Month> + '_ {
        self.months.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn numbers(schedule: &InstallmentSchedule) -> Vec<u8> {
        schedule.months().map(Month::number).collect()
    }

    #[rstest]
    #[case(4, 1, vec![1, 4, 7, 10])]
    #[case(2, 3, vec![3, 9])]
    #[case(1, 6, vec![6])]
    #[case(12, 1, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12])]
    #[case(5, 1, vec![1, 3, 6, 8, 11])]
    #[case(8, 1, vec![1, 3, 4, 6, 7, 9, 10, 12])]
    #[case(4, 11, vec![2, 5, 8, 11])]
    fn test_installment_months(#[case] count: u8, #[case] start: u8, #[case] expected: Vec<u8>) {
        let schedule = InstallmentSchedule::new(Some(count), Some(start));
        assert_eq!(numbers(&schedule), expected);
        assert_eq!(schedule.len(), usize::from(count));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(0))]
    #[case(Some(13))]
    fn test_unusable_count_schedules_nothing(#[case] count: Option<u8>) {
        assert!(InstallmentSchedule::new(count, Some(1)).is_empty());
    }

    #[test]
    fn test_missing_start_month_means_january() {
        let schedule = InstallmentSchedule::new(Some(3), None);
        assert_eq!(numbers(&schedule), vec![1, 5, 9]);
    }
}
