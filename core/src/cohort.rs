//! Cohort retention — vintage analysis over acquisition-month cohorts.
//!
//! This component:
//!   1. Buckets each customer into the calendar month they were acquired
//!   2. Converts each payment into "whole months since acquisition"
//!   3. Folds per (cohort month, month offset) into success-rate cells
//!
//! A payment is "successful" for retention purposes when it was on time
//! or inside the grace period. Cells only exist where at least one record
//! fell, so the success-rate division is never over zero.

use crate::snapshot::PortfolioSnapshot;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortParams {
    /// Maximum month offset kept; payments beyond it are discarded.
    pub lookback_months: i32,
    /// Lateness up to this many days still counts as a successful payment.
    pub grace_days: i64,
}

impl Default for CohortParams {
    fn default() -> Self {
        Self {
            lookback_months: 24,
            grace_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortCell {
    /// First day of the acquisition month.
    pub cohort_month: NaiveDate,
    pub months_since_acquisition: i32,
    pub due_count: u64,
    pub successful_count: u64,
    pub success_rate_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortReport {
    pub as_of: NaiveDate,
    /// Ordered cohort month descending, then month offset ascending.
    pub cells: Vec<CohortCell>,
}

/// Whole calendar months elapsed from `from` to `to`. Negative when `to`
/// precedes `from`. A month only counts once the day-of-month is reached.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let raw = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        raw - 1
    } else {
        raw
    }
}

/// Truncate a date to the first day of its month.
pub fn month_bucket(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 exists in every month")
}

pub fn cohort_retention(
    snapshot: &PortfolioSnapshot,
    as_of: NaiveDate,
    params: &CohortParams,
) -> CohortReport {
    // (cohort month, month offset) -> (due, successful)
    let mut groups: BTreeMap<(NaiveDate, i32), (u64, u64)> = BTreeMap::new();

    for customer in snapshot.customers() {
        let cohort = month_bucket(customer.acquired_on);

        for payment in snapshot.payments_for(customer.customer_id) {
            if payment.due_on > as_of {
                continue;
            }
            let offset = months_between(customer.acquired_on, payment.due_on);
            if offset < 0 || offset > params.lookback_months {
                continue;
            }

            let successful = payment.status == crate::model::PaymentStatus::OnTime
                || payment.days_past_due as i64 <= params.grace_days;

            let entry = groups.entry((cohort, offset)).or_insert((0, 0));
            entry.0 += 1;
            if successful {
                entry.1 += 1;
            }
        }
    }

    let mut cells: Vec<CohortCell> = groups
        .into_iter()
        .map(|((cohort_month, offset), (due, successful))| CohortCell {
            cohort_month,
            months_since_acquisition: offset,
            due_count: due,
            successful_count: successful,
            success_rate_pct: round2(100.0 * successful as f64 / due as f64),
        })
        .collect();

    cells.sort_by(|a, b| {
        b.cohort_month
            .cmp(&a.cohort_month)
            .then(a.months_since_acquisition.cmp(&b.months_since_acquisition))
    });

    CohortReport { as_of, cells }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
