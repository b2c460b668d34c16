//! Recovery-rate estimation — cure-time distribution for payments that
//! missed their due date.
//!
//! The fast and slow recovery buckets are cumulative and nested (a
//! payment cured in 5 days counts in both); the defaulted bucket is
//! disjoint from both by construction. All three percentages share one
//! denominator: the full missed population. They are not a partition
//! and must not be renormalized into one.

use crate::snapshot::PortfolioSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryParams {
    pub fast_cutoff_days:    i64,
    pub slow_cutoff_days:    i64,
    /// Past this many days unpaid (or cured later than this), a missed
    /// payment counts as defaulted.
    pub default_cutoff_days: i64,
}

impl Default for RecoveryParams {
    fn default() -> Self {
        Self {
            fast_cutoff_days: 7,
            slow_cutoff_days: 30,
            default_cutoff_days: 90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub as_of: NaiveDate,
    pub fast_cutoff_days:    i64,
    pub slow_cutoff_days:    i64,
    pub default_cutoff_days: i64,

    /// Payments due before `as_of` that were paid late or not at all.
    pub missed_total:   u64,
    pub recovered_fast: u64,
    pub recovered_slow: u64,
    pub defaulted:      u64,

    /// Percentages over `missed_total`, 1 decimal; None when the missed
    /// population is empty.
    pub recovered_fast_pct: Option<f64>,
    pub recovered_slow_pct: Option<f64>,
    pub default_rate_pct:   Option<f64>,
}

pub fn recovery_rates(
    snapshot: &PortfolioSnapshot,
    as_of: NaiveDate,
    params: &RecoveryParams,
) -> RecoveryReport {
    let mut missed_total = 0u64;
    let mut recovered_fast = 0u64;
    let mut recovered_slow = 0u64;
    let mut defaulted = 0u64;

    for payment in snapshot.payments() {
        if payment.due_on >= as_of {
            continue;
        }
        // A payment date after the cutoff has not happened yet from the
        // analysis's point of view.
        let paid_on = payment.paid_on.filter(|p| *p <= as_of);
        let days_to_pay = match paid_on {
            Some(p) if p > payment.due_on => Some((p - payment.due_on).num_days()),
            Some(_) => continue, // paid on time or early
            None => None,        // not yet recovered
        };

        missed_total += 1;
        match days_to_pay {
            Some(days) => {
                if days <= params.fast_cutoff_days {
                    recovered_fast += 1;
                }
                if days <= params.slow_cutoff_days {
                    recovered_slow += 1;
                }
                if days > params.default_cutoff_days {
                    defaulted += 1;
                }
            }
            None => defaulted += 1,
        }
    }

    let pct = |n: u64| {
        if missed_total > 0 {
            Some(round1(100.0 * n as f64 / missed_total as f64))
        } else {
            None
        }
    };

    RecoveryReport {
        as_of,
        fast_cutoff_days: params.fast_cutoff_days,
        slow_cutoff_days: params.slow_cutoff_days,
        default_cutoff_days: params.default_cutoff_days,
        missed_total,
        recovered_fast,
        recovered_slow,
        defaulted,
        recovered_fast_pct: pct(recovered_fast),
        recovered_slow_pct: pct(recovered_slow),
        default_rate_pct: pct(defaulted),
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
