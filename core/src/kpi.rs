//! KPI aggregation — flat summary records for reporting collaborators.
//!
//! Pure composition: portfolio totals and the distribution slices here,
//! plus the four analytical reports, merged under one as-of date. No
//! analytics of its own beyond counting and averaging.

use crate::{
    cohort::CohortReport,
    early_warning::SlippingReport,
    model::{LoanStatus, PaymentStatus},
    recovery::RecoveryReport,
    risk::RiskTierReport,
    snapshot::PortfolioSnapshot,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Portfolio totals ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub total_customers: u64,
    pub approved_loans: u64,
    /// Sum of principal over approved loans.
    pub total_portfolio_value: f64,
    /// Payments collected in the as-of month, up to and including as-of.
    pub mtd_payment_count: u64,
    pub mtd_revenue: f64,
    pub on_time_rate_pct: f64,
    pub avg_days_past_due: f64,
    pub max_days_past_due: u32,
}

pub fn portfolio_totals(snapshot: &PortfolioSnapshot, as_of: NaiveDate) -> PortfolioTotals {
    let approved: Vec<_> = snapshot
        .loans()
        .iter()
        .filter(|l| l.status == LoanStatus::Approved)
        .collect();

    let month_start = crate::cohort::month_bucket(as_of);
    let mut mtd_count = 0u64;
    let mut mtd_revenue = 0.0;
    let mut due_count = 0u64;
    let mut on_time = 0u64;
    let mut dpd_sum = 0u64;
    let mut dpd_max = 0u32;

    for p in snapshot.payments() {
        if let Some(paid) = p.paid_on {
            if paid >= month_start && paid <= as_of {
                mtd_count += 1;
                mtd_revenue += p.amount_paid;
            }
        }
        if p.due_on <= as_of {
            due_count += 1;
            if p.status == PaymentStatus::OnTime {
                on_time += 1;
            }
            dpd_sum += p.days_past_due as u64;
            dpd_max = dpd_max.max(p.days_past_due);
        }
    }

    PortfolioTotals {
        total_customers: snapshot.customers().len() as u64,
        approved_loans: approved.len() as u64,
        total_portfolio_value: approved.iter().map(|l| l.principal).sum(),
        mtd_payment_count: mtd_count,
        mtd_revenue,
        on_time_rate_pct: if due_count > 0 {
            round2(100.0 * on_time as f64 / due_count as f64)
        } else {
            0.0
        },
        avg_days_past_due: if due_count > 0 {
            round1(dpd_sum as f64 / due_count as f64)
        } else {
            0.0
        },
        max_days_past_due: dpd_max,
    }
}

// ── Distribution slices ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusShare {
    pub status: PaymentStatus,
    pub count: u64,
    pub share_pct: f64,
}

/// Payment status distribution over payments due at or before as-of.
pub fn payment_mix(snapshot: &PortfolioSnapshot, as_of: NaiveDate) -> Vec<StatusShare> {
    let mut counts: BTreeMap<&'static str, (PaymentStatus, u64)> = BTreeMap::new();
    let mut total = 0u64;

    for p in snapshot.payments() {
        if p.due_on > as_of {
            continue;
        }
        total += 1;
        counts.entry(p.status.as_str()).or_insert((p.status, 0)).1 += 1;
    }

    let mut shares: Vec<StatusShare> = counts
        .into_values()
        .map(|(status, count)| StatusShare {
            status,
            count,
            share_pct: round2(100.0 * count as f64 / total as f64),
        })
        .collect();

    shares.sort_by(|a, b| b.count.cmp(&a.count).then(a.status.as_str().cmp(b.status.as_str())));
    shares
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentSlice {
    pub employment_type: String,
    pub customer_count: u64,
    pub avg_income: f64,
    pub avg_credit_score: f64,
}

/// Customer mix by employment category, largest group first.
pub fn employment_mix(snapshot: &PortfolioSnapshot) -> Vec<EmploymentSlice> {
    let mut groups: BTreeMap<&str, (u64, f64, f64)> = BTreeMap::new();

    for c in snapshot.customers() {
        let entry = groups.entry(c.employment_type.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += c.income;
        entry.2 += c.credit_score as f64;
    }

    let mut slices: Vec<EmploymentSlice> = groups
        .into_iter()
        .map(|(name, (n, income_sum, score_sum))| EmploymentSlice {
            employment_type: name.to_string(),
            customer_count: n,
            avg_income: income_sum / n as f64,
            avg_credit_score: score_sum / n as f64,
        })
        .collect();

    slices.sort_by(|a, b| {
        b.customer_count
            .cmp(&a.customer_count)
            .then(a.employment_type.cmp(&b.employment_type))
    });
    slices
}

// ── Daily activity ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyActivityParams {
    /// Trailing window, in days, ending at as-of.
    pub window_days: i64,
}

impl Default for DailyActivityParams {
    fn default() -> Self {
        Self { window_days: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyActivityRow {
    pub day: NaiveDate,
    pub payment_count: u64,
    pub on_time_count: u64,
    pub revenue: f64,
}

/// Per-day collection activity over the trailing window, most recent
/// day first. Days with no payments are absent, not zero-filled.
pub fn daily_activity(
    snapshot: &PortfolioSnapshot,
    as_of: NaiveDate,
    params: &DailyActivityParams,
) -> Vec<DailyActivityRow> {
    let window_start = as_of - chrono::Duration::days(params.window_days);
    let mut days: BTreeMap<NaiveDate, (u64, u64, f64)> = BTreeMap::new();

    for p in snapshot.payments() {
        let Some(paid) = p.paid_on else { continue };
        if paid < window_start || paid > as_of {
            continue;
        }
        let entry = days.entry(paid).or_insert((0, 0, 0.0));
        entry.0 += 1;
        if p.status == PaymentStatus::OnTime {
            entry.1 += 1;
        }
        entry.2 += p.amount_paid;
    }

    days.into_iter()
        .rev()
        .map(|(day, (count, on_time, revenue))| DailyActivityRow {
            day,
            payment_count: count,
            on_time_count: on_time,
            revenue,
        })
        .collect()
}

// ── Composition ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiReport {
    pub as_of: NaiveDate,
    pub portfolio: PortfolioTotals,
    pub payment_mix: Vec<StatusShare>,
    pub employment_mix: Vec<EmploymentSlice>,
    pub cohorts: CohortReport,
    pub risk: RiskTierReport,
    pub slipping: SlippingReport,
    pub recovery: RecoveryReport,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
