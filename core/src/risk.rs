//! Risk classification — per-customer behaviour stats mapped to an
//! ordered tier through a rule tree.
//!
//! This component:
//!   1. Folds each customer's due payments into summary stats
//!   2. Walks an ordered (predicate, tier) list, first match wins
//!   3. Aggregates tier membership into portfolio-level summaries
//!
//! RULE: The tree mirrors tiered underwriting policy, not a lookup
//! table. Ties resolve by rule order. Rule 3 deliberately uses OR: a
//! customer with at most two missed payments lands in Subprime even
//! when their average delay is high. Preserved as written.

use crate::{
    model::PaymentStatus,
    snapshot::PortfolioSnapshot,
    types::CustomerId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Per-customer stats ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPaymentStats {
    pub customer_id: CustomerId,
    pub total_due:   u32,
    pub late:        u32,
    pub missed:      u32,
    /// Mean days-past-due over delayed records only; 0.0 when none.
    pub avg_days_past_due: f64,
    pub max_days_past_due: u32,
    /// None = the customer has never missed a payment.
    pub days_since_last_miss: Option<i64>,
}

/// Fold one customer's payments (due at or before `as_of`) into stats.
/// Returns None when the customer has no due history — such customers
/// are not classified, matching the source join semantics.
pub fn payment_stats(
    customer_id: CustomerId,
    payments: &[&crate::model::PaymentRecord],
    as_of: NaiveDate,
) -> Option<CustomerPaymentStats> {
    let mut total = 0u32;
    let mut late = 0u32;
    let mut missed = 0u32;
    let mut delayed_sum = 0u64;
    let mut delayed_count = 0u32;
    let mut max_dpd = 0u32;
    let mut last_miss: Option<NaiveDate> = None;

    for p in payments {
        if p.due_on > as_of {
            continue;
        }
        total += 1;
        match p.status {
            PaymentStatus::OnTime => {}
            PaymentStatus::Late => late += 1,
            PaymentStatus::Missed => {
                missed += 1;
                last_miss = Some(last_miss.map_or(p.due_on, |d| d.max(p.due_on)));
            }
        }
        if p.days_past_due > 0 {
            delayed_sum += p.days_past_due as u64;
            delayed_count += 1;
        }
        max_dpd = max_dpd.max(p.days_past_due);
    }

    if total == 0 {
        return None;
    }

    let avg = if delayed_count > 0 {
        delayed_sum as f64 / delayed_count as f64
    } else {
        0.0
    };

    Some(CustomerPaymentStats {
        customer_id,
        total_due: total,
        late,
        missed,
        avg_days_past_due: avg,
        max_days_past_due: max_dpd,
        days_since_last_miss: last_miss.map(|d| (as_of - d).num_days()),
    })
}

// ── Tier rule tree ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Prime,
    Standard,
    Subprime,
    HighRisk,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Prime,
        RiskTier::Standard,
        RiskTier::Subprime,
        RiskTier::HighRisk,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Prime    => "Prime",
            Self::Standard => "Standard",
            Self::Subprime => "Subprime",
            Self::HighRisk => "High Risk",
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::Prime    => 1,
            Self::Standard => 2,
            Self::Subprime => 3,
            Self::HighRisk => 4,
        }
    }
}

type TierRule = (fn(&CustomerPaymentStats) -> bool, RiskTier);

/// Ordered rule tree, evaluated top-down. The fallthrough is HighRisk.
fn rule_tree() -> [TierRule; 3] {
    [
        (|s| s.missed == 0 && s.late == 0, RiskTier::Prime),
        (|s| s.missed == 0 && s.avg_days_past_due <= 7.0, RiskTier::Standard),
        (|s| s.missed <= 2 || s.avg_days_past_due <= 30.0, RiskTier::Subprime),
    ]
}

pub fn classify(stats: &CustomerPaymentStats) -> RiskTier {
    for (applies, tier) in rule_tree() {
        if applies(stats) {
            return tier;
        }
    }
    RiskTier::HighRisk
}

// ── Portfolio aggregation ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSummary {
    pub tier: RiskTier,
    pub customer_count: u64,
    pub avg_credit_score: f64,
    pub avg_income: f64,
    /// Share of classified customers, rounded to 2 decimals.
    pub portfolio_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskTierReport {
    pub as_of: NaiveDate,
    /// Always all four tiers, Prime first.
    pub tiers: Vec<TierSummary>,
    pub classified: u64,
    /// Customers with no due payment history; never classified.
    pub unclassified: u64,
}

pub fn risk_tiers(snapshot: &PortfolioSnapshot, as_of: NaiveDate) -> RiskTierReport {
    let mut counts = [0u64; 4];
    let mut score_sums = [0f64; 4];
    let mut income_sums = [0f64; 4];
    let mut unclassified = 0u64;

    for customer in snapshot.customers() {
        let payments = snapshot.payments_for(customer.customer_id);
        match payment_stats(customer.customer_id, &payments, as_of) {
            Some(stats) => {
                let slot = classify(&stats).number() as usize - 1;
                counts[slot] += 1;
                score_sums[slot] += customer.credit_score as f64;
                income_sums[slot] += customer.income;
            }
            None => unclassified += 1,
        }
    }

    let classified: u64 = counts.iter().sum();
    let tiers = RiskTier::ALL
        .iter()
        .map(|&tier| {
            let slot = tier.number() as usize - 1;
            let n = counts[slot];
            TierSummary {
                tier,
                customer_count: n,
                avg_credit_score: if n > 0 { score_sums[slot] / n as f64 } else { 0.0 },
                avg_income: if n > 0 { income_sums[slot] / n as f64 } else { 0.0 },
                portfolio_pct: if classified > 0 {
                    round2(100.0 * n as f64 / classified as f64)
                } else {
                    0.0
                },
            }
        })
        .collect();

    RiskTierReport {
        as_of,
        tiers,
        classified,
        unclassified,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
