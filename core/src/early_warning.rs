//! Early-warning detector — the "slipping customer" pattern.
//!
//! A fixed-shape match over each customer's most recent due payments:
//! a clean on-time streak broken by the single most recent payment.
//! Exactly one transition point is recognized; this is not a general
//! trend detector.
//!
//! Customers with fewer ranked payments than the window are skipped and
//! counted as not-evaluated — insufficient history must never read as a
//! negative classification.

use crate::{
    model::PaymentStatus,
    sequencer,
    snapshot::PortfolioSnapshot,
    types::CustomerId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DETERIORATING_FLAG: &str = "Deteriorating";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EarlyWarningParams {
    /// Number of most-recent-due payments inspected. Rank 1 must break a
    /// streak of on-time ranks 2..=window.
    pub window: u32,
}

impl Default for EarlyWarningParams {
    fn default() -> Self {
        Self { window: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlippingCustomer {
    pub customer_id: CustomerId,
    pub credit_score: i32,
    pub employment_type: String,
    /// Status of the rank-1 (most recent due) payment.
    pub current_status: PaymentStatus,
    pub flag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlippingReport {
    pub as_of: NaiveDate,
    /// Ordered by credit score descending.
    pub flagged: Vec<SlippingCustomer>,
    pub evaluated: u64,
    pub skipped_insufficient_history: u64,
}

pub fn early_warnings(
    snapshot: &PortfolioSnapshot,
    as_of: NaiveDate,
    params: &EarlyWarningParams,
) -> SlippingReport {
    let window = params.window as usize;
    let mut flagged = Vec::new();
    let mut evaluated = 0u64;
    let mut skipped = 0u64;

    for customer in snapshot.customers() {
        let payments = snapshot.payments_for(customer.customer_id);
        let recent = sequencer::latest_n(&payments, as_of, window);

        if recent.len() < window {
            skipped += 1;
            continue;
        }
        evaluated += 1;

        let streak_clean = recent[1..]
            .iter()
            .all(|r| r.record.status == PaymentStatus::OnTime);
        let broke = matches!(
            recent[0].record.status,
            PaymentStatus::Late | PaymentStatus::Missed
        );

        if streak_clean && broke {
            flagged.push(SlippingCustomer {
                customer_id: customer.customer_id,
                credit_score: customer.credit_score,
                employment_type: customer.employment_type.clone(),
                current_status: recent[0].record.status,
                flag: DETERIORATING_FLAG.to_string(),
            });
        }
    }

    flagged.sort_by(|a, b| {
        b.credit_score
            .cmp(&a.credit_score)
            .then(a.customer_id.cmp(&b.customer_id))
    });

    SlippingReport {
        as_of,
        flagged,
        evaluated,
        skipped_insufficient_history: skipped,
    }
}
