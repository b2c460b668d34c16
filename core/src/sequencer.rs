//! Ordered payment sequencing — the ranking substrate shared by the
//! early-warning detector and any "latest N payments" view.
//!
//! RULE: Ordering is fully deterministic. Equal due dates break ties by
//! payment id ascending, never by source collection order.

use crate::model::PaymentRecord;
use chrono::NaiveDate;

/// A payment annotated with its 1-based recency rank.
/// Rank 1 is the most recent payment due at or before the cutoff.
#[derive(Debug, Clone)]
pub struct RankedPayment<'a> {
    pub rank:   u32,
    pub record: &'a PaymentRecord,
}

/// Rank one customer's payments by due date descending.
///
/// Records due after `as_of` are excluded before ranking — future-dated
/// obligations never participate in historical metrics.
pub fn rank_payments<'a>(
    payments: &[&'a PaymentRecord],
    as_of: NaiveDate,
) -> Vec<RankedPayment<'a>> {
    let mut eligible: Vec<&PaymentRecord> = payments
        .iter()
        .copied()
        .filter(|p| p.due_on <= as_of)
        .collect();

    eligible.sort_by(|a, b| {
        b.due_on
            .cmp(&a.due_on)
            .then(a.payment_id.cmp(&b.payment_id))
    });

    eligible
        .into_iter()
        .enumerate()
        .map(|(i, record)| RankedPayment {
            rank: i as u32 + 1,
            record,
        })
        .collect()
}

/// The `n` most recently due payments at or before `as_of`.
pub fn latest_n<'a>(
    payments: &[&'a PaymentRecord],
    as_of: NaiveDate,
    n: usize,
) -> Vec<RankedPayment<'a>> {
    let mut ranked = rank_payments(payments, as_of);
    ranked.truncate(n);
    ranked
}
