//! Early-warning detector: the fixed-shape slipping pattern over the
//! four most recent due payments.

use chrono::NaiveDate;
use creditrisk_core::{
    early_warning::{early_warnings, EarlyWarningParams, DETERIORATING_FLAG},
    model::{Customer, Loan, LoanStatus, PaymentRecord, PaymentStatus},
    snapshot::PortfolioSnapshot,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn customer(id: u64, score: i32) -> Customer {
    Customer {
        customer_id: id,
        acquired_on: d(2023, 1, 10),
        credit_score: score,
        income: 40_000.0,
        employment_type: "salaried".into(),
    }
}

fn loan(id: u64, customer_id: u64) -> Loan {
    Loan {
        loan_id: id,
        customer_id,
        principal: 10_000.0,
        interest_rate: 9.5,
        status: LoanStatus::Approved,
        monthly_installment: 350.0,
        applied_on: d(2023, 1, 10),
    }
}

fn payment(id: u64, loan_id: u64, due: NaiveDate, status: PaymentStatus) -> PaymentRecord {
    let dpd = match status {
        PaymentStatus::OnTime => 0,
        PaymentStatus::Late => 10,
        PaymentStatus::Missed => 45,
    };
    PaymentRecord {
        payment_id: id,
        loan_id,
        due_on: due,
        paid_on: Some(due + chrono::Duration::days(dpd as i64)),
        amount_paid: 350.0,
        status,
        days_past_due: dpd,
    }
}

/// One customer whose history is `statuses` in due-date order
/// (oldest first). Most recent due payment comes last.
fn snapshot_with_history(statuses: &[PaymentStatus]) -> PortfolioSnapshot {
    let payments: Vec<PaymentRecord> = statuses
        .iter()
        .enumerate()
        .map(|(i, status)| payment(i as u64 + 1, 1, d(2024, 1 + i as u32, 5), *status))
        .collect();
    PortfolioSnapshot::build(vec![customer(1, 700)], vec![loan(1, 1)], payments).unwrap()
}

fn run(snapshot: &PortfolioSnapshot) -> creditrisk_core::early_warning::SlippingReport {
    early_warnings(snapshot, d(2024, 12, 31), &EarlyWarningParams::default())
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Three on-time payments followed by a late one is the slipping shape.
#[test]
fn streak_broken_by_latest_flags() {
    let snap = snapshot_with_history(&[
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::Late,
    ]);

    let report = run(&snap);
    assert_eq!(report.flagged.len(), 1);
    let hit = &report.flagged[0];
    assert_eq!(hit.customer_id, 1);
    assert_eq!(hit.current_status, PaymentStatus::Late);
    assert_eq!(hit.flag, DETERIORATING_FLAG);
}

/// A missed most-recent payment also breaks the streak.
#[test]
fn missed_latest_also_flags() {
    let snap = snapshot_with_history(&[
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::Missed,
    ]);

    let report = run(&snap);
    assert_eq!(report.flagged.len(), 1);
    assert_eq!(report.flagged[0].current_status, PaymentStatus::Missed);
}

/// A late payment in the middle of the window is not the pattern —
/// only the most recent payment may break the streak.
#[test]
fn late_in_middle_not_flagged() {
    let snap = snapshot_with_history(&[
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::Late,
        PaymentStatus::OnTime,
    ]);

    let report = run(&snap);
    assert!(report.flagged.is_empty());
    assert_eq!(report.evaluated, 1);
}

/// Fewer than four ranked payments: the customer is skipped, recorded in
/// the metadata, and never classified false.
#[test]
fn insufficient_history_skips_not_flags() {
    let snap = snapshot_with_history(&[
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::Late,
    ]);

    let report = run(&snap);
    assert!(report.flagged.is_empty());
    assert_eq!(report.evaluated, 0);
    assert_eq!(report.skipped_insufficient_history, 1);
}

/// History older than the window is invisible: a miss five payments ago
/// does not stop the current streak-break from flagging.
#[test]
fn window_ignores_older_history() {
    let snap = snapshot_with_history(&[
        PaymentStatus::Missed,
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::Late,
    ]);

    let report = run(&snap);
    assert_eq!(report.flagged.len(), 1);
}

/// Payments due after the cutoff cannot be the rank-1 break.
#[test]
fn cutoff_excludes_future_break() {
    let snap = snapshot_with_history(&[
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::OnTime,
        PaymentStatus::Late, // due 2024-05-05, after the cutoff below
    ]);

    let report = early_warnings(&snap, d(2024, 4, 30), &EarlyWarningParams::default());
    assert!(report.flagged.is_empty(), "streak is clean as of the cutoff");
    assert_eq!(report.evaluated, 1);
}

/// Flagged customers come back credit score descending.
#[test]
fn flagged_ordered_by_credit_score() {
    let customers = vec![customer(1, 620), customer(2, 750), customer(3, 690)];
    let loans = vec![loan(1, 1), loan(2, 2), loan(3, 3)];
    let mut payments = Vec::new();
    let mut id = 1u64;
    for loan_id in 1..=3u64 {
        for (i, status) in [
            PaymentStatus::OnTime,
            PaymentStatus::OnTime,
            PaymentStatus::OnTime,
            PaymentStatus::Late,
        ]
        .iter()
        .enumerate()
        {
            payments.push(payment(id, loan_id, d(2024, 1 + i as u32, 5), *status));
            id += 1;
        }
    }
    let snap = PortfolioSnapshot::build(customers, loans, payments).unwrap();

    let report = run(&snap);
    let scores: Vec<i32> = report.flagged.iter().map(|f| f.credit_score).collect();
    assert_eq!(scores, vec![750, 690, 620]);
}

/// The window length is tunable; a window of 2 flags on a single
/// on-time payment followed by a late one.
#[test]
fn window_length_is_tunable() {
    let snap = snapshot_with_history(&[PaymentStatus::OnTime, PaymentStatus::Late]);

    let report = early_warnings(&snap, d(2024, 12, 31), &EarlyWarningParams { window: 2 });
    assert_eq!(report.flagged.len(), 1);
}
