//! Recovery-rate estimation: nested cure buckets, the disjoint default
//! bucket, and the empty-population contract.

use chrono::{Duration, NaiveDate};
use creditrisk_core::{
    model::{Customer, Loan, LoanStatus, PaymentRecord, PaymentStatus},
    recovery::{recovery_rates, RecoveryParams},
    snapshot::PortfolioSnapshot,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn base_entities() -> (Vec<Customer>, Vec<Loan>) {
    (
        vec![Customer {
            customer_id: 1,
            acquired_on: d(2023, 1, 10),
            credit_score: 650,
            income: 40_000.0,
            employment_type: "salaried".into(),
        }],
        vec![Loan {
            loan_id: 1,
            customer_id: 1,
            principal: 10_000.0,
            interest_rate: 9.5,
            status: LoanStatus::Approved,
            monthly_installment: 350.0,
            applied_on: d(2023, 1, 10),
        }],
    )
}

/// A payment due on `due`, cured `days_late` days later (None = never).
fn cured(id: u64, due: NaiveDate, days_late: Option<i64>) -> PaymentRecord {
    let status = match days_late {
        Some(days) if days <= 30 => PaymentStatus::Late,
        _ => PaymentStatus::Missed,
    };
    PaymentRecord {
        payment_id: id,
        loan_id: 1,
        due_on: due,
        paid_on: days_late.map(|days| due + Duration::days(days)),
        amount_paid: if days_late.is_some() { 350.0 } else { 0.0 },
        status,
        days_past_due: days_late.unwrap_or(120).max(0) as u32,
    }
}

fn on_time(id: u64, due: NaiveDate) -> PaymentRecord {
    PaymentRecord {
        payment_id: id,
        loan_id: 1,
        due_on: due,
        paid_on: Some(due),
        amount_paid: 350.0,
        status: PaymentStatus::OnTime,
        days_past_due: 0,
    }
}

fn run(payments: Vec<PaymentRecord>, as_of: NaiveDate) -> creditrisk_core::recovery::RecoveryReport {
    let (customers, loans) = base_entities();
    let snap = PortfolioSnapshot::build(customers, loans, payments).unwrap();
    recovery_rates(&snap, as_of, &RecoveryParams::default())
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Cured in 5 days: inside both the 7-day and 30-day buckets — the
/// buckets are cumulative, not exclusive.
#[test]
fn fast_cure_counts_in_both_buckets() {
    let report = run(vec![cured(1, d(2024, 1, 5), Some(5))], d(2024, 6, 1));

    assert_eq!(report.missed_total, 1);
    assert_eq!(report.recovered_fast, 1);
    assert_eq!(report.recovered_slow, 1);
    assert_eq!(report.defaulted, 0);
    assert_eq!(report.recovered_fast_pct, Some(100.0));
    assert_eq!(report.recovered_slow_pct, Some(100.0));
}

/// Never paid, 120 days past due: defaulted only.
#[test]
fn stale_unpaid_is_defaulted_only() {
    let report = run(vec![cured(1, d(2024, 1, 5), None)], d(2024, 5, 5));

    assert_eq!(report.missed_total, 1);
    assert_eq!(report.recovered_fast, 0);
    assert_eq!(report.recovered_slow, 0);
    assert_eq!(report.defaulted, 1);
    assert_eq!(report.default_rate_pct, Some(100.0));
}

/// Cured after the default cutoff: counted as defaulted, not recovered.
#[test]
fn late_cure_beyond_default_cutoff_is_defaulted() {
    let report = run(vec![cured(1, d(2024, 1, 5), Some(100))], d(2024, 6, 1));

    assert_eq!(report.recovered_fast, 0);
    assert_eq!(report.recovered_slow, 0);
    assert_eq!(report.defaulted, 1);
}

/// Cured in 20 days: slow bucket only.
#[test]
fn mid_cure_counts_in_slow_bucket_only() {
    let report = run(vec![cured(1, d(2024, 1, 5), Some(20))], d(2024, 6, 1));

    assert_eq!(report.recovered_fast, 0);
    assert_eq!(report.recovered_slow, 1);
    assert_eq!(report.defaulted, 0);
}

/// Fast recovery can never exceed slow recovery — the nesting invariant.
#[test]
fn nesting_invariant_holds() {
    let payments = vec![
        cured(1, d(2024, 1, 5), Some(3)),
        cured(2, d(2024, 1, 5), Some(12)),
        cured(3, d(2024, 1, 5), Some(28)),
        cured(4, d(2024, 1, 5), Some(95)),
        cured(5, d(2024, 1, 5), None),
    ];
    let report = run(payments, d(2024, 6, 1));

    assert!(report.recovered_fast <= report.recovered_slow);
    assert!(report.recovered_fast_pct.unwrap() <= report.recovered_slow_pct.unwrap());
    // With a consistently honored 90-day cutoff, cures within 90 days
    // (the 3-, 12-, and 28-day payments) plus defaults cover everything.
    assert_eq!(report.defaulted, 2);
    assert_eq!(report.missed_total - report.defaulted, 3);
}

/// On-time and early payments never enter the missed population.
#[test]
fn on_time_payments_excluded() {
    let payments = vec![on_time(1, d(2024, 1, 5)), cured(2, d(2024, 2, 5), Some(10))];
    let report = run(payments, d(2024, 6, 1));

    assert_eq!(report.missed_total, 1);
}

/// Only payments already due enter the population; due-today is not
/// "in the past".
#[test]
fn due_on_cutoff_day_excluded() {
    let payments = vec![cured(1, d(2024, 6, 1), None), cured(2, d(2024, 1, 5), Some(10))];
    let report = run(payments, d(2024, 6, 1));

    assert_eq!(report.missed_total, 1);
}

/// A payment date after the cutoff has not happened yet from the
/// analysis's point of view: the record counts as not-yet-recovered.
#[test]
fn cure_after_cutoff_reads_as_unpaid() {
    // Due in January, cured in May — but analyzed as of February.
    let report = run(vec![cured(1, d(2024, 1, 5), Some(120))], d(2024, 2, 20));

    assert_eq!(report.missed_total, 1);
    assert_eq!(report.recovered_slow, 0);
    assert_eq!(report.defaulted, 1);
}

/// No missed payments at all: counts zero, percentages undefined, no
/// divide-by-zero and no error.
#[test]
fn empty_population_is_well_defined() {
    let report = run(vec![on_time(1, d(2024, 1, 5))], d(2024, 6, 1));

    assert_eq!(report.missed_total, 0);
    assert_eq!(report.recovered_fast, 0);
    assert_eq!(report.defaulted, 0);
    assert_eq!(report.recovered_fast_pct, None);
    assert_eq!(report.recovered_slow_pct, None);
    assert_eq!(report.default_rate_pct, None);
}
