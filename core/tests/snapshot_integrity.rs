//! Fail-loud contracts: referential integrity at snapshot build, and
//! date-range/tunable validation at the engine entry points.

use chrono::NaiveDate;
use creditrisk_core::{
    cohort::CohortParams,
    config::AnalyticsConfig,
    early_warning::EarlyWarningParams,
    engine::AnalyticsEngine,
    error::EngineError,
    model::{Customer, Loan, LoanStatus, PaymentRecord, PaymentStatus},
    recovery::RecoveryParams,
    snapshot::PortfolioSnapshot,
    store::EntityStore,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn customer(id: u64) -> Customer {
    Customer {
        customer_id: id,
        acquired_on: d(2023, 1, 10),
        credit_score: 680,
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

fn payment(id: u64, loan_id: u64, due: NaiveDate) -> PaymentRecord {
    PaymentRecord {
        payment_id: id,
        loan_id,
        due_on: due,
        paid_on: Some(due),
        amount_paid: 350.0,
        status: PaymentStatus::OnTime,
        days_past_due: 0,
    }
}

fn seeded_engine() -> AnalyticsEngine {
    let store = EntityStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.insert_customer(&customer(1)).unwrap();
    store.insert_loan(&loan(1, 1)).unwrap();
    store.insert_payment(&payment(1, 1, d(2024, 2, 5))).unwrap();
    AnalyticsEngine::new(store, AnalyticsConfig::default())
}

// ── Referential integrity ────────────────────────────────────────────────────

/// A loan pointing at a missing customer aborts the snapshot build.
#[test]
fn orphan_loan_fails_loud() {
    let result = PortfolioSnapshot::build(vec![customer(1)], vec![loan(1, 99)], Vec::new());

    match result {
        Err(EngineError::ReferentialIntegrity { entity, id, .. }) => {
            assert_eq!(entity, "loan");
            assert_eq!(id, 1);
        }
        other => panic!("expected ReferentialIntegrity, got {other:?}"),
    }
}

/// A payment pointing at a missing loan aborts the snapshot build.
#[test]
fn orphan_payment_fails_loud() {
    let result = PortfolioSnapshot::build(
        vec![customer(1)],
        vec![loan(1, 1)],
        vec![payment(1, 42, d(2024, 2, 5))],
    );

    match result {
        Err(EngineError::ReferentialIntegrity { entity, id, .. }) => {
            assert_eq!(entity, "payment");
            assert_eq!(id, 1);
        }
        other => panic!("expected ReferentialIntegrity, got {other:?}"),
    }
}

/// A consistent set of entities builds and exposes the join indexes.
#[test]
fn consistent_snapshot_builds_indexes() {
    let snap = PortfolioSnapshot::build(
        vec![customer(1)],
        vec![loan(1, 1), loan(2, 1)],
        vec![payment(1, 1, d(2024, 2, 5)), payment(2, 2, d(2024, 3, 5))],
    )
    .unwrap();

    assert_eq!(snap.owner_of_loan(2), Some(1));
    // Payments aggregate across both of the customer's loans.
    assert_eq!(snap.payments_for(1).len(), 2);
    assert_eq!(snap.earliest_activity(), Some(d(2023, 1, 10)));
}

// ── Entry-point validation ───────────────────────────────────────────────────

/// An as-of date earlier than any data fails before any per-customer work.
#[test]
fn as_of_before_all_data_fails_fast() {
    let result = seeded_engine().risk_tiers(d(1990, 1, 1));
    assert!(matches!(result, Err(EngineError::InvalidDateRange { .. })));
}

/// A negative lookback window is rejected at the entry point.
#[test]
fn negative_lookback_rejected() {
    let params = CohortParams {
        lookback_months: -1,
        ..CohortParams::default()
    };
    let result = seeded_engine().cohort_retention(d(2024, 6, 1), &params);
    assert!(matches!(result, Err(EngineError::InvalidDateRange { .. })));
}

/// A negative grace period is rejected at the entry point.
#[test]
fn negative_grace_rejected() {
    let params = CohortParams {
        grace_days: -3,
        ..CohortParams::default()
    };
    let result = seeded_engine().cohort_retention(d(2024, 6, 1), &params);
    assert!(matches!(result, Err(EngineError::InvalidDateRange { .. })));
}

/// Inverted recovery cutoffs are rejected at the entry point.
#[test]
fn inverted_recovery_cutoffs_rejected() {
    let params = RecoveryParams {
        fast_cutoff_days: 30,
        slow_cutoff_days: 7,
        default_cutoff_days: 90,
    };
    let result = seeded_engine().recovery_rates(d(2024, 6, 1), &params);
    assert!(matches!(result, Err(EngineError::InvalidDateRange { .. })));
}

/// A one-payment early-warning window cannot hold a streak and a break.
#[test]
fn degenerate_warning_window_rejected() {
    let result = seeded_engine().early_warnings(d(2024, 6, 1), &EarlyWarningParams { window: 1 });
    assert!(matches!(result, Err(EngineError::InvalidDateRange { .. })));
}
