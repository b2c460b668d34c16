//! Analytics entry points — one per aggregate computation.
//!
//! RULES:
//!   - One engine call = one snapshot load = one coherent as-of cutoff.
//!   - Date-range and tunable validation happens here, before any
//!     per-customer work starts.
//!   - No component reads the wall clock; as-of is threaded explicitly
//!     so repeat runs over the same snapshot are bit-identical.
//!   - Entry points return aggregates only, never raw payment records.

use crate::{
    cohort::{self, CohortParams, CohortReport},
    config::AnalyticsConfig,
    early_warning::{self, EarlyWarningParams, SlippingReport},
    error::{EngineError, EngineResult},
    kpi::{self, DailyActivityParams, DailyActivityRow, KpiReport},
    recovery::{self, RecoveryParams, RecoveryReport},
    risk::{self, RiskTierReport},
    snapshot::PortfolioSnapshot,
    store::EntityStore,
};
use chrono::NaiveDate;

pub struct AnalyticsEngine {
    store: EntityStore,
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    pub fn new(store: EntityStore, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    // ── Entry points ───────────────────────────────────────────────

    pub fn cohort_retention(
        &self,
        as_of: NaiveDate,
        params: &CohortParams,
    ) -> EngineResult<CohortReport> {
        validate_cohort_params(params)?;
        let snapshot = self.store.load_snapshot()?;
        validate_as_of(&snapshot, as_of)?;

        let report = cohort::cohort_retention(&snapshot, as_of, params);
        log::info!(
            "as_of={as_of} cohort: {} cells over {} customers (lookback={}m, grace={}d)",
            report.cells.len(),
            snapshot.customers().len(),
            params.lookback_months,
            params.grace_days,
        );
        Ok(report)
    }

    pub fn risk_tiers(&self, as_of: NaiveDate) -> EngineResult<RiskTierReport> {
        let snapshot = self.store.load_snapshot()?;
        validate_as_of(&snapshot, as_of)?;

        let report = risk::risk_tiers(&snapshot, as_of);
        log::info!(
            "as_of={as_of} risk: {} classified, {} without history",
            report.classified,
            report.unclassified,
        );
        Ok(report)
    }

    pub fn early_warnings(
        &self,
        as_of: NaiveDate,
        params: &EarlyWarningParams,
    ) -> EngineResult<SlippingReport> {
        validate_early_warning_params(params)?;
        let snapshot = self.store.load_snapshot()?;
        validate_as_of(&snapshot, as_of)?;

        let report = early_warning::early_warnings(&snapshot, as_of, params);
        log::info!(
            "as_of={as_of} early_warning: {} flagged, {} evaluated, {} skipped",
            report.flagged.len(),
            report.evaluated,
            report.skipped_insufficient_history,
        );
        Ok(report)
    }

    pub fn recovery_rates(
        &self,
        as_of: NaiveDate,
        params: &RecoveryParams,
    ) -> EngineResult<RecoveryReport> {
        validate_recovery_params(params)?;
        let snapshot = self.store.load_snapshot()?;
        validate_as_of(&snapshot, as_of)?;

        let report = recovery::recovery_rates(&snapshot, as_of, params);
        log::info!(
            "as_of={as_of} recovery: {} missed, {} cured fast, {} defaulted",
            report.missed_total,
            report.recovered_fast,
            report.defaulted,
        );
        Ok(report)
    }

    pub fn daily_activity(
        &self,
        as_of: NaiveDate,
        params: &DailyActivityParams,
    ) -> EngineResult<Vec<DailyActivityRow>> {
        if params.window_days < 1 {
            return Err(EngineError::InvalidDateRange {
                reason: format!("daily activity window must be positive, got {}", params.window_days),
            });
        }
        let snapshot = self.store.load_snapshot()?;
        validate_as_of(&snapshot, as_of)?;
        Ok(kpi::daily_activity(&snapshot, as_of, params))
    }

    /// The full executive report: portfolio totals, distribution slices,
    /// and every analytical component, computed over one snapshot with
    /// one cutoff, using the engine's configured tunables.
    pub fn executive_kpis(&self, as_of: NaiveDate) -> EngineResult<KpiReport> {
        validate_cohort_params(&self.config.cohort)?;
        validate_early_warning_params(&self.config.early_warning)?;
        validate_recovery_params(&self.config.recovery)?;

        let snapshot = self.store.load_snapshot()?;
        validate_as_of(&snapshot, as_of)?;

        let report = KpiReport {
            as_of,
            portfolio: kpi::portfolio_totals(&snapshot, as_of),
            payment_mix: kpi::payment_mix(&snapshot, as_of),
            employment_mix: kpi::employment_mix(&snapshot),
            cohorts: cohort::cohort_retention(&snapshot, as_of, &self.config.cohort),
            risk: risk::risk_tiers(&snapshot, as_of),
            slipping: early_warning::early_warnings(&snapshot, as_of, &self.config.early_warning),
            recovery: recovery::recovery_rates(&snapshot, as_of, &self.config.recovery),
        };
        log::info!(
            "as_of={as_of} kpi: {} customers, {} approved loans, portfolio value {:.2}",
            report.portfolio.total_customers,
            report.portfolio.approved_loans,
            report.portfolio.total_portfolio_value,
        );
        Ok(report)
    }
}

// ── Validation ─────────────────────────────────────────────────────

fn validate_as_of(snapshot: &PortfolioSnapshot, as_of: NaiveDate) -> EngineResult<()> {
    if let Some(earliest) = snapshot.earliest_activity() {
        if as_of < earliest {
            return Err(EngineError::InvalidDateRange {
                reason: format!("as-of {as_of} predates earliest portfolio activity {earliest}"),
            });
        }
    }
    Ok(())
}

fn validate_cohort_params(params: &CohortParams) -> EngineResult<()> {
    if params.lookback_months < 0 {
        return Err(EngineError::InvalidDateRange {
            reason: format!("cohort lookback must be non-negative, got {}", params.lookback_months),
        });
    }
    if params.grace_days < 0 {
        return Err(EngineError::InvalidDateRange {
            reason: format!("grace period must be non-negative, got {}", params.grace_days),
        });
    }
    Ok(())
}

fn validate_early_warning_params(params: &EarlyWarningParams) -> EngineResult<()> {
    if params.window < 2 {
        return Err(EngineError::InvalidDateRange {
            reason: format!("early-warning window must be at least 2, got {}", params.window),
        });
    }
    Ok(())
}

fn validate_recovery_params(params: &RecoveryParams) -> EngineResult<()> {
    if params.fast_cutoff_days < 0
        || params.fast_cutoff_days > params.slow_cutoff_days
        || params.slow_cutoff_days > params.default_cutoff_days
    {
        return Err(EngineError::InvalidDateRange {
            reason: format!(
                "recovery cutoffs must satisfy 0 <= fast <= slow <= default, got {}/{}/{}",
                params.fast_cutoff_days, params.slow_cutoff_days, params.default_cutoff_days,
            ),
        });
    }
    Ok(())
}
