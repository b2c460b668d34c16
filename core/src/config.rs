//! Engine configuration — tunables for each analytical component.
//!
//! Every field has a compiled-in default; a JSON file can override any
//! subset. Validation happens at the engine entry points, not here, so
//! a bad file fails the computation it is used for, loudly.

use crate::{
    cohort::CohortParams,
    early_warning::EarlyWarningParams,
    error::EngineResult,
    kpi::DailyActivityParams,
    recovery::RecoveryParams,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub cohort: CohortParams,
    pub early_warning: EarlyWarningParams,
    pub recovery: RecoveryParams,
    pub daily_activity: DailyActivityParams,
}

impl AnalyticsConfig {
    /// Load overrides from a JSON file on top of the defaults.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AnalyticsConfig = serde_json::from_str(&text)?;
        log::debug!("config loaded from {}", path.display());
        Ok(config)
    }
}
