//! creditrisk-core — the loan-repayment analytics engine.
//!
//! Turns row-level repayment events into derived risk and behaviour
//! metrics: cohort retention curves, rule-tree risk tiers, the slipping
//! customer early warning, cure-rate estimation, and a composed KPI
//! report.
//!
//! The computation model is staged passes over in-memory collections:
//! load snapshot → index by owning key → per-group fold → classify.
//! Every derived table is an explicit typed collection. The engine
//! holds no long-lived state and never mutates a source entity.

pub mod cohort;
pub mod config;
pub mod early_warning;
pub mod engine;
pub mod error;
pub mod kpi;
pub mod model;
pub mod recovery;
pub mod risk;
pub mod sequencer;
pub mod snapshot;
pub mod store;
pub mod types;
