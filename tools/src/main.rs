//! insight-runner: headless analytics runner for the credit risk engine.
//!
//! Usage:
//!   insight-runner --db portfolio.db --as-of 2024-06-30
//!   insight-runner --seed 12345 --customers 500 --as-of 2024-06-30
//!   insight-runner --seed 12345 --json
//!
//! With --seed, an empty (or in-memory) database is populated with a
//! deterministic synthetic portfolio before the analyses run.

mod gen;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use creditrisk_core::{
    config::AnalyticsConfig,
    engine::AnalyticsEngine,
    kpi::KpiReport,
    store::EntityStore,
};
use gen::PortfolioGenerator;
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let seed = parse_arg(&args, "--seed", 42u64);
    let customers = parse_arg(&args, "--customers", 200u64);
    let generate = args.iter().any(|a| a == "--seed" || a == "--generate");
    let as_json = args.iter().any(|a| a == "--json");

    let store = match db {
        ":memory:" => EntityStore::in_memory()?,
        path => EntityStore::open(path)?,
    };
    store.migrate()?;

    let as_of: NaiveDate = match str_arg(&args, "--as-of") {
        Some(s) => s
            .parse()
            .with_context(|| format!("--as-of must be YYYY-MM-DD, got {s}"))?,
        None => chrono::Utc::now().date_naive(),
    };

    if generate || db == ":memory:" {
        log::info!("generating synthetic portfolio: seed={seed} customers={customers}");
        let mut generator = PortfolioGenerator::new(seed, as_of);
        let portfolio = generator.generate(customers);
        for c in &portfolio.customers {
            store.insert_customer(c)?;
        }
        for l in &portfolio.loans {
            store.insert_loan(l)?;
        }
        for p in &portfolio.payments {
            store.insert_payment(p)?;
        }
    }

    let config = match str_arg(&args, "--config") {
        Some(path) => AnalyticsConfig::load(Path::new(path))?,
        None => AnalyticsConfig::default(),
    };

    let engine = AnalyticsEngine::new(store, config);
    let report = engine.executive_kpis(as_of)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.portfolio.total_customers == 0 {
        bail!("database {db} holds no customers; pass --seed to generate a portfolio");
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &KpiReport) {
    let p = &report.portfolio;

    println!("=== PORTFOLIO OVERVIEW ({}) ===", report.as_of);
    println!("  customers:        {}", p.total_customers);
    println!("  approved loans:   {}", p.approved_loans);
    println!("  portfolio value:  ${:.2}", p.total_portfolio_value);
    println!("  on-time rate:     {:.2}%", p.on_time_rate_pct);
    println!("  avg days late:    {:.1}", p.avg_days_past_due);
    println!("  max days late:    {}", p.max_days_past_due);
    println!("  MTD payments:     {} (${:.2})", p.mtd_payment_count, p.mtd_revenue);

    println!();
    println!("=== PAYMENT STATUS DISTRIBUTION ===");
    for share in &report.payment_mix {
        println!(
            "  {:8} {:6}  {:5.2}%",
            share.status.label(),
            share.count,
            share.share_pct,
        );
    }

    println!();
    println!("=== RISK TIERS ===");
    for tier in &report.risk.tiers {
        println!(
            "  Tier {} {:9} | {:5} customers | avg score {:5.0} | avg income ${:9.0} | {:5.2}%",
            tier.tier.number(),
            tier.tier.label(),
            tier.customer_count,
            tier.avg_credit_score,
            tier.avg_income,
            tier.portfolio_pct,
        );
    }
    if report.risk.unclassified > 0 {
        println!("  ({} customers without payment history)", report.risk.unclassified);
    }

    println!();
    println!("=== COHORT RETENTION (latest 6 cohorts) ===");
    let mut shown = 0;
    let mut last_cohort = None;
    for cell in &report.cohorts.cells {
        if last_cohort != Some(cell.cohort_month) {
            last_cohort = Some(cell.cohort_month);
            shown += 1;
            if shown > 6 {
                break;
            }
            println!("  cohort {}:", cell.cohort_month.format("%Y-%m"));
        }
        println!(
            "    month {:2}: {:4}/{:4} successful ({:.2}%)",
            cell.months_since_acquisition,
            cell.successful_count,
            cell.due_count,
            cell.success_rate_pct,
        );
    }

    println!();
    println!("=== SLIPPING CUSTOMERS ===");
    println!(
        "  evaluated: {}   skipped (insufficient history): {}",
        report.slipping.evaluated, report.slipping.skipped_insufficient_history,
    );
    for s in report.slipping.flagged.iter().take(10) {
        println!(
            "  customer {:6} | score {:4} | {:14} | latest: {:7} | {}",
            s.customer_id,
            s.credit_score,
            s.employment_type,
            s.current_status.label(),
            s.flag,
        );
    }
    if report.slipping.flagged.len() > 10 {
        println!("  ... and {} more", report.slipping.flagged.len() - 10);
    }

    println!();
    println!("=== RECOVERY RATES ===");
    let r = &report.recovery;
    println!("  missed payments: {}", r.missed_total);
    println!(
        "  recovered <= {}d: {} ({})",
        r.fast_cutoff_days,
        r.recovered_fast,
        fmt_pct(r.recovered_fast_pct),
    );
    println!(
        "  recovered <= {}d: {} ({})",
        r.slow_cutoff_days,
        r.recovered_slow,
        fmt_pct(r.recovered_slow_pct),
    );
    println!(
        "  defaulted (> {}d or unpaid): {} ({})",
        r.default_cutoff_days,
        r.defaulted,
        fmt_pct(r.default_rate_pct),
    );

    println!();
    println!("=== EMPLOYMENT MIX ===");
    for slice in &report.employment_mix {
        println!(
            "  {:14} | {:5} customers | avg income ${:9.0} | avg score {:5.0}",
            slice.employment_type,
            slice.customer_count,
            slice.avg_income,
            slice.avg_credit_score,
        );
    }
}

fn fmt_pct(pct: Option<f64>) -> String {
    match pct {
        Some(v) => format!("{v:.1}%"),
        None => "n/a".to_string(),
    }
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
