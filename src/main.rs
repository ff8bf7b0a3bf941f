use anyhow::{Context, Result};
use ineqdash::{build_report, shared_table, Config};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) config ───────────────────────────────────────────────────
    let config = Config::load().context("loading configuration")?;
    info!(
        source = ?config.source,
        start = config.start_year,
        end = config.end_year,
        year = config.analysis_year(),
        "configured"
    );

    // ─── 3) load the indicator table ─────────────────────────────────
    let start = Instant::now();
    let load = shared_table(&config)?;
    for failure in &load.failures {
        warn!(indicator = %failure.indicator, error = %failure.error, "indicator not loaded");
    }
    info!(
        rows = load.table.len(),
        failures = load.failures.len(),
        elapsed = ?start.elapsed(),
        "table ready"
    );

    // ─── 4) analyse and print ────────────────────────────────────────
    let report = build_report(&load.table, &config).with_load(&load);
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");

    info!("all done");
    Ok(())
}
