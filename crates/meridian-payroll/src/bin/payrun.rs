//! # On-Demand Payroll Run
//!
//! Triggers one payroll run and prints the report. Safe to run twice:
//! already-paid employees come back as skips.
//!
//! ## Usage
//! ```bash
//! # Pay the period the configured policy derives from now
//! cargo run -p meridian-payroll --bin payrun
//!
//! # Pay an explicit period
//! cargo run -p meridian-payroll --bin payrun -- --period 2026-07
//!
//! # With a configuration file
//! cargo run -p meridian-payroll --bin payrun -- --config ./meridian.toml
//! ```

use chrono::Utc;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, warn};

use meridian_core::Period;
use meridian_db::{Database, DbConfig};
use meridian_payroll::{
    LogNotifier, NotificationProcessor, PayrollConfig, PayrollEngine, PayrollError, PayrollResult,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // per-employee failures live in the printed report; only a run
    // that could not happen at all is a process failure
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("payrun failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> PayrollResult<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = arg_value(&args, "--config").unwrap_or_else(|| "./meridian.toml".to_string());
    let config = PayrollConfig::load(Path::new(&config_path))?;

    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .map_err(PayrollError::Persistence)?;

    let engine = PayrollEngine::new(db.clone(), &config);

    let report = match arg_value(&args, "--period") {
        Some(label) => {
            let period = Period::parse(&label)
                .map_err(|e| PayrollError::Config(format!("invalid --period: {e}")))?;
            engine.run_for_period(&period).await?
        }
        None => engine.run(Utc::now()).await?,
    };

    print!("{report}");

    // deliver whatever this run queued (plus any backlog) right away;
    // a long-running deployment would leave this to the background
    // processor instead
    let (processor, _handle) =
        NotificationProcessor::new(db, config.notifications.clone(), LogNotifier);
    match processor.process_batch().await {
        Ok(delivered) if delivered > 0 => {
            info!(delivered, "Delivered queued payslip notifications");
        }
        Ok(_) => {}
        Err(e) => {
            warn!(error = %e, "Notification delivery failed; entries stay queued");
        }
    }

    if !report.is_clean() {
        warn!(
            failed = report.failed(),
            "Some employees were not paid; fix the causes and re-run"
        );
    }

    Ok(())
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1).cloned())
}
