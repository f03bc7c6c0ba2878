//! # Payroll Daemon
//!
//! Long-running service: fires payroll on month boundaries and drains
//! the notification outbox in the background. Ctrl-C shuts both down
//! gracefully.
//!
//! ## Usage
//! ```bash
//! cargo run -p meridian-payroll --bin payrolld -- --config ./meridian.toml
//! ```

use std::env;
use std::path::Path;
use tracing::{error, info};

use meridian_db::{Database, DbConfig};
use meridian_payroll::{
    LogNotifier, NotificationProcessor, PayrollConfig, PayrollEngine, PayrollError, PayrollResult,
    PayrollScheduler,
};

#[tokio::main]
async fn main() -> PayrollResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1).cloned())
        .unwrap_or_else(|| "./meridian.toml".to_string());

    let config = PayrollConfig::load(Path::new(&config_path))?;
    info!(database = %config.database_path.display(), "Payroll daemon starting");

    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .map_err(PayrollError::Persistence)?;

    let engine = PayrollEngine::new(db.clone(), &config);
    let (scheduler, scheduler_handle) = PayrollScheduler::new(engine);
    let (processor, processor_handle) =
        NotificationProcessor::new(db.clone(), config.notifications.clone(), LogNotifier);

    let scheduler_task = tokio::spawn(scheduler.run());
    let processor_task = tokio::spawn(processor.run());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "Failed to listen for shutdown signal");
    }

    info!("Shutdown signal received");
    scheduler_handle.shutdown().await?;
    processor_handle.shutdown().await?;

    let _ = scheduler_task.await;
    let _ = processor_task.await;

    db.close().await;
    info!("Payroll daemon stopped");

    Ok(())
}
