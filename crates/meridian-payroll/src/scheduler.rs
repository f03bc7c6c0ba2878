//! # Monthly Scheduler
//!
//! Fires a payroll run at the start of each calendar month (UTC).
//!
//! The scheduler owns no payroll logic: it computes the next month
//! boundary, sleeps to it, and hands the trigger instant to the
//! engine. Combined with the default previous-month policy, a run
//! fired just after the boundary pays the month that just closed.
//!
//! Missing a trigger (host asleep, process down) is harmless: the next
//! manual or scheduled run pays the period, and the idempotency guard
//! makes accidental double triggers no-ops.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use meridian_core::Period;

use crate::driver::PayrollEngine;
use crate::error::{PayrollError, PayrollResult};

/// The next month boundary strictly after `now`.
pub fn next_trigger(now: DateTime<Utc>) -> DateTime<Utc> {
    Period::containing(now).end()
}

/// Fires the payroll engine on month boundaries.
pub struct PayrollScheduler {
    /// The engine to fire.
    engine: PayrollEngine,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling the scheduler.
#[derive(Clone)]
pub struct PayrollSchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl PayrollSchedulerHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> PayrollResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| PayrollError::Channel("Shutdown channel closed".to_string()))
    }
}

impl PayrollScheduler {
    /// Creates a new scheduler and returns a handle.
    pub fn new(engine: PayrollEngine) -> (Self, PayrollSchedulerHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let scheduler = PayrollScheduler {
            engine,
            shutdown_rx,
        };
        let handle = PayrollSchedulerHandle { shutdown_tx };

        (scheduler, handle)
    }

    /// Runs the scheduler loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Payroll scheduler starting");

        loop {
            let now = Utc::now();
            let fire_at = next_trigger(now);
            let wait = (fire_at - now).to_std().unwrap_or(Duration::ZERO);

            info!(fire_at = %fire_at, "Scheduler sleeping until next month boundary");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    match self.engine.run(fire_at).await {
                        Ok(report) => {
                            info!(
                                period = %report.period,
                                paid = report.paid(),
                                skipped = report.skipped(),
                                failed = report.failed(),
                                "Scheduled payroll run finished"
                            );
                            if !report.is_clean() {
                                warn!(
                                    period = %report.period,
                                    failed = report.failed(),
                                    "Scheduled run had failures; re-run after fixing them"
                                );
                            }
                        }
                        Err(e) => {
                            error!(?e, "Scheduled payroll run aborted");
                        }
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Payroll scheduler shutting down");
                    break;
                }
            }
        }

        info!("Payroll scheduler stopped");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
