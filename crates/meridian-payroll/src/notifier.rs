//! # Payslip Notification Processor
//!
//! Drains the notification outbox and delivers payslips.
//!
//! ## Delivery Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Notification Processor Flow                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 notification_outbox Table                       │   │
//! │  │                                                                 │   │
//! │  │  id | salary_record_id | payload | attempts | sent_at          │   │
//! │  │  ───┼──────────────────┼─────────┼──────────┼──────────        │   │
//! │  │  1  │ rec-001          │ {...}   │ 0        │ NULL             │   │
//! │  │  2  │ rec-002          │ {...}   │ 3        │ NULL             │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  NotificationProcessor                          │   │
//! │  │                                                                 │   │
//! │  │  1. Poll: get_pending(batch_size)                              │   │
//! │  │  2. Skip: attempts >= max_attempts → warn, leave for operator  │   │
//! │  │  3. Deliver: PayslipNotifier::deliver(payload)                 │   │
//! │  │  4. Mark: ok → mark_sent, err → mark_failed (attempts += 1)    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Delivery is decoupled from payroll: losing, delaying, or retrying     │
//! │  a notification never touches committed salary records.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use meridian_db::Database;

use crate::config::NotificationConfig;
use crate::error::{PayrollError, PayrollResult};

// =============================================================================
// Payslip Payload
// =============================================================================

/// The payslip content carried through the outbox as JSON.
///
/// A snapshot, not a reference: the processor can render and deliver
/// it without reading payroll tables, and it stays meaningful even if
/// the employee's role changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipPayload {
    pub salary_record_id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub email: Option<String>,
    pub period: String,
    pub base_salary_cents: i64,
    pub commission_cents: i64,
    pub total_cents: i64,
}

// =============================================================================
// Notifier Trait
// =============================================================================

/// Delivery backend for payslip notifications.
///
/// The processor is generic over this so tests (and the on-demand
/// binary) can use [`LogNotifier`] while a deployment plugs in email
/// or chat delivery. Errors come back as strings; they land in the
/// outbox row's `last_error` column verbatim.
pub trait PayslipNotifier: Send + Sync {
    fn deliver(
        &self,
        payload: &PayslipPayload,
    ) -> impl Future<Output = Result<(), String>> + Send;
}

/// Notifier that writes payslips to the log. The default backend.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl PayslipNotifier for LogNotifier {
    async fn deliver(&self, payload: &PayslipPayload) -> Result<(), String> {
        info!(
            employee = %payload.employee_name,
            period = %payload.period,
            base_cents = payload.base_salary_cents,
            commission_cents = payload.commission_cents,
            total_cents = payload.total_cents,
            "Payslip ready"
        );
        Ok(())
    }
}

// =============================================================================
// Notification Processor
// =============================================================================

/// Polls the notification outbox and delivers pending payslips.
pub struct NotificationProcessor<N> {
    /// Database connection.
    db: Database,

    /// Processor settings.
    config: NotificationConfig,

    /// Delivery backend.
    notifier: N,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling the notification processor.
#[derive(Clone)]
pub struct NotificationProcessorHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl NotificationProcessorHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> PayrollResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| PayrollError::Channel("Shutdown channel closed".to_string()))
    }
}

impl<N: PayslipNotifier> NotificationProcessor<N> {
    /// Creates a new notification processor and returns a handle.
    pub fn new(
        db: Database,
        config: NotificationConfig,
        notifier: N,
    ) -> (Self, NotificationProcessorHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let processor = NotificationProcessor {
            db,
            config,
            notifier,
            shutdown_rx,
        };

        let handle = NotificationProcessorHandle { shutdown_tx };

        (processor, handle)
    }

    /// Runs the processor loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Notification processor starting");

        let poll_interval = Duration::from_secs(self.config.poll_interval_secs);
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.process_batch().await {
                        error!(?e, "Failed to process notification batch");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Notification processor shutting down");
                    break;
                }
            }
        }

        info!("Notification processor stopped");
    }

    /// Processes one batch of pending notifications.
    ///
    /// ## Returns
    /// The number of notifications delivered.
    pub async fn process_batch(&self) -> PayrollResult<usize> {
        let entries = self.db.notifications().get_pending(self.config.batch_size).await?;

        if entries.is_empty() {
            debug!("No pending notifications");
            return Ok(0);
        }

        info!(count = entries.len(), "Processing notification batch");

        // Entries past the attempt budget stay in the table for an
        // operator to inspect; retrying them forever just spams the log.
        let (processable, exhausted): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|e| e.attempts < self.config.max_attempts);

        for entry in exhausted {
            warn!(
                id = %entry.id,
                employee_id = %entry.employee_id,
                attempts = entry.attempts,
                last_error = entry.last_error.as_deref().unwrap_or("-"),
                "Skipping notification that exceeded max delivery attempts"
            );
        }

        let mut delivered = 0;
        for entry in processable {
            let payload: PayslipPayload = match serde_json::from_str(&entry.payload) {
                Ok(p) => p,
                Err(e) => {
                    // Unparseable payloads never succeed on retry;
                    // burn an attempt so max_attempts retires them.
                    warn!(id = %entry.id, ?e, "Malformed payslip payload");
                    self.db
                        .notifications()
                        .mark_failed(&entry.id, &format!("malformed payload: {e}"))
                        .await?;
                    continue;
                }
            };

            match self.notifier.deliver(&payload).await {
                Ok(()) => {
                    self.db.notifications().mark_sent(&entry.id).await?;
                    debug!(id = %entry.id, employee_id = %entry.employee_id, "Payslip delivered");
                    delivered += 1;
                }
                Err(reason) => {
                    warn!(
                        id = %entry.id,
                        employee_id = %entry.employee_id,
                        attempts = entry.attempts + 1,
                        %reason,
                        "Payslip delivery failed"
                    );
                    self.db.notifications().mark_failed(&entry.id, &reason).await?;
                }
            }
        }

        Ok(delivered)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use meridian_core::{Employee, SalaryRecord};
    use meridian_db::DbConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    /// Notifier that fails the first `failures` deliveries.
    #[derive(Clone)]
    struct FlakyNotifier {
        failures: usize,
        calls: Arc<AtomicUsize>,
    }

    impl PayslipNotifier for FlakyNotifier {
        async fn deliver(&self, _payload: &PayslipPayload) -> Result<(), String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err("smtp timeout".to_string())
            } else {
                Ok(())
            }
        }
    }

    async fn setup_entry(db: &Database) -> String {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            name: "Amara Okafor".to_string(),
            email: Some("amara@example.com".to_string()),
            phone: None,
            role_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.staff().insert_employee(&employee).await.unwrap();

        let record = SalaryRecord {
            id: Uuid::new_v4().to_string(),
            employee_id: employee.id.clone(),
            period: "2026-07".to_string(),
            base_salary_cents: 150_000_000,
            commission_cents: 500_000,
            total_cents: 150_500_000,
            created_at: now,
        };
        db.payroll().commit_salary(&record, &[]).await.unwrap();

        let payload = PayslipPayload {
            salary_record_id: record.id.clone(),
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            email: employee.email.clone(),
            period: record.period.clone(),
            base_salary_cents: record.base_salary_cents,
            commission_cents: record.commission_cents,
            total_cents: record.total_cents,
        };
        let entry = db
            .notifications()
            .enqueue(
                &record.id,
                &employee.id,
                &serde_json::to_string(&payload).unwrap(),
            )
            .await
            .unwrap();
        entry.id
    }

    #[tokio::test]
    async fn test_delivers_and_marks_sent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        setup_entry(&db).await;

        let (processor, _handle) =
            NotificationProcessor::new(db.clone(), NotificationConfig::default(), LogNotifier);

        assert_eq!(processor.process_batch().await.unwrap(), 1);
        assert!(db.notifications().get_pending(10).await.unwrap().is_empty());

        // nothing left to do
        assert_eq!(processor.process_batch().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_delivery_retries_next_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let entry_id = setup_entry(&db).await;

        let notifier = FlakyNotifier {
            failures: 1,
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let (processor, _handle) =
            NotificationProcessor::new(db.clone(), NotificationConfig::default(), notifier);

        // first pass fails, entry stays pending with the error recorded
        assert_eq!(processor.process_batch().await.unwrap(), 0);
        let pending = db.notifications().get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, entry_id);
        assert_eq!(pending[0].attempts, 1);
        assert_eq!(pending[0].last_error.as_deref(), Some("smtp timeout"));

        // second pass succeeds
        assert_eq!(processor.process_batch().await.unwrap(), 1);
        assert!(db.notifications().get_pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_entries_are_skipped_not_retried() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        setup_entry(&db).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let notifier = FlakyNotifier {
            failures: usize::MAX,
            calls: calls.clone(),
        };
        let config = NotificationConfig {
            max_attempts: 2,
            ..NotificationConfig::default()
        };
        let (processor, _handle) = NotificationProcessor::new(db.clone(), config, notifier);

        // two failing passes exhaust the budget
        processor.process_batch().await.unwrap();
        processor.process_batch().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // third pass must not touch the notifier again
        processor.process_batch().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // still visible for an operator
        let pending = db.notifications().get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 2);
    }

    #[tokio::test]
    async fn test_malformed_payload_burns_an_attempt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let entry_id = setup_entry(&db).await;

        sqlx::query("UPDATE notification_outbox SET payload = 'not json' WHERE id = ?1")
            .bind(&entry_id)
            .execute(db.pool())
            .await
            .unwrap();

        let (processor, _handle) =
            NotificationProcessor::new(db.clone(), NotificationConfig::default(), LogNotifier);
        assert_eq!(processor.process_batch().await.unwrap(), 0);

        let pending = db.notifications().get_pending(10).await.unwrap();
        assert_eq!(pending[0].attempts, 1);
        assert!(pending[0]
            .last_error
            .as_deref()
            .unwrap()
            .starts_with("malformed payload"));
    }

    #[tokio::test]
    async fn test_shutdown_stops_run_loop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (processor, handle) =
            NotificationProcessor::new(db, NotificationConfig::default(), LogNotifier);

        let task = tokio::spawn(processor.run());
        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }
}
