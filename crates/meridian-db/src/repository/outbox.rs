//! # Notification Outbox Repository
//!
//! Queues payslip notifications for committed salary records.
//!
//! ## The Outbox Pattern, Inverted
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Commit First, Notify Best-Effort                        │
//! │                                                                         │
//! │  1. TRANSACTION: salary record + ledger entries  ──► COMMIT            │
//! │          (the money figures are now authoritative)                     │
//! │                                                                         │
//! │  2. INSERT INTO notification_outbox (...)   ← outside the transaction  │
//! │          │                                                              │
//! │          ├── OK: the processor will deliver it on its own schedule     │
//! │          └── FAILED: logged; the employee is still PAID - a            │
//! │              notification is never allowed to roll back pay            │
//! │                                                                         │
//! │  3. BACKGROUND PROCESSOR (meridian-payroll)                            │
//! │     SELECT ... WHERE sent_at IS NULL → deliver → mark_sent             │
//! │     on failure → mark_failed (attempts += 1), retried next poll        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use meridian_core::NotificationOutboxEntry;

/// Repository for notification outbox operations.
#[derive(Debug, Clone)]
pub struct NotificationOutboxRepository {
    pool: SqlitePool,
}

impl NotificationOutboxRepository {
    /// Creates a new NotificationOutboxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationOutboxRepository { pool }
    }

    /// Enqueues a payslip notification for a committed salary record.
    ///
    /// ## Arguments
    /// * `salary_record_id` - the committed record's UUID
    /// * `employee_id` - the employee to notify
    /// * `payload` - JSON serialization of the payslip payload
    pub async fn enqueue(
        &self,
        salary_record_id: &str,
        employee_id: &str,
        payload: &str,
    ) -> DbResult<NotificationOutboxEntry> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(
            salary_record_id = %salary_record_id,
            employee_id = %employee_id,
            "Enqueuing payslip notification"
        );

        let entry = NotificationOutboxEntry {
            id: id.clone(),
            salary_record_id: salary_record_id.to_string(),
            employee_id: employee_id.to_string(),
            payload: payload.to_string(),
            attempts: 0,
            last_error: None,
            created_at: now,
            attempted_at: None,
            sent_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO notification_outbox (
                id, salary_record_id, employee_id, payload,
                attempts, last_error, created_at, attempted_at, sent_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.salary_record_id)
        .bind(&entry.employee_id)
        .bind(&entry.payload)
        .bind(entry.attempts)
        .bind(&entry.last_error)
        .bind(entry.created_at)
        .bind(entry.attempted_at)
        .bind(entry.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Gets pending notifications, oldest first.
    ///
    /// ## Returns
    /// Entries where `sent_at IS NULL`, up to `limit`.
    pub async fn get_pending(&self, limit: u32) -> DbResult<Vec<NotificationOutboxEntry>> {
        let entries = sqlx::query_as::<_, NotificationOutboxEntry>(
            r#"
            SELECT id, salary_record_id, employee_id, payload,
                   attempts, last_error, created_at, attempted_at, sent_at
            FROM notification_outbox
            WHERE sent_at IS NULL
            ORDER BY created_at ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Marks an entry as delivered.
    pub async fn mark_sent(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE notification_outbox
            SET sent_at = ?2, attempted_at = ?2
            WHERE id = ?1 AND sent_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Notification (pending)", id));
        }

        Ok(())
    }

    /// Records a failed delivery attempt; the entry stays pending.
    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE notification_outbox
            SET attempts = attempts + 1, last_error = ?2, attempted_at = ?3
            WHERE id = ?1 AND sent_at IS NULL
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Notification (pending)", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use meridian_core::{Employee, SalaryRecord};

    async fn setup_record(db: &Database) -> SalaryRecord {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            name: "Grace".to_string(),
            email: Some("grace@example.com".to_string()),
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
            commission_cents: 0,
            total_cents: 150_000_000,
            created_at: now,
        };
        db.payroll().commit_salary(&record, &[]).await.unwrap();
        record
    }

    #[tokio::test]
    async fn test_enqueue_then_mark_sent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let record = setup_record(&db).await;
        let outbox = db.notifications();

        let entry = outbox
            .enqueue(&record.id, &record.employee_id, "{}")
            .await
            .unwrap();

        let pending = outbox.get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, entry.id);

        outbox.mark_sent(&entry.id).await.unwrap();
        assert!(outbox.get_pending(10).await.unwrap().is_empty());

        // marking twice is an error: the entry is no longer pending
        assert!(outbox.mark_sent(&entry.id).await.is_err());
    }

    #[tokio::test]
    async fn test_mark_failed_keeps_entry_pending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let record = setup_record(&db).await;
        let outbox = db.notifications();

        let entry = outbox
            .enqueue(&record.id, &record.employee_id, "{}")
            .await
            .unwrap();

        outbox.mark_failed(&entry.id, "smtp timeout").await.unwrap();
        outbox.mark_failed(&entry.id, "smtp timeout").await.unwrap();

        let pending = outbox.get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 2);
        assert_eq!(pending[0].last_error.as_deref(), Some("smtp timeout"));
        assert!(pending[0].attempted_at.is_some());
    }
}
