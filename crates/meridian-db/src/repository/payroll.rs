//! # Payroll Repository
//!
//! The period gate and the salary commit: the two sides of the
//! engine's idempotency guard.
//!
//! ## Why the Gate Alone Is Not Enough
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Concurrent Runs of the Same Period                         │
//! │                                                                         │
//! │   Run A (scheduler)                  Run B (operator re-trigger)       │
//! │   ───────────────────                ─────────────────────────────     │
//! │   salary_exists? → false             salary_exists? → false            │
//! │   compute...                         compute...                        │
//! │   INSERT salary_record  ──► OK       INSERT salary_record ──► UNIQUE   │
//! │   INSERT ledger entries              constraint failed                 │
//! │   COMMIT                             (transaction rolls back,          │
//! │                                       ledger writes discarded)         │
//! │                                            │                           │
//! │                                            ▼                           │
//! │                                      engine records a SKIP             │
//! │                                      ("already paid"), not an error    │
//! │                                                                         │
//! │  The gate is an optimization that avoids wasted computation. The       │
//! │  UNIQUE(employee_id, period) constraint is the correctness mechanism.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Salary records and ledger entries are never updated or deleted
//! here. Corrections are new, superseding records created outside the
//! engine.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use meridian_core::{CommissionLedgerEntry, Period, SalaryRecord};

/// Repository for salary records and the commission ledger.
#[derive(Debug, Clone)]
pub struct PayrollRepository {
    pool: SqlitePool,
}

impl PayrollRepository {
    /// Creates a new PayrollRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PayrollRepository { pool }
    }

    /// The period gate: does a salary record already exist for this
    /// (employee, period) pair?
    ///
    /// A `true` here lets the engine skip an employee without reading
    /// sales or computing anything. Under concurrency it can race; the
    /// commit below is what actually guarantees at-most-once.
    pub async fn salary_exists(&self, employee_id: &str, period: &Period) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM salary_records
            WHERE employee_id = ?1 AND period = ?2
            "#,
        )
        .bind(employee_id)
        .bind(period.label())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Commits one employee's pay for one period, atomically.
    ///
    /// ## What This Does (single transaction)
    /// 1. Inserts the salary record: the UNIQUE(employee_id, period)
    ///    constraint trips here, before any ledger rows exist
    /// 2. Inserts the commission ledger entries for the contributing
    ///    sales
    ///
    /// On a constraint violation the transaction rolls back and the
    /// error maps to `DbError::UniqueViolation`; callers translate
    /// that to "already paid". Notification enqueueing is deliberately
    /// NOT part of this transaction: once this commits, the money
    /// figures are authoritative no matter what notification does.
    pub async fn commit_salary(
        &self,
        record: &SalaryRecord,
        entries: &[CommissionLedgerEntry],
    ) -> DbResult<()> {
        debug!(
            employee_id = %record.employee_id,
            period = %record.period,
            total_cents = record.total_cents,
            entries = entries.len(),
            "Committing salary record"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO salary_records (
                id, employee_id, period,
                base_salary_cents, commission_cents, total_cents,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&record.id)
        .bind(&record.employee_id)
        .bind(&record.period)
        .bind(record.base_salary_cents)
        .bind(record.commission_cents)
        .bind(record.total_cents)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO commission_ledger (
                    id, employee_id, sale_id, period, amount_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&entry.id)
            .bind(&entry.employee_id)
            .bind(&entry.sale_id)
            .bind(&entry.period)
            .bind(entry.amount_cents)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Gets the salary record for an (employee, period) pair.
    pub async fn get_record(
        &self,
        employee_id: &str,
        period: &Period,
    ) -> DbResult<Option<SalaryRecord>> {
        let record = sqlx::query_as::<_, SalaryRecord>(
            r#"
            SELECT id, employee_id, period,
                   base_salary_cents, commission_cents, total_cents, created_at
            FROM salary_records
            WHERE employee_id = ?1 AND period = ?2
            "#,
        )
        .bind(employee_id)
        .bind(period.label())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets all salary records for a period (reporting/CRUD display).
    pub async fn records_for_period(&self, period: &Period) -> DbResult<Vec<SalaryRecord>> {
        let records = sqlx::query_as::<_, SalaryRecord>(
            r#"
            SELECT id, employee_id, period,
                   base_salary_cents, commission_cents, total_cents, created_at
            FROM salary_records
            WHERE period = ?1
            ORDER BY employee_id
            "#,
        )
        .bind(period.label())
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Gets the commission ledger entries for an (employee, period).
    pub async fn ledger_entries(
        &self,
        employee_id: &str,
        period: &Period,
    ) -> DbResult<Vec<CommissionLedgerEntry>> {
        let entries = sqlx::query_as::<_, CommissionLedgerEntry>(
            r#"
            SELECT id, employee_id, sale_id, period, amount_cents, created_at
            FROM commission_ledger
            WHERE employee_id = ?1 AND period = ?2
            ORDER BY created_at, id
            "#,
        )
        .bind(employee_id)
        .bind(period.label())
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Sums the ledger entries for an (employee, period).
    ///
    /// Reconciliation check: this must equal the salary record's
    /// `commission_cents` exactly.
    pub async fn ledger_total(&self, employee_id: &str, period: &Period) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_cents)
            FROM commission_ledger
            WHERE employee_id = ?1 AND period = ?2
            "#,
        )
        .bind(employee_id)
        .bind(period.label())
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use meridian_core::Employee;
    use uuid::Uuid;

    async fn setup_employee(db: &Database) -> String {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            name: "Frank".to_string(),
            email: None,
            phone: None,
            role_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.staff().insert_employee(&employee).await.unwrap();
        employee.id
    }

    fn record(employee_id: &str, period: &Period, commission: i64) -> SalaryRecord {
        SalaryRecord {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            period: period.label(),
            base_salary_cents: 150_000_000,
            commission_cents: commission,
            total_cents: 150_000_000 + commission,
            created_at: Utc::now(),
        }
    }

    fn entry(employee_id: &str, sale_id: &str, period: &Period, amount: i64) -> CommissionLedgerEntry {
        CommissionLedgerEntry {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            sale_id: sale_id.to_string(),
            period: period.label(),
            amount_cents: amount,
            created_at: Utc::now(),
        }
    }

    async fn insert_sale(db: &Database, employee_id: &str) -> String {
        let sale = meridian_core::Sale {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            status: meridian_core::SaleStatus::Completed,
            subtotal_cents: 20_000_000,
            tax_cents: 0,
            total_cents: 20_000_000,
            created_at: Utc::now(),
        };
        db.sales().insert_sale(&sale).await.unwrap();
        sale.id
    }

    #[tokio::test]
    async fn test_gate_flips_after_commit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee_id = setup_employee(&db).await;
        let payroll = db.payroll();
        let july = Period::new(2026, 7).unwrap();

        assert!(!payroll.salary_exists(&employee_id, &july).await.unwrap());

        payroll
            .commit_salary(&record(&employee_id, &july, 0), &[])
            .await
            .unwrap();

        assert!(payroll.salary_exists(&employee_id, &july).await.unwrap());
        // a different period is still clear
        assert!(!payroll
            .salary_exists(&employee_id, &july.next())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_commit_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee_id = setup_employee(&db).await;
        let payroll = db.payroll();
        let july = Period::new(2026, 7).unwrap();

        payroll
            .commit_salary(&record(&employee_id, &july, 0), &[])
            .await
            .unwrap();

        let err = payroll
            .commit_salary(&record(&employee_id, &july, 0), &[])
            .await
            .unwrap_err();

        assert!(err.is_unique_violation(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_duplicate_commit_rolls_back_ledger() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee_id = setup_employee(&db).await;
        let payroll = db.payroll();
        let july = Period::new(2026, 7).unwrap();
        let sale_id = insert_sale(&db, &employee_id).await;

        payroll
            .commit_salary(
                &record(&employee_id, &july, 200_000),
                &[entry(&employee_id, &sale_id, &july, 200_000)],
            )
            .await
            .unwrap();

        // losing attempt carries its own ledger entries; none survive
        let result = payroll
            .commit_salary(
                &record(&employee_id, &july, 200_000),
                &[entry(&employee_id, &sale_id, &july, 200_000)],
            )
            .await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));

        assert_eq!(
            payroll.ledger_total(&employee_id, &july).await.unwrap(),
            200_000
        );
        assert_eq!(
            payroll.ledger_entries(&employee_id, &july).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_ledger_reconciles_with_record() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee_id = setup_employee(&db).await;
        let payroll = db.payroll();
        let july = Period::new(2026, 7).unwrap();

        let sale_a = insert_sale(&db, &employee_id).await;
        let sale_b = insert_sale(&db, &employee_id).await;

        payroll
            .commit_salary(
                &record(&employee_id, &july, 500_000),
                &[
                    entry(&employee_id, &sale_a, &july, 200_000),
                    entry(&employee_id, &sale_b, &july, 300_000),
                ],
            )
            .await
            .unwrap();

        let stored = payroll
            .get_record(&employee_id, &july)
            .await
            .unwrap()
            .unwrap();
        let ledger_sum = payroll.ledger_total(&employee_id, &july).await.unwrap();

        assert_eq!(ledger_sum, stored.commission_cents);
    }
}
