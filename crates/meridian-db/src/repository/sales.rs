//! # Sales Repository
//!
//! The commission ledger reader: sales attributed to an employee
//! within a pay period.
//!
//! ## Boundary Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            Half-Open Query Window [period.start, period.end)            │
//! │                                                                         │
//! │  WHERE created_at >= ?start AND created_at < ?end                      │
//! │                                                                         │
//! │  A sale stamped exactly at the period's end boundary belongs to        │
//! │  the NEXT period. Two consecutive runs can never both count it,        │
//! │  and no sale can fall between periods.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are read-only input here: the engine never mutates them.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use meridian_core::{Period, Sale, SaleItem};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: SqlitePool,
}

impl SalesRepository {
    /// Creates a new SalesRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesRepository { pool }
    }

    /// Gets the commissionable sales for an employee within a period.
    ///
    /// Commissionable means: attributed to the employee, status
    /// `completed`, timestamped within `[start, end)`. Sub-totals
    /// exclude tax; tax is never commissionable.
    ///
    /// ## Returns
    /// The matching sales, oldest first (the order their ledger
    /// entries are written in). An employee with no sales gets
    /// `Ok(vec![])`, not an error; base pay does not depend on sales.
    pub async fn commissionable_sales(
        &self,
        employee_id: &str,
        period: &Period,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, employee_id, status, subtotal_cents, tax_cents, total_cents, created_at
            FROM sales
            WHERE employee_id = ?1
              AND status = 'completed'
              AND created_at >= ?2
              AND created_at < ?3
            ORDER BY created_at, id
            "#,
        )
        .bind(employee_id)
        .bind(period.start())
        .bind(period.end())
        .fetch_all(&self.pool)
        .await?;

        debug!(
            employee_id = %employee_id,
            period = %period,
            count = sales.len(),
            "Read commissionable sales"
        );

        Ok(sales)
    }

    /// Gets all line items for a sale (payslip itemization, audits).
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, name_snapshot, quantity, unit_price_cents, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Inserts a sale (used by the sales module and the seeder).
    pub async fn insert_sale(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, employee_id = %sale.employee_id, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, employee_id, status, subtotal_cents, tax_cents, total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.employee_id)
        .bind(sale.status)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a sale line item.
    pub async fn insert_item(&self, item: &SaleItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, name_snapshot, quantity, unit_price_cents, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.name_snapshot)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.line_total_cents)
        .execute(&self.pool)
        .await?;

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
    use chrono::{DateTime, TimeZone, Utc};
    use meridian_core::{Employee, SaleStatus};
    use uuid::Uuid;

    async fn setup_employee(db: &Database) -> String {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            name: "Erin".to_string(),
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

    fn sale(employee_id: &str, subtotal: i64, status: SaleStatus, at: DateTime<Utc>) -> Sale {
        Sale {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            status,
            subtotal_cents: subtotal,
            tax_cents: subtotal / 10,
            total_cents: subtotal + subtotal / 10,
            created_at: at,
        }
    }

    #[tokio::test]
    async fn test_half_open_boundary() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee_id = setup_employee(&db).await;
        let sales = db.sales();

        let july = Period::new(2026, 7).unwrap();

        // first instant of July: inside
        let at_start = sale(&employee_id, 1000, SaleStatus::Completed, july.start());
        // last second of July: inside
        let in_july = sale(
            &employee_id,
            2000,
            SaleStatus::Completed,
            Utc.with_ymd_and_hms(2026, 7, 31, 23, 59, 59).unwrap(),
        );
        // exactly the end boundary: outside, belongs to August
        let at_end = sale(&employee_id, 4000, SaleStatus::Completed, july.end());

        for s in [&at_start, &in_july, &at_end] {
            sales.insert_sale(s).await.unwrap();
        }

        let found = sales
            .commissionable_sales(&employee_id, &july)
            .await
            .unwrap();
        let subtotals: Vec<i64> = found.iter().map(|s| s.subtotal_cents).collect();
        assert_eq!(subtotals, vec![1000, 2000]);

        // the boundary sale shows up in the next period instead
        let august = sales
            .commissionable_sales(&employee_id, &july.next())
            .await
            .unwrap();
        assert_eq!(august.len(), 1);
        assert_eq!(august[0].subtotal_cents, 4000);
    }

    #[tokio::test]
    async fn test_voided_and_foreign_sales_excluded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee_id = setup_employee(&db).await;
        let other_id = setup_employee(&db).await;
        let sales = db.sales();

        let july = Period::new(2026, 7).unwrap();
        let mid_july = Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap();

        sales
            .insert_sale(&sale(&employee_id, 1000, SaleStatus::Completed, mid_july))
            .await
            .unwrap();
        sales
            .insert_sale(&sale(&employee_id, 9000, SaleStatus::Voided, mid_july))
            .await
            .unwrap();
        sales
            .insert_sale(&sale(&other_id, 5000, SaleStatus::Completed, mid_july))
            .await
            .unwrap();

        let found = sales
            .commissionable_sales(&employee_id, &july)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subtotal_cents, 1000);
    }

    #[tokio::test]
    async fn test_no_sales_is_empty_not_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee_id = setup_employee(&db).await;

        let july = Period::new(2026, 7).unwrap();
        let found = db
            .sales()
            .commissionable_sales(&employee_id, &july)
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
