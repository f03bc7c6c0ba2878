//! # Staff Repository
//!
//! Employee enumeration and rate resolution.
//!
//! ## Rate Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rate Resolver                                     │
//! │                                                                         │
//! │  employee_id ──► employees.role_id ──► roles row ──► RateCard          │
//! │                       │                    │                            │
//! │                       │ NULL               │ missing                    │
//! │                       ▼                    ▼                            │
//! │                    Ok(None)             Ok(None)                        │
//! │                                                                         │
//! │  Ok(None) becomes RoleNotFound in the engine: that employee's          │
//! │  computation is aborted and logged, the batch keeps going.             │
//! │                                                                         │
//! │  The RateCard is a value snapshot. Role edits after resolution         │
//! │  cannot reach a computation already in flight, and committed salary    │
//! │  records carry their own base-salary copy.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use meridian_core::{CommissionRate, Employee, Money, RateCard, Role};

/// Repository for employee and role database operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Gets all active employees, the population of a payroll run.
    ///
    /// A failure here is the one batch-fatal condition: with no
    /// employee set there is nothing to iterate.
    pub async fn active_employees(&self) -> DbResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, email, phone, role_id, is_active, created_at, updated_at
            FROM employees
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    /// Gets an employee by ID.
    pub async fn get_employee(&self, id: &str) -> DbResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, email, phone, role_id, is_active, created_at, updated_at
            FROM employees
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Resolves an employee's pay figures as they exist right now.
    ///
    /// ## Returns
    /// * `Ok(Some(RateCard))` - base salary and commission rate snapshot
    /// * `Ok(None)` - the employee has no resolvable role (no role_id,
    ///   or the referenced role row is gone)
    pub async fn resolve_rates(&self, employee_id: &str) -> DbResult<Option<RateCard>> {
        let row = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT r.base_salary_cents, r.commission_bps
            FROM employees e
            JOIN roles r ON r.id = e.role_id
            WHERE e.id = ?1
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(base_cents, bps)| RateCard {
            base_salary: Money::from_cents(base_cents),
            // the roles CHECK constraint bounds commission_bps to 0..=10000
            rate: CommissionRate::from_bps(bps as u32),
        }))
    }

    /// Inserts a role (used by the CRUD layer and the seeder).
    pub async fn insert_role(&self, role: &Role) -> DbResult<()> {
        debug!(id = %role.id, name = %role.name, "Inserting role");

        sqlx::query(
            r#"
            INSERT INTO roles (
                id, name, base_salary_cents, commission_bps, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&role.id)
        .bind(&role.name)
        .bind(role.base_salary_cents)
        .bind(role.commission_bps)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts an employee (used by the CRUD layer and the seeder).
    pub async fn insert_employee(&self, employee: &Employee) -> DbResult<()> {
        debug!(id = %employee.id, name = %employee.name, "Inserting employee");

        sqlx::query(
            r#"
            INSERT INTO employees (
                id, name, email, phone, role_id, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.role_id)
        .bind(employee.is_active)
        .bind(employee.created_at)
        .bind(employee.updated_at)
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
    use uuid::Uuid;

    fn role(name: &str, base_cents: i64, bps: i64) -> Role {
        let now = Utc::now();
        Role {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            base_salary_cents: base_cents,
            commission_bps: bps,
            created_at: now,
            updated_at: now,
        }
    }

    fn employee(name: &str, role_id: Option<&str>, active: bool) -> Employee {
        let now = Utc::now();
        Employee {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: None,
            role_id: role_id.map(|s| s.to_string()),
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_active_employees_filters_inactive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let staff = db.staff();

        let r = role("Sales Associate", 150_000_000, 100);
        staff.insert_role(&r).await.unwrap();

        staff
            .insert_employee(&employee("Alice", Some(&r.id), true))
            .await
            .unwrap();
        staff
            .insert_employee(&employee("Bob", Some(&r.id), false))
            .await
            .unwrap();

        let active = staff.active_employees().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Alice");
    }

    #[tokio::test]
    async fn test_resolve_rates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let staff = db.staff();

        let r = role("Store Manager", 250_000_000, 50);
        staff.insert_role(&r).await.unwrap();

        let with_role = employee("Carol", Some(&r.id), true);
        staff.insert_employee(&with_role).await.unwrap();

        let card = staff.resolve_rates(&with_role.id).await.unwrap().unwrap();
        assert_eq!(card.base_salary, Money::from_cents(250_000_000));
        assert_eq!(card.rate.bps(), 50);
    }

    #[tokio::test]
    async fn test_resolve_rates_without_role() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let staff = db.staff();

        let no_role = employee("Dave", None, true);
        staff.insert_employee(&no_role).await.unwrap();

        assert!(staff.resolve_rates(&no_role.id).await.unwrap().is_none());

        // unknown employee resolves to None as well, the engine turns
        // both into RoleNotFound
        assert!(staff.resolve_rates("missing").await.unwrap().is_none());
    }
}
