//! # Seed Data Generator
//!
//! Populates the database with demo roles, employees, and a month of
//! sales so a payroll run has something to chew on.
//!
//! ## Usage
//! ```bash
//! # Seed into the default database
//! cargo run -p meridian-db --bin seed
//!
//! # Specify database path
//! cargo run -p meridian-db --bin seed -- --db ./data/backoffice.db
//! ```
//!
//! ## Generated Data
//! - 3 roles with different base salaries and commission rates
//! - 8 employees (one deliberately left without a role, one inactive)
//! - ~200 completed sales spread across the previous calendar month

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use meridian_core::{Employee, Period, PeriodPolicy, Role, Sale, SaleStatus};
use meridian_db::{Database, DbConfig};

const ROLES: &[(&str, i64, i64)] = &[
    // (name, base_salary_cents, commission_bps)
    ("Sales Associate", 150_000_000, 100),
    ("Senior Associate", 180_000_000, 150),
    ("Store Manager", 250_000_000, 50),
];

const EMPLOYEES: &[(&str, usize)] = &[
    // (name, role index into ROLES)
    ("Amara Okafor", 0),
    ("Ben Castillo", 0),
    ("Chen Wei", 1),
    ("Dilnoza Karimova", 1),
    ("Elif Demir", 2),
    ("Farid Haddad", 0),
    ("Priya Nair", 1),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = parse_db_path().unwrap_or_else(|| "./backoffice.db".to_string());
    println!("Seeding demo data into {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let now = Utc::now();

    // Roles
    let mut role_ids = Vec::new();
    for (name, base_cents, bps) in ROLES {
        let role = Role {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            base_salary_cents: *base_cents,
            commission_bps: *bps,
            created_at: now,
            updated_at: now,
        };
        db.staff().insert_role(&role).await?;
        role_ids.push(role.id);
    }

    // Employees
    let mut employee_ids = Vec::new();
    for (i, (name, role_idx)) in EMPLOYEES.iter().enumerate() {
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: Some(format!("employee{i}@meridian.example")),
            phone: None,
            role_id: Some(role_ids[*role_idx].clone()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.staff().insert_employee(&employee).await?;
        employee_ids.push(employee.id);
    }

    // One employee with no role: exercises the RoleNotFound path
    db.staff()
        .insert_employee(&Employee {
            id: Uuid::new_v4().to_string(),
            name: "Unassigned Newhire".to_string(),
            email: None,
            phone: None,
            role_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .await?;

    // Sales across the previous month (what the default policy pays)
    let period = PeriodPolicy::PreviousMonth.resolve(now);
    let count = seed_sales(&db, &employee_ids, &period).await?;

    println!(
        "Seeded {} roles, {} employees, {} sales in {}",
        ROLES.len(),
        EMPLOYEES.len() + 1,
        count,
        period
    );
    Ok(())
}

/// Spreads deterministic pseudo-random sales across the period.
async fn seed_sales(
    db: &Database,
    employee_ids: &[String],
    period: &Period,
) -> Result<usize, Box<dyn std::error::Error>> {
    let span_secs = (period.end() - period.start()).num_seconds();
    let mut count = 0;

    for i in 0..200u64 {
        // cheap LCG so runs are reproducible without a rand dependency
        let r = i.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let employee = &employee_ids[(r % employee_ids.len() as u64) as usize];
        let offset = (r >> 8) as i64 % span_secs;
        let subtotal = 50_000 + ((r >> 16) % 20_000_000) as i64;
        let tax = subtotal / 10;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            employee_id: employee.clone(),
            status: SaleStatus::Completed,
            subtotal_cents: subtotal,
            tax_cents: tax,
            total_cents: subtotal + tax,
            created_at: period.start() + Duration::seconds(offset),
        };
        db.sales().insert_sale(&sale).await?;
        count += 1;
    }

    Ok(count)
}

fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1).cloned())
}
