//! # meridian-db: Database Layer for Meridian Back Office
//!
//! SQLite persistence for the payroll & commission accrual engine:
//! connection pooling, embedded migrations, and the repositories the
//! engine takes as explicit dependencies.
//!
//! ## Key Guarantee
//! The `UNIQUE(employee_id, period)` constraint on `salary_records`
//! lives here. Everything the engine promises about idempotency and
//! safe re-runs bottoms out in that constraint plus the transaction in
//! [`repository::payroll::PayrollRepository::commit_salary`].
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./backoffice.db")).await?;
//! let employees = db.staff().active_employees().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::outbox::NotificationOutboxRepository;
pub use repository::payroll::PayrollRepository;
pub use repository::sales::SalesRepository;
pub use repository::staff::StaffRepository;
