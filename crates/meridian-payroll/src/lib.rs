//! # meridian-payroll: Payroll & Commission Accrual Engine
//!
//! The batch engine for Meridian Back Office: once per period it turns
//! each active employee's attributed sales into a salary record, a
//! reconciling commission ledger, and a queued payslip notification.
//!
//! ## Guarantees
//! - **Idempotent**: re-running a period skips everyone already paid;
//!   the `UNIQUE(employee_id, period)` constraint decides races.
//! - **Isolated**: one employee's failure never blocks another's pay;
//!   the run report says exactly who needs attention.
//! - **Commit first, notify best-effort**: a notification problem can
//!   delay a payslip, never a payment.
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::new(&config.database_path)).await?;
//! let engine = PayrollEngine::new(db, &config);
//! let report = engine.run(Utc::now()).await?;
//! println!("{report}");
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod notifier;
pub mod report;
pub mod scheduler;

pub use config::{NotificationConfig, PayrollConfig};
pub use driver::PayrollEngine;
pub use error::{PayrollError, PayrollResult};
pub use notifier::{
    LogNotifier, NotificationProcessor, NotificationProcessorHandle, PayslipNotifier,
    PayslipPayload,
};
pub use report::{EmployeeOutcome, EmployeeResult, RunReport};
pub use scheduler::{PayrollScheduler, PayrollSchedulerHandle};
