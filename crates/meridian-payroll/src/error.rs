//! # Engine Error Types
//!
//! The per-employee and batch-level error taxonomy.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Catches What                                     │
//! │                                                                         │
//! │  RoleNotFound        → per-employee FAILURE, batch continues           │
//! │  AlreadyGenerated    → per-employee SKIP (not an error at all)         │
//! │  Persistence         → per-employee FAILURE, retryable by re-running   │
//! │  Notification        → logged; the employee is still PAID              │
//! │  EmployeeEnumeration → the ONLY batch-fatal condition                  │
//! │                                                                         │
//! │  Everything except EmployeeEnumeration is caught at the driver        │
//! │  boundary and recorded in the run report.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use meridian_db::DbError;

/// Payroll engine errors.
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Employee has no resolvable role: no role assigned, or the
    /// referenced role row is gone. Aborts that employee only.
    #[error("Employee {employee_id} has no resolvable role")]
    RoleNotFound { employee_id: String },

    /// A salary record already exists for this (employee, period).
    /// Raised when the gate or the uniqueness constraint trips; the
    /// driver turns it into a skip, never a failure.
    #[error("Salary already generated for employee {employee_id} in {period}")]
    AlreadyGenerated {
        employee_id: String,
        period: String,
    },

    /// Storage error during read or commit. Retryable at the
    /// per-employee level: a re-run picks up exactly the employees
    /// that failed.
    #[error("Persistence failure: {0}")]
    Persistence(DbError),

    /// Notification enqueue/delivery failed. Best-effort: never rolls
    /// back a committed salary record.
    #[error("Notification failure: {0}")]
    Notification(String),

    /// The active-employee set could not be enumerated. With no
    /// population to iterate there is no run; this aborts the batch.
    #[error("Failed to enumerate active employees: {0}")]
    EmployeeEnumeration(DbError),

    /// Payslip payload could not be serialized.
    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A control channel to a background task closed unexpectedly.
    #[error("Channel error: {0}")]
    Channel(String),
}

impl From<DbError> for PayrollError {
    fn from(err: DbError) -> Self {
        PayrollError::Persistence(err)
    }
}

/// Result type for engine operations.
pub type PayrollResult<T> = Result<T, PayrollError>;
