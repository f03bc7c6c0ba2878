//! # Error Types
//!
//! Domain-specific error types for meridian-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  meridian-core errors (this file)                                      │
//! │  └── CoreError        - Domain rule violations                         │
//! │                                                                         │
//! │  meridian-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  meridian-payroll errors (separate crate)                              │
//! │  └── PayrollError     - Per-employee and batch-level failures          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (employee ID, period, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent domain rule violations: a commission rate
/// outside its bound, a calendar month that does not exist.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Commission rate is outside the allowed 0..=10000 bps range.
    #[error("Commission rate {bps} bps exceeds 100% (10000 bps)")]
    RateOutOfBounds { bps: u32 },

    /// Not a valid calendar month.
    #[error("Invalid period: year {year}, month {month}")]
    InvalidPeriod { year: i32, month: u32 },

    /// Period label could not be parsed (expected `YYYY-MM`).
    #[error("Invalid period label '{0}': expected YYYY-MM")]
    InvalidPeriodLabel(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
