//! # meridian-core: Pure Business Logic for Meridian Back Office
//!
//! This crate is the **heart** of the payroll & commission accrual
//! engine. It contains all business logic as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Meridian Back Office Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               meridian-payroll (Engine)                         │   │
//! │  │    routine driver, scheduler, notification outbox processor     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ meridian-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  period   │  │  compute  │  │   │
//! │  │   │ Role, Sale│  │   Money   │  │  Period   │  │  salary + │  │   │
//! │  │   │ SalaryRec │  │ (cents)   │  │ [start,   │  │ allocation│  │   │
//! │  │   │ LedgerEnt │  │           │  │   end)    │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 meridian-db (Database Layer)                    │   │
//! │  │          SQLite queries, migrations, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Role, Employee, Sale, SalaryRecord, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`period`] - Calendar-month pay periods with half-open bounds
//! - [`compute`] - Salary computation and commission allocation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; callers pass "now"
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Round Once**: the single rounding point lives in [`compute`]

// =============================================================================
// Module Declarations
// =============================================================================

pub mod compute;
pub mod error;
pub mod money;
pub mod period;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use meridian_core::Money` instead of
// `use meridian_core::money::Money`

pub use compute::{allocate_commission, compute_salary, SalaryBreakdown};
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use period::{Period, PeriodPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Upper bound for commission rates: 10000 bps = 100%.
///
/// A role paying more than its sales in commission is a data entry
/// error; the database CHECK constraint mirrors this bound.
pub const MAX_COMMISSION_BPS: u32 = 10_000;
