//! # Domain Types
//!
//! Core domain types used throughout Meridian Back Office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  LONG-LIVED (CRUD layer owns)        ENGINE INPUT (read-only)          │
//! │  ┌─────────────────┐                 ┌─────────────────┐               │
//! │  │     Role        │◄───────────────┐│     Sale        │               │
//! │  │  base salary    │                ││  employee_id    │               │
//! │  │  commission bps │                ││  subtotal/tax   │               │
//! │  └─────────────────┘                │└────────┬────────┘               │
//! │  ┌─────────────────┐                │         │                        │
//! │  │   Employee      │────────────────┘┌────────▼────────┐               │
//! │  │  role_id (opt)  │                 │    SaleItem     │               │
//! │  └─────────────────┘                 └─────────────────┘               │
//! │                                                                         │
//! │  ENGINE OUTPUT (immutable once created)                                │
//! │  ┌─────────────────┐  ┌───────────────────────┐  ┌──────────────────┐ │
//! │  │  SalaryRecord   │  │ CommissionLedgerEntry │  │ NotificationOut- │ │
//! │  │  UNIQUE         │  │ per-sale attribution  │  │ boxEntry         │ │
//! │  │  (employee,     │  │ sums to the record's  │  │ queued payslip   │ │
//! │  │   period)       │  │ commission exactly    │  │                  │ │
//! │  └─────────────────┘  └───────────────────────┘  └──────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rate Snapshot Pattern
//! `SalaryRecord` stores the base salary that applied *at computation
//! time*, not a pointer to the role. Changing a role's pay later never
//! rewrites payroll history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::error::{CoreError, CoreResult};

// =============================================================================
// Commission Rate
// =============================================================================

/// Commission rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 100 bps = 1% (a typical sales commission)
///
/// Integer bps keep the commission computation in pure integer math;
/// the rate never touches a float on the money path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// Creates a commission rate, validating the 0..=10000 bound.
    pub fn new(bps: u32) -> CoreResult<Self> {
        if bps > crate::MAX_COMMISSION_BPS {
            return Err(CoreError::RateOutOfBounds { bps });
        }
        Ok(CommissionRate(bps))
    }

    /// Creates a rate from basis points without the bound check.
    ///
    /// For values already guaranteed in range (the database CHECK
    /// constraint enforces the same 0..=10000 bound on storage).
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero commission rate.
    #[inline]
    pub const fn zero() -> Self {
        CommissionRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::zero()
    }
}

// =============================================================================
// Role
// =============================================================================

/// A pay grade: base salary plus commission percentage.
///
/// Roles are long-lived and owned by the CRUD layer. The engine only
/// reads them, and only through the rate resolver, which snapshots the
/// figures into a [`RateCard`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Role {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name ("Sales Associate", "Store Manager").
    pub name: String,

    /// Monthly base salary in cents.
    pub base_salary_cents: i64,

    /// Commission rate in basis points (100 = 1%).
    pub commission_bps: i64,

    /// When the role was created.
    pub created_at: DateTime<Utc>,

    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Returns the base salary as a Money type.
    #[inline]
    pub fn base_salary(&self) -> Money {
        Money::from_cents(self.base_salary_cents)
    }

    /// Returns the commission rate.
    #[inline]
    pub fn commission_rate(&self) -> CommissionRate {
        CommissionRate::from_bps(self.commission_bps as u32)
    }
}

// =============================================================================
// Employee
// =============================================================================

/// An employee on the payroll.
///
/// `role_id` is optional: an employee whose role was never assigned or
/// whose role row is gone fails rate resolution with `RoleNotFound`,
/// which the routine records without blocking anyone else's pay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Employee {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Full name.
    pub name: String,

    /// Contact email for payslip notifications.
    pub email: Option<String>,

    /// Contact phone.
    pub phone: Option<String>,

    /// Current role reference. May change over time; salary records
    /// snapshot the figures that applied when they were computed.
    pub role_id: Option<String>,

    /// Whether the employee is on the active payroll.
    pub is_active: bool,

    /// When the employee was created.
    pub created_at: DateTime<Utc>,

    /// When the employee was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Rate Card
// =============================================================================

/// The pay figures resolved for one employee at computation time.
///
/// This is the snapshot the salary computation runs on. It is a value,
/// not a reference: later role edits cannot reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCard {
    /// Monthly base salary.
    pub base_salary: Money,

    /// Commission rate on commissionable sales.
    pub rate: CommissionRate,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// Only `Completed` sales are commissionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale has been paid and finalized.
    Completed,
    /// Sale was cancelled/refunded. Never commissionable.
    Voided,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale transaction attributed to an employee.
///
/// Read-only input to the payroll engine; created by the sales module
/// at transaction time and never mutated here.
///
/// Invariant (enforced at creation by the sales module):
/// `subtotal_cents + tax_cents == total_cents`, and `subtotal_cents`
/// equals the sum of the line items' `line_total_cents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub employee_id: String,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// The commissionable amount: sub-total, tax excluded.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze item data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

// =============================================================================
// Salary Record
// =============================================================================

/// One employee's pay for one period. Immutable once created.
///
/// At most one record exists per (employee, period); the database
/// enforces this with a UNIQUE constraint. The engine never updates or
/// deletes a record; a correction is a new, superseding record created
/// outside the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalaryRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The employee this record pays.
    pub employee_id: String,

    /// Period identifier, `YYYY-MM`.
    pub period: String,

    /// Base salary snapshot at computation time.
    pub base_salary_cents: i64,

    /// Commission earned on attributed sales in the period.
    pub commission_cents: i64,

    /// base + commission.
    pub total_cents: i64,

    /// When the record was committed.
    pub created_at: DateTime<Utc>,
}

impl SalaryRecord {
    #[inline]
    pub fn base_salary(&self) -> Money {
        Money::from_cents(self.base_salary_cents)
    }

    #[inline]
    pub fn commission(&self) -> Money {
        Money::from_cents(self.commission_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Commission Ledger Entry
// =============================================================================

/// Commission attributed to one sale within one period.
///
/// Reconciliation invariant: the entries for an (employee, period) sum
/// exactly to the commission on the matching [`SalaryRecord`]. The
/// allocation in `compute.rs` guarantees this by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CommissionLedgerEntry {
    pub id: String,
    pub employee_id: String,
    pub sale_id: String,
    pub period: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Notification Outbox Entry
// =============================================================================

/// A queued payslip notification.
///
/// Written after the salary commit succeeds, delivered by the
/// notification processor on its own schedule. Losing or retrying a
/// notification never touches the committed money figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct NotificationOutboxEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The committed salary record this notification carries.
    pub salary_record_id: String,

    /// The employee to notify.
    pub employee_id: String,

    /// JSON serialization of the payslip payload.
    pub payload: String,

    /// Delivery attempts so far.
    pub attempts: i64,

    /// Last delivery error, if any.
    pub last_error: Option<String>,

    /// When the notification was enqueued.
    pub created_at: DateTime<Utc>,

    /// When delivery was last attempted.
    pub attempted_at: Option<DateTime<Utc>>,

    /// When delivery succeeded. NULL means pending.
    pub sent_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_rate_bounds() {
        assert!(CommissionRate::new(0).is_ok());
        assert!(CommissionRate::new(10_000).is_ok());
        assert!(CommissionRate::new(10_001).is_err());
    }

    #[test]
    fn test_commission_rate_percentage_display() {
        let rate = CommissionRate::from_bps(100);
        assert_eq!(rate.percentage(), 1.0);

        let rate = CommissionRate::from_bps(250);
        assert_eq!(rate.percentage(), 2.5);
    }

    #[test]
    fn test_role_accessors() {
        let now = Utc::now();
        let role = Role {
            id: "role-1".to_string(),
            name: "Sales Associate".to_string(),
            base_salary_cents: 150_000_000,
            commission_bps: 100,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(role.base_salary(), Money::from_cents(150_000_000));
        assert_eq!(role.commission_rate().bps(), 100);
    }
}
