//! # Pay Period
//!
//! Calendar-month pay periods with half-open time bounds.
//!
//! ## Boundary Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Half-Open Period Bounds [start, end)                   │
//! │                                                                         │
//! │   2026-07                          2026-08                              │
//! │   ├────────────────────────────────┼──────────────────────────────►     │
//! │   │                                │                                    │
//! │   Jul 1 00:00:00 UTC               Aug 1 00:00:00 UTC                   │
//! │                                                                         │
//! │   A sale timestamped EXACTLY Aug 1 00:00:00 belongs to 2026-08,        │
//! │   never to 2026-07. No sale can be counted twice, no sale can          │
//! │   fall in a gap.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Period Policy
//! The payroll routine derives "which period do we pay?" from the clock
//! via an explicit [`PeriodPolicy`]. The default pays the most recently
//! *completed* calendar month: a run on 2026-08-30 pays 2026-07.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Period
// =============================================================================

/// A calendar-month pay period.
///
/// Fields are private: every `Period` in the system went through
/// [`Period::new`] and holds a real calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, validating the calendar month.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::period::Period;
    ///
    /// let period = Period::new(2026, 7).unwrap();
    /// assert_eq!(period.label(), "2026-07");
    ///
    /// assert!(Period::new(2026, 13).is_err());
    /// ```
    pub fn new(year: i32, month: u32) -> CoreResult<Self> {
        if !(1..=12).contains(&month) || !(1970..=9999).contains(&year) {
            return Err(CoreError::InvalidPeriod { year, month });
        }
        Ok(Period { year, month })
    }

    /// Parses a period from its `YYYY-MM` label.
    pub fn parse(label: &str) -> CoreResult<Self> {
        let mut parts = label.splitn(2, '-');
        let year = parts.next().and_then(|s| s.parse::<i32>().ok());
        let month = parts.next().and_then(|s| s.parse::<u32>().ok());

        match (year, month) {
            (Some(year), Some(month)) => Period::new(year, month),
            _ => Err(CoreError::InvalidPeriodLabel(label.to_string())),
        }
    }

    /// The period containing the given instant.
    pub fn containing(ts: DateTime<Utc>) -> Self {
        // year/month of a valid DateTime are always a valid period
        Period {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// The year component.
    #[inline]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The month component (1-12).
    #[inline]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The period identifier used in storage and reports: `YYYY-MM`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Inclusive start of the period: first instant of the month, UTC.
    pub fn start(&self) -> DateTime<Utc> {
        month_start(self.year, self.month)
    }

    /// Exclusive end of the period: first instant of the *next* month.
    ///
    /// A timestamp equal to `end()` is outside this period.
    pub fn end(&self) -> DateTime<Utc> {
        let next = self.next();
        month_start(next.year, next.month)
    }

    /// The following period (handles December → January).
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Period {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Period {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding period (handles January → December).
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Period {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Period {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Whether the instant falls within `[start, end)`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start() <= ts && ts < self.end()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// First instant of a month in UTC.
fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    // Invariant: (year, month) validated by Period::new / chrono itself
    let date = NaiveDate::from_ymd_opt(year, month, 1)
        .expect("Period holds a validated calendar month");
    DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).expect("midnight exists"), Utc)
}

// =============================================================================
// Period Policy
// =============================================================================

/// How the routine maps "now" to the payable period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodPolicy {
    /// Pay the most recently completed calendar month (default).
    ///
    /// A scheduled run early in August pays July. This is the policy
    /// for the usual "close the month, then pay it" cadence.
    #[default]
    PreviousMonth,

    /// Pay the month the run falls in.
    ///
    /// For operators who trigger payroll on the last day of the month
    /// after close of business.
    CurrentMonth,
}

impl PeriodPolicy {
    /// Resolves the payable period for the given instant.
    pub fn resolve(&self, now: DateTime<Utc>) -> Period {
        let current = Period::containing(now);
        match self {
            PeriodPolicy::PreviousMonth => current.previous(),
            PeriodPolicy::CurrentMonth => current,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
