//! # Run Report
//!
//! The per-run account of what happened to every active employee.
//!
//! A payroll run never stops on a per-employee problem; the report is
//! where those problems surface. Operators read it (or its JSON form)
//! to decide whether a re-run is needed; a re-run pays exactly the
//! employees that failed, because everyone paid or skipped is guarded
//! by the uniqueness constraint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

// =============================================================================
// Per-Employee Outcome
// =============================================================================

/// What happened to one employee during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EmployeeOutcome {
    /// Salary committed. `notified` is false when the payslip could
    /// not be queued; the pay itself is unaffected.
    Paid {
        salary_record_id: String,
        total_cents: i64,
        notified: bool,
    },

    /// A salary record already existed for the period (idempotent
    /// re-run, or a concurrent run won the commit race).
    Skipped,

    /// This employee could not be paid. Everyone else proceeds.
    Failed { reason: String },
}

/// One line of the run report.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeResult {
    pub employee_id: String,
    pub employee_name: String,
    #[serde(flatten)]
    pub outcome: EmployeeOutcome,
}

// =============================================================================
// Run Report
// =============================================================================

/// The full account of one payroll run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Period label, `YYYY-MM`.
    pub period: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,

    /// One entry per active employee, sorted by name.
    pub results: Vec<EmployeeResult>,
}

impl RunReport {
    /// Number of employees paid in this run.
    pub fn paid(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, EmployeeOutcome::Paid { .. }))
            .count()
    }

    /// Number of employees skipped as already paid.
    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, EmployeeOutcome::Skipped))
            .count()
    }

    /// Number of employees that failed.
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, EmployeeOutcome::Failed { .. }))
            .count()
    }

    /// True when no employee failed. Skips are fine: a fully-skipped
    /// run is the normal shape of an idempotent re-run.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Payroll run for {}: {} paid, {} skipped, {} failed",
            self.period,
            self.paid(),
            self.skipped(),
            self.failed()
        )?;
        for result in &self.results {
            match &result.outcome {
                EmployeeOutcome::Paid {
                    total_cents,
                    notified,
                    ..
                } => writeln!(
                    f,
                    "  PAID    {} ({}) total {}.{:02}{}",
                    result.employee_name,
                    result.employee_id,
                    total_cents / 100,
                    total_cents % 100,
                    if *notified { "" } else { " [notification not queued]" }
                )?,
                EmployeeOutcome::Skipped => writeln!(
                    f,
                    "  SKIPPED {} ({}) already paid",
                    result.employee_name, result.employee_id
                )?,
                EmployeeOutcome::Failed { reason } => writeln!(
                    f,
                    "  FAILED  {} ({}): {}",
                    result.employee_name, result.employee_id, reason
                )?,
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: EmployeeOutcome) -> EmployeeResult {
        EmployeeResult {
            employee_id: format!("id-{name}"),
            employee_name: name.to_string(),
            outcome,
        }
    }

    fn sample_report() -> RunReport {
        let now = Utc::now();
        RunReport {
            period: "2026-07".to_string(),
            started_at: now,
            finished_at: now,
            results: vec![
                result(
                    "Amara",
                    EmployeeOutcome::Paid {
                        salary_record_id: "rec-1".to_string(),
                        total_cents: 150_500_000,
                        notified: true,
                    },
                ),
                result("Ben", EmployeeOutcome::Skipped),
                result(
                    "Chen",
                    EmployeeOutcome::Failed {
                        reason: "Employee id-Chen has no resolvable role".to_string(),
                    },
                ),
            ],
        }
    }

    #[test]
    fn test_counts() {
        let report = sample_report();
        assert_eq!(report.paid(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_all_skipped_run_is_clean() {
        let now = Utc::now();
        let report = RunReport {
            period: "2026-07".to_string(),
            started_at: now,
            finished_at: now,
            results: vec![result("Ben", EmployeeOutcome::Skipped)],
        };
        assert!(report.is_clean());
    }

    #[test]
    fn test_display_summary_line() {
        let rendered = sample_report().to_string();
        assert!(rendered.starts_with("Payroll run for 2026-07: 1 paid, 1 skipped, 1 failed"));
        assert!(rendered.contains("PAID    Amara"));
        assert!(rendered.contains("already paid"));
    }

    #[test]
    fn test_serializes_with_flattened_outcome() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["results"][0]["outcome"], "paid");
        assert_eq!(json["results"][1]["outcome"], "skipped");
        assert_eq!(json["results"][2]["reason"]
            .as_str()
            .unwrap()
            .contains("no resolvable role"), true);
    }
}
