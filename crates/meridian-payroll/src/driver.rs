//! # Payroll Run Driver
//!
//! Orchestrates one payroll run across the active employee population.
//!
//! ## Per-Employee Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Employee, One Period                            │
//! │                                                                         │
//! │  salary_exists? ──yes──► SKIP (already paid)                           │
//! │        │no                                                              │
//! │        ▼                                                                │
//! │  resolve_rates ──none──► FAIL RoleNotFound (others keep going)         │
//! │        │some                                                            │
//! │        ▼                                                                │
//! │  commissionable_sales ──► Σ subtotals ──► compute_salary               │
//! │        │                                       │                        │
//! │        │                                       ▼                        │
//! │        └────────────────────────► allocate_commission (per-sale)       │
//! │                                                │                        │
//! │                                                ▼                        │
//! │  commit_salary (one transaction; UNIQUE(employee, period) decides      │
//! │  races - a violation here is a SKIP, the other run already paid)       │
//! │                                                │                        │
//! │                                                ▼                        │
//! │  enqueue payslip notification ── best effort, failure logged,          │
//! │                                  employee stays PAID                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Employees are processed with bounded concurrency; one employee's
//! outcome never influences another's. The only batch-fatal condition
//! is failing to enumerate the population at the start.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use meridian_core::{
    allocate_commission, compute_salary, CommissionLedgerEntry, Employee, Money, Period,
    PeriodPolicy, SalaryRecord,
};
use meridian_db::Database;

use crate::config::PayrollConfig;
use crate::error::{PayrollError, PayrollResult};
use crate::notifier::PayslipPayload;
use crate::report::{EmployeeOutcome, EmployeeResult, RunReport};

// =============================================================================
// Payroll Engine
// =============================================================================

/// Drives payroll runs: resolves the period, walks the active
/// employees, and produces a [`RunReport`].
#[derive(Clone)]
pub struct PayrollEngine {
    /// Database connection.
    db: Database,

    /// Maps a trigger instant to the payable period.
    policy: PeriodPolicy,

    /// How many employees are in flight at once.
    concurrency: usize,
}

impl PayrollEngine {
    /// Creates a new engine from configuration.
    pub fn new(db: Database, config: &PayrollConfig) -> Self {
        PayrollEngine {
            db,
            policy: config.period_policy,
            concurrency: config.concurrency.max(1),
        }
    }

    /// Runs payroll for the period the configured policy derives from
    /// `now`.
    ///
    /// Taking the instant as an argument keeps the engine clock-free:
    /// the scheduler and the binaries pass `Utc::now()`, tests pass
    /// whatever they need.
    pub async fn run(&self, now: DateTime<Utc>) -> PayrollResult<RunReport> {
        let period = self.policy.resolve(now);
        self.run_for_period(&period).await
    }

    /// Runs payroll for an explicit period.
    ///
    /// Safe to call repeatedly or concurrently for the same period:
    /// every already-paid employee comes back as a skip.
    pub async fn run_for_period(&self, period: &Period) -> PayrollResult<RunReport> {
        let started_at = Utc::now();

        let employees = self
            .db
            .staff()
            .active_employees()
            .await
            .map_err(PayrollError::EmployeeEnumeration)?;

        info!(
            period = %period,
            employees = employees.len(),
            "Starting payroll run"
        );

        let mut results: Vec<EmployeeResult> = stream::iter(employees)
            .map(|employee| {
                let engine = self.clone();
                let period = *period;
                async move {
                    let outcome = engine.process_employee(&employee, &period).await;
                    EmployeeResult {
                        employee_id: employee.id,
                        employee_name: employee.name,
                        outcome,
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        // completion order is nondeterministic; the report is not
        results.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));

        let report = RunReport {
            period: period.label(),
            started_at,
            finished_at: Utc::now(),
            results,
        };

        info!(
            period = %period,
            paid = report.paid(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Payroll run finished"
        );

        Ok(report)
    }

    /// Processes one employee, translating errors into report
    /// outcomes. Nothing escapes to the batch level from here.
    async fn process_employee(&self, employee: &Employee, period: &Period) -> EmployeeOutcome {
        match self.pay_employee(employee, period).await {
            Ok(outcome) => outcome,
            Err(PayrollError::AlreadyGenerated { .. }) => {
                debug!(employee_id = %employee.id, period = %period, "Already paid, skipping");
                EmployeeOutcome::Skipped
            }
            Err(e) => {
                warn!(employee_id = %employee.id, period = %period, error = %e, "Employee payroll failed");
                EmployeeOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// The fallible pipeline for one employee.
    async fn pay_employee(
        &self,
        employee: &Employee,
        period: &Period,
    ) -> PayrollResult<EmployeeOutcome> {
        // Gate: cheap pre-check. The commit below is what actually
        // guarantees at-most-once under concurrency.
        if self.db.payroll().salary_exists(&employee.id, period).await? {
            return Err(PayrollError::AlreadyGenerated {
                employee_id: employee.id.clone(),
                period: period.label(),
            });
        }

        let rates = self
            .db
            .staff()
            .resolve_rates(&employee.id)
            .await?
            .ok_or_else(|| PayrollError::RoleNotFound {
                employee_id: employee.id.clone(),
            })?;

        let sales = self
            .db
            .sales()
            .commissionable_sales(&employee.id, period)
            .await?;
        let subtotals: Vec<Money> = sales.iter().map(|s| s.subtotal()).collect();
        let sales_total: Money = subtotals.iter().copied().sum();

        let breakdown = compute_salary(&rates, sales_total);
        let amounts = allocate_commission(breakdown.commission, &subtotals);

        let now = Utc::now();
        let record = SalaryRecord {
            id: Uuid::new_v4().to_string(),
            employee_id: employee.id.clone(),
            period: period.label(),
            base_salary_cents: breakdown.base.cents(),
            commission_cents: breakdown.commission.cents(),
            total_cents: breakdown.total.cents(),
            created_at: now,
        };

        let entries: Vec<CommissionLedgerEntry> = sales
            .iter()
            .zip(amounts)
            .map(|(sale, amount)| CommissionLedgerEntry {
                id: Uuid::new_v4().to_string(),
                employee_id: employee.id.clone(),
                sale_id: sale.id.clone(),
                period: period.label(),
                amount_cents: amount.cents(),
                created_at: now,
            })
            .collect();

        match self.db.payroll().commit_salary(&record, &entries).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => {
                // a concurrent run won the race between gate and commit
                return Err(PayrollError::AlreadyGenerated {
                    employee_id: employee.id.clone(),
                    period: period.label(),
                });
            }
            Err(e) => return Err(PayrollError::Persistence(e)),
        }

        debug!(
            employee_id = %employee.id,
            period = %period,
            total_cents = record.total_cents,
            sales = entries.len(),
            "Salary committed"
        );

        let notified = match self.enqueue_payslip(employee, &record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    employee_id = %employee.id,
                    salary_record_id = %record.id,
                    error = %e,
                    "Failed to queue payslip notification; pay is committed"
                );
                false
            }
        };

        Ok(EmployeeOutcome::Paid {
            salary_record_id: record.id,
            total_cents: record.total_cents,
            notified,
        })
    }

    /// Queues the payslip notification for a committed record.
    ///
    /// Best effort: the salary record is already committed, so the
    /// caller logs the error and reports the employee as paid but
    /// unnotified. Nothing here is allowed to disturb the commit.
    async fn enqueue_payslip(
        &self,
        employee: &Employee,
        record: &SalaryRecord,
    ) -> PayrollResult<()> {
        let payload = PayslipPayload {
            salary_record_id: record.id.clone(),
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            email: employee.email.clone(),
            period: record.period.clone(),
            base_salary_cents: record.base_salary_cents,
            commission_cents: record.commission_cents,
            total_cents: record.total_cents,
        };
        let json = serde_json::to_string(&payload)?;

        self.db
            .notifications()
            .enqueue(&record.id, &employee.id, &json)
            .await
            .map_err(|e| PayrollError::Notification(e.to_string()))?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
