//! # Repository Layer
//!
//! One repository per concern, each a thin `Clone`-able handle over
//! the shared pool:
//!
//! - [`staff`] - employees and rate resolution
//! - [`sales`] - commissionable-sales reads (the engine never writes sales)
//! - [`payroll`] - salary records + commission ledger, the idempotency guard
//! - [`outbox`] - queued payslip notifications

pub mod outbox;
pub mod payroll;
pub mod sales;
pub mod staff;
