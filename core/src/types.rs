//! Shared primitive types used across the entire engine.

/// A stable, unique identifier for a customer.
pub type CustomerId = u64;

/// A stable, unique identifier for a loan.
pub type LoanId = u64;

/// A stable, unique identifier for a single scheduled repayment.
pub type PaymentId = u64;
