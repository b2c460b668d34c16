//! SQLite entity store adapter.
//!
//! RULE: Only store.rs talks to the database. The engine consumes
//! PortfolioSnapshot values and never executes SQL; the insert helpers
//! exist for ingestion tooling and tests, not for the engine.

use crate::{
    error::EngineResult,
    model::{Customer, Loan, LoanStatus, PaymentRecord, PaymentStatus},
    snapshot::PortfolioSnapshot,
};
use rusqlite::{
    params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
    Connection,
};

pub struct EntityStore {
    conn: Connection,
}

impl EntityStore {
    /// Open (or create) the portfolio database at `path`.
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../migrations/001_schema.sql"))?;
        Ok(())
    }

    // ── Ingestion helpers ──────────────────────────────────────────

    pub fn insert_customer(&self, c: &Customer) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO customer_profile (
                customer_id, acquired_on, credit_score, income, employment_type
            ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                c.customer_id as i64,
                c.acquired_on,
                c.credit_score,
                c.income,
                &c.employment_type,
            ],
        )?;
        Ok(())
    }

    pub fn insert_loan(&self, l: &Loan) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO loan_application (
                loan_id, customer_id, principal, interest_rate, status,
                monthly_installment, applied_on
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                l.loan_id as i64,
                l.customer_id as i64,
                l.principal,
                l.interest_rate,
                l.status,
                l.monthly_installment,
                l.applied_on,
            ],
        )?;
        Ok(())
    }

    pub fn insert_payment(&self, p: &PaymentRecord) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO repayment_history (
                payment_id, loan_id, due_on, paid_on, amount_paid, status, days_past_due
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                p.payment_id as i64,
                p.loan_id as i64,
                p.due_on,
                p.paid_on,
                p.amount_paid,
                p.status,
                p.days_past_due,
            ],
        )?;
        Ok(())
    }

    // ── Read operations ────────────────────────────────────────────

    pub fn load_customers(&self) -> EngineResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, acquired_on, credit_score, income, employment_type
             FROM customer_profile ORDER BY customer_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Customer {
                customer_id: row.get::<_, i64>(0)? as u64,
                acquired_on: row.get(1)?,
                credit_score: row.get(2)?,
                income: row.get(3)?,
                employment_type: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn load_loans(&self) -> EngineResult<Vec<Loan>> {
        let mut stmt = self.conn.prepare(
            "SELECT loan_id, customer_id, principal, interest_rate, status,
                    monthly_installment, applied_on
             FROM loan_application ORDER BY loan_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Loan {
                loan_id: row.get::<_, i64>(0)? as u64,
                customer_id: row.get::<_, i64>(1)? as u64,
                principal: row.get(2)?,
                interest_rate: row.get(3)?,
                status: row.get(4)?,
                monthly_installment: row.get(5)?,
                applied_on: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn load_payments(&self) -> EngineResult<Vec<PaymentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT payment_id, loan_id, due_on, paid_on, amount_paid, status, days_past_due
             FROM repayment_history ORDER BY payment_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PaymentRecord {
                payment_id: row.get::<_, i64>(0)? as u64,
                loan_id: row.get::<_, i64>(1)? as u64,
                due_on: row.get(2)?,
                paid_on: row.get(3)?,
                amount_paid: row.get(4)?,
                status: row.get(5)?,
                days_past_due: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// One consistent snapshot of all three collections, integrity-checked.
    pub fn load_snapshot(&self) -> EngineResult<PortfolioSnapshot> {
        let customers = self.load_customers()?;
        let loans = self.load_loans()?;
        let payments = self.load_payments()?;
        log::debug!(
            "snapshot loaded: {} customers, {} loans, {} payments",
            customers.len(),
            loans.len(),
            payments.len(),
        );
        PortfolioSnapshot::build(customers, loans, payments)
    }
}

// ── SQL text mapping for the status enums ──────────────────────────

impl ToSql for LoanStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for LoanStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown loan status: {s}").into()))
    }
}

impl ToSql for PaymentStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for PaymentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown payment status: {s}").into()))
    }
}
