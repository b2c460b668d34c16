//! Entity records for the three source collections.
//!
//! RULE: The engine never mutates these. Ingestion owns identity and
//! lifecycle; the engine reads a snapshot and returns aggregates.

use crate::types::{CustomerId, LoanId, PaymentId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id:     CustomerId,
    pub acquired_on:     NaiveDate,
    pub credit_score:    i32,
    pub income:          f64,
    pub employment_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id:             LoanId,
    pub customer_id:         CustomerId,
    pub principal:           f64,
    pub interest_rate:       f64,
    pub status:              LoanStatus,
    pub monthly_installment: f64,
    pub applied_on:          NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Applied,
    Approved,
    Rejected,
    Closed,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied  => "applied",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Closed   => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "applied"  => Some(Self::Applied),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "closed"   => Some(Self::Closed),
            _          => None,
        }
    }
}

/// One scheduled repayment. `paid_on = None` means unpaid as of
/// ingestion time; `days_past_due` is 0 for on-time payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id:    PaymentId,
    pub loan_id:       LoanId,
    pub due_on:        NaiveDate,
    pub paid_on:       Option<NaiveDate>,
    pub amount_paid:   f64,
    pub status:        PaymentStatus,
    pub days_past_due: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    OnTime,
    Late,
    Missed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTime => "on_time",
            Self::Late   => "late",
            Self::Missed => "missed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "on_time" => Some(Self::OnTime),
            "late"    => Some(Self::Late),
            "missed"  => Some(Self::Missed),
            _         => None,
        }
    }

    /// Display label used in reports ("On Time", "Late", "Missed").
    pub fn label(&self) -> &'static str {
        match self {
            Self::OnTime => "On Time",
            Self::Late   => "Late",
            Self::Missed => "Missed",
        }
    }
}
