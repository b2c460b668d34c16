//! Immutable portfolio snapshot — the unit every analysis runs over.
//!
//! RULES:
//!   - One engine call works over exactly one snapshot.
//!   - build() validates referential integrity and fails loud: a loan or
//!     payment pointing at a missing parent aborts the load. Silently
//!     dropping orphans would shrink percentage denominators.
//!   - Nothing here is mutated after build(); components only read.

use crate::{
    error::{EngineError, EngineResult},
    model::{Customer, Loan, PaymentRecord},
    types::{CustomerId, LoanId},
};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug)]
pub struct PortfolioSnapshot {
    customers: Vec<Customer>,
    loans:     Vec<Loan>,
    payments:  Vec<PaymentRecord>,

    customer_index:       HashMap<CustomerId, usize>,
    loan_owner:           HashMap<LoanId, CustomerId>,
    payments_by_customer: HashMap<CustomerId, Vec<usize>>,
}

impl PortfolioSnapshot {
    /// Assemble a snapshot from the three raw collections.
    ///
    /// Builds the loan→customer join index and the per-customer payment
    /// index in two passes, erroring on the first orphan found.
    pub fn build(
        customers: Vec<Customer>,
        loans: Vec<Loan>,
        payments: Vec<PaymentRecord>,
    ) -> EngineResult<Self> {
        let customer_index: HashMap<CustomerId, usize> = customers
            .iter()
            .enumerate()
            .map(|(i, c)| (c.customer_id, i))
            .collect();

        let mut loan_owner = HashMap::with_capacity(loans.len());
        for loan in &loans {
            if !customer_index.contains_key(&loan.customer_id) {
                return Err(EngineError::ReferentialIntegrity {
                    entity: "loan",
                    id: loan.loan_id,
                    parent: format!("customer {}", loan.customer_id),
                });
            }
            loan_owner.insert(loan.loan_id, loan.customer_id);
        }

        let mut payments_by_customer: HashMap<CustomerId, Vec<usize>> = HashMap::new();
        for (i, payment) in payments.iter().enumerate() {
            match loan_owner.get(&payment.loan_id) {
                Some(owner) => payments_by_customer.entry(*owner).or_default().push(i),
                None => {
                    return Err(EngineError::ReferentialIntegrity {
                        entity: "payment",
                        id: payment.payment_id,
                        parent: format!("loan {}", payment.loan_id),
                    });
                }
            }
        }

        Ok(Self {
            customers,
            loans,
            payments,
            customer_index,
            loan_owner,
            payments_by_customer,
        })
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customer_index.get(&id).map(|&i| &self.customers[i])
    }

    pub fn owner_of_loan(&self, id: LoanId) -> Option<CustomerId> {
        self.loan_owner.get(&id).copied()
    }

    /// All of a customer's payments, aggregated across their loans.
    /// Source order; callers that need ranking go through the sequencer.
    pub fn payments_for(&self, id: CustomerId) -> Vec<&PaymentRecord> {
        self.payments_by_customer
            .get(&id)
            .map(|idxs| idxs.iter().map(|&i| &self.payments[i]).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty() && self.loans.is_empty() && self.payments.is_empty()
    }

    /// Earliest date any data exists for: the first acquisition or the
    /// first due date, whichever comes sooner. None for an empty snapshot.
    pub fn earliest_activity(&self) -> Option<NaiveDate> {
        let first_acquired = self.customers.iter().map(|c| c.acquired_on).min();
        let first_due = self.payments.iter().map(|p| p.due_on).min();
        match (first_acquired, first_due) {
            (Some(a), Some(d)) => Some(a.min(d)),
            (Some(a), None) => Some(a),
            (None, Some(d)) => Some(d),
            (None, None) => None,
        }
    }
}
