//! Deterministic synthetic portfolio generator.
//!
//! RULE: Nothing here calls a platform RNG. All randomness flows
//! through one seeded PCG stream, so a given (seed, anchor, size)
//! always produces byte-identical databases.
//!
//! Shape of the data: customers acquired over the two years before the
//! anchor date, one or two approved loans each, and a monthly repayment
//! schedule from the first month after acquisition up to the anchor.
//! Payment discipline is driven by credit score, so low-score customers
//! produce the late/missed tail the analytics need.

use chrono::{Datelike, Duration, NaiveDate};
use creditrisk_core::model::{Customer, Loan, LoanStatus, PaymentRecord, PaymentStatus};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

const EMPLOYMENT_TYPES: [&str; 4] = ["salaried", "self_employed", "contract", "retired"];

pub struct GeneratedPortfolio {
    pub customers: Vec<Customer>,
    pub loans: Vec<Loan>,
    pub payments: Vec<PaymentRecord>,
}

pub struct PortfolioGenerator {
    rng: Pcg64Mcg,
    anchor: NaiveDate,
}

impl PortfolioGenerator {
    pub fn new(seed: u64, anchor: NaiveDate) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
            anchor,
        }
    }

    pub fn generate(&mut self, customer_count: u64) -> GeneratedPortfolio {
        let mut customers = Vec::new();
        let mut loans = Vec::new();
        let mut payments = Vec::new();
        let mut next_loan_id = 1u64;
        let mut next_payment_id = 1u64;

        for customer_id in 1..=customer_count {
            let customer = self.customer(customer_id);
            let loan_count = 1 + self.below(5) / 4; // ~20% get a second loan

            for _ in 0..loan_count {
                let loan = self.loan(next_loan_id, &customer);
                next_loan_id += 1;
                if loan.status == LoanStatus::Approved {
                    self.schedule(&loan, &customer, &mut next_payment_id, &mut payments);
                }
                loans.push(loan);
            }
            customers.push(customer);
        }

        GeneratedPortfolio {
            customers,
            loans,
            payments,
        }
    }

    fn customer(&mut self, customer_id: u64) -> Customer {
        let months_back = 1 + self.below(24) as i64;
        let day = 1 + self.below(28) as u32;
        let acquired_on = add_months(self.anchor, -(months_back as i32))
            .with_day(day)
            .unwrap_or(self.anchor);

        Customer {
            customer_id,
            acquired_on,
            credit_score: 450 + self.below(370) as i32,
            income: 18_000.0 + self.f64() * 90_000.0,
            employment_type: EMPLOYMENT_TYPES[self.below(4) as usize].to_string(),
        }
    }

    fn loan(&mut self, loan_id: u64, customer: &Customer) -> Loan {
        let principal = 2_000.0 + self.f64() * 38_000.0;
        let term_months = 12.0 + (self.below(4) * 12) as f64;
        let status = if self.chance(0.85) {
            LoanStatus::Approved
        } else if self.chance(0.6) {
            LoanStatus::Rejected
        } else {
            LoanStatus::Applied
        };

        Loan {
            loan_id,
            customer_id: customer.customer_id,
            principal,
            interest_rate: 4.5 + self.f64() * 14.0,
            status,
            monthly_installment: principal * 1.12 / term_months,
            applied_on: customer.acquired_on,
        }
    }

    /// Monthly installments from the first month after acquisition up to
    /// the anchor. Reliability scales with credit score: 850 ≈ 98%
    /// on-time, 450 ≈ 55%.
    fn schedule(
        &mut self,
        loan: &Loan,
        customer: &Customer,
        next_payment_id: &mut u64,
        out: &mut Vec<PaymentRecord>,
    ) {
        let reliability = 0.55 + 0.43 * ((customer.credit_score - 450) as f64 / 400.0).clamp(0.0, 1.0);
        let mut due_on = add_months(customer.acquired_on, 1);

        while due_on <= self.anchor {
            let payment_id = *next_payment_id;
            *next_payment_id += 1;

            let record = if self.chance(reliability) {
                PaymentRecord {
                    payment_id,
                    loan_id: loan.loan_id,
                    due_on,
                    paid_on: Some(due_on - Duration::days(self.below(3) as i64)),
                    amount_paid: loan.monthly_installment,
                    status: PaymentStatus::OnTime,
                    days_past_due: 0,
                }
            } else if self.chance(0.7) {
                // Late: cured within a month
                let dpd = 1 + self.below(30);
                PaymentRecord {
                    payment_id,
                    loan_id: loan.loan_id,
                    due_on,
                    paid_on: Some(due_on + Duration::days(dpd as i64)),
                    amount_paid: loan.monthly_installment,
                    status: PaymentStatus::Late,
                    days_past_due: dpd as u32,
                }
            } else {
                // Missed: long delay, sometimes never cured
                let dpd = 31 + self.below(120);
                let cured = self.chance(0.6);
                let cure_date = due_on + Duration::days(dpd as i64);
                let (paid_on, amount, dpd_effective) = if cured && cure_date <= self.anchor {
                    (Some(cure_date), loan.monthly_installment, dpd as u32)
                } else {
                    (None, 0.0, (self.anchor - due_on).num_days().max(0) as u32)
                };
                PaymentRecord {
                    payment_id,
                    loan_id: loan.loan_id,
                    due_on,
                    paid_on,
                    amount_paid: amount,
                    status: PaymentStatus::Missed,
                    days_past_due: dpd_effective,
                }
            };

            out.push(record);
            due_on = add_months(due_on, 1);
        }
    }

    // ── RNG primitives ─────────────────────────────────────────────

    fn f64(&mut self) -> f64 {
        let bits = self.rng.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn below(&mut self, n: u64) -> u64 {
        self.rng.next_u64() % n
    }

    fn chance(&mut self, p: f64) -> bool {
        self.f64() < p
    }
}

/// Calendar-month shift, clamping the day to the target month's length.
fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    (1..=date.day())
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .expect("month start is always valid")
}
