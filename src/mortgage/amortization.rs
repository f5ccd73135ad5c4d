//! Month-by-month amortization schedules
//!
//! Two strategies produce the same columns:
//! - `Analytic`: closed-form annuity split of each level payment
//! - `Iterative`: walks the balance forward month by month so extra principal
//!   and early payoff are handled exactly

use log::debug;

use super::extra::ExtraPaymentSchedule;
use super::terms::{annuity_payment, balance_after, LoanTerms};
use crate::error::{HousingError, Result};
use crate::timeseries::{cumulative_sum, MonthlyTimeSeries};

pub const PRINCIPAL: &str = "principal";
pub const INTEREST: &str = "interest";
pub const EXTRA_PRINCIPAL: &str = "extra_principal";
pub const TOTAL_PRINCIPAL: &str = "total_principal";
pub const TOTAL_EXTRA_PRINCIPAL: &str = "total_extra_principal";
pub const TOTAL_INTEREST: &str = "total_interest";
pub const BALANCE: &str = "balance";
pub const PCT_PAID: &str = "pct_paid";

pub const SCHEDULE_COLUMNS: [&str; 8] = [
    PRINCIPAL,
    INTEREST,
    EXTRA_PRINCIPAL,
    TOTAL_PRINCIPAL,
    TOTAL_EXTRA_PRINCIPAL,
    TOTAL_INTEREST,
    BALANCE,
    PCT_PAID,
];

/// A balance at or below this is considered paid off
pub const PAID_OFF_EPSILON: f64 = 0.01;

/// How the schedule is computed, chosen when the mortgage is built
#[derive(Debug, Clone, PartialEq)]
pub enum AmortizationStrategy {
    /// Level payments only
    Analytic,
    /// Level payments plus scheduled extra principal
    Iterative(ExtraPaymentSchedule),
}

impl AmortizationStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            AmortizationStrategy::Analytic => "analytic",
            AmortizationStrategy::Iterative(_) => "iterative",
        }
    }

    /// An extra schedule must cover exactly one entry per month of the loan
    pub fn validate(&self, terms: &LoanTerms) -> Result<()> {
        match self {
            AmortizationStrategy::Iterative(extra)
                if extra.len() != terms.loan_period_months as usize =>
            {
                Err(HousingError::ShapeMismatch {
                    expected: terms.loan_period_months as usize,
                    actual: extra.len(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn amortize(&self, terms: &LoanTerms) -> Result<MonthlyTimeSeries> {
        self.validate(terms)?;
        let payments = match self {
            AmortizationStrategy::Analytic => analytic_payments(terms),
            AmortizationStrategy::Iterative(extra) => iterative_payments(terms, extra),
        };
        build_schedule(terms, &payments)
    }
}

/// What happened in one month of the loan
#[derive(Debug, Clone, Copy, PartialEq)]
struct MonthlyPayment {
    principal: f64,
    interest: f64,
    extra: f64,
    /// Balance after this month's payment
    balance: f64,
}

fn analytic_payments(terms: &LoanTerms) -> Vec<MonthlyPayment> {
    let loan = terms.loan_amount();
    let rate = terms.monthly_rate();
    let n = terms.loan_period_months;
    let payment = annuity_payment(loan, rate, n);

    let payments: Vec<MonthlyPayment> = (0..n)
        .map(|month| {
            let interest = rate * balance_after(loan, rate, payment, month);
            let principal = payment - interest;
            MonthlyPayment {
                principal,
                interest,
                extra: 0.0,
                balance: 0.0,
            }
        })
        .collect();

    // Balance is defined by the principal stream for the closed form
    let totals = cumulative_sum(&payments.iter().map(|p| p.principal).collect::<Vec<_>>());
    payments
        .into_iter()
        .zip(totals)
        .map(|(p, total)| MonthlyPayment {
            balance: loan - total,
            ..p
        })
        .collect()
}

fn iterative_payments(terms: &LoanTerms, extra: &ExtraPaymentSchedule) -> Vec<MonthlyPayment> {
    let rate = terms.monthly_rate();
    let fixed_payment = terms.fixed_monthly_payment();

    let payments: Vec<MonthlyPayment> = extra
        .amounts()
        .iter()
        .scan(terms.loan_amount(), |balance, &scheduled| {
            if *balance <= PAID_OFF_EPSILON {
                return Some(MonthlyPayment {
                    principal: 0.0,
                    interest: 0.0,
                    extra: 0.0,
                    balance: *balance,
                });
            }

            let interest = rate * *balance;
            // Last regular payment only covers what is owed
            let payment = fixed_payment.min(*balance + interest);
            let principal = payment - interest;
            // Extra principal beyond the remaining balance is dropped
            let extra = scheduled.min(*balance - principal).max(0.0);
            *balance = (*balance - principal - extra).max(0.0);

            Some(MonthlyPayment {
                principal,
                interest,
                extra,
                balance: *balance,
            })
        })
        .collect();

    if let Some(month) = payments.iter().position(|p| p.balance <= PAID_OFF_EPSILON) {
        debug!(
            "loan of {:.2} paid off in month {} of {}",
            terms.loan_amount(),
            month,
            terms.loan_period_months
        );
    }
    payments
}

fn build_schedule(terms: &LoanTerms, payments: &[MonthlyPayment]) -> Result<MonthlyTimeSeries> {
    let loan = terms.loan_amount();
    let mut data =
        MonthlyTimeSeries::blank(terms.start_date, terms.loan_period_months, &SCHEDULE_COLUMNS)?;

    data.set_column(PRINCIPAL, payments.iter().map(|p| p.principal).collect())?;
    data.set_column(INTEREST, payments.iter().map(|p| p.interest).collect())?;
    data.set_column(EXTRA_PRINCIPAL, payments.iter().map(|p| p.extra).collect())?;
    data.fill_cumulative(PRINCIPAL, TOTAL_PRINCIPAL)?;
    data.fill_cumulative(EXTRA_PRINCIPAL, TOTAL_EXTRA_PRINCIPAL)?;
    data.fill_cumulative(INTEREST, TOTAL_INTEREST)?;
    data.set_column(BALANCE, payments.iter().map(|p| p.balance).collect())?;
    data.set_column(
        PCT_PAID,
        payments.iter().map(|p| 1.0 - p.balance / loan).collect(),
    )?;

    Ok(data)
}
