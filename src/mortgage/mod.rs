//! Fixed-rate mortgage with a memoized amortization schedule

mod amortization;
mod extra;
mod terms;

pub use amortization::{
    AmortizationStrategy, BALANCE, EXTRA_PRINCIPAL, INTEREST, PAID_OFF_EPSILON, PCT_PAID,
    PRINCIPAL, SCHEDULE_COLUMNS, TOTAL_EXTRA_PRINCIPAL, TOTAL_INTEREST, TOTAL_PRINCIPAL,
};
pub use extra::ExtraPaymentSchedule;
pub use terms::LoanTerms;

use chrono::NaiveDate;
use log::debug;

use crate::error::Result;
use crate::projection::Memo;
use crate::timeseries::MonthlyTimeSeries;

/// A single fixed-rate loan and its month-by-month schedule
#[derive(Debug, Clone)]
pub struct Mortgage {
    terms: LoanTerms,
    strategy: AmortizationStrategy,
    schedule: Memo<MonthlyTimeSeries>,
}

impl Mortgage {
    /// Level payments only; the schedule is computed in closed form
    pub fn fixed_rate(terms: LoanTerms) -> Result<Self> {
        Self::new(terms, AmortizationStrategy::Analytic)
    }

    /// Level payments plus extra principal
    ///
    /// `extra_payments` is tiled (repeat, then truncate) to the loan period. An
    /// empty slice is rejected here, before any month is processed.
    pub fn with_extra_payments(terms: LoanTerms, extra_payments: &[f64]) -> Result<Self> {
        terms.validate()?;
        let schedule = ExtraPaymentSchedule::fit(extra_payments, terms.loan_period_months)?;
        Self::new(terms, AmortizationStrategy::Iterative(schedule))
    }

    pub fn new(terms: LoanTerms, strategy: AmortizationStrategy) -> Result<Self> {
        terms.validate()?;
        strategy.validate(&terms)?;
        Ok(Self {
            terms,
            strategy,
            schedule: Memo::Uncomputed,
        })
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn strategy(&self) -> &AmortizationStrategy {
        &self.strategy
    }

    pub fn start_date(&self) -> NaiveDate {
        self.terms.start_date
    }

    pub fn loan_period_months(&self) -> u32 {
        self.terms.loan_period_months
    }

    pub fn loan_amount(&self) -> f64 {
        self.terms.loan_amount()
    }

    pub fn down_payment_pct(&self) -> f64 {
        self.terms.down_payment_pct
    }

    pub fn fixed_monthly_payment(&self) -> f64 {
        self.terms.fixed_monthly_payment()
    }

    pub fn is_computed(&self) -> bool {
        self.schedule.is_computed()
    }

    /// Borrow the schedule, computing it on first access
    pub fn schedule(&mut self) -> Result<&MonthlyTimeSeries> {
        let Self {
            terms,
            strategy,
            schedule,
        } = self;
        schedule.get_or_try_compute(|| {
            debug!(
                "amortizing {:.2} over {} months ({})",
                terms.loan_amount(),
                terms.loan_period_months,
                strategy.label()
            );
            strategy.amortize(terms)
        })
    }

    /// Owned copy of the schedule
    ///
    /// Columns: `date`, `month`, `principal`, `interest`, `extra_principal`,
    /// `total_principal`, `total_extra_principal`, `total_interest`,
    /// `balance`, `pct_paid`.
    pub fn data(&mut self) -> Result<MonthlyTimeSeries> {
        Ok(self.schedule()?.clone())
    }

    /// Remaining principal at the end of the schedule
    pub fn balance(&mut self) -> Result<f64> {
        let schedule = self.schedule()?;
        schedule.value(BALANCE, schedule.len() - 1)
    }

    /// Paid off at the end of the schedule
    ///
    /// Uses the same `<= PAID_OFF_EPSILON` test that stops the iterative
    /// schedule, so `is_paid` agrees with `payoff_month`.
    pub fn is_paid(&mut self) -> Result<bool> {
        Ok(self.balance()? <= PAID_OFF_EPSILON)
    }

    /// First month (0-based) whose closing balance is paid off
    pub fn payoff_month(&mut self) -> Result<Option<u32>> {
        let schedule = self.schedule()?;
        Ok(schedule
            .column(BALANCE)?
            .iter()
            .position(|b| *b <= PAID_OFF_EPSILON)
            .map(|m| m as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HousingError;
    use approx::assert_abs_diff_eq;

    fn terms() -> LoanTerms {
        LoanTerms {
            home_purchase_price: 375_000.0,
            down_payment_pct: 0.20,
            annual_interest_rate: 0.04,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            loan_period_months: 360,
        }
    }

    #[test]
    fn test_fixed_rate_schedule() {
        let mut mortgage = Mortgage::fixed_rate(terms()).unwrap();

        assert!(!mortgage.is_computed());
        assert_abs_diff_eq!(mortgage.fixed_monthly_payment(), 1432.25, epsilon = 0.01);

        let data = mortgage.data().unwrap();
        assert_eq!(data.len(), 360);
        assert_abs_diff_eq!(data.value(INTEREST, 0).unwrap(), 1000.0, epsilon = 0.01);
        assert!(mortgage.is_paid().unwrap());
        assert_eq!(mortgage.payoff_month().unwrap(), Some(359));
    }

    #[test]
    fn test_data_is_memoized() {
        let mut mortgage = Mortgage::with_extra_payments(terms(), &[250.0]).unwrap();

        let first = mortgage.data().unwrap();
        assert!(mortgage.is_computed());
        let second = mortgage.data().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extra_payments_pay_off_early() {
        let mut baseline = Mortgage::fixed_rate(terms()).unwrap();
        let mut mortgage = Mortgage::with_extra_payments(terms(), &[500.0]).unwrap();

        let payoff = mortgage.payoff_month().unwrap().unwrap();
        assert!(payoff < 359);
        assert!(mortgage.is_paid().unwrap());

        let with_extra = mortgage.data().unwrap();
        let without = baseline.data().unwrap();
        assert!(
            with_extra.value(TOTAL_INTEREST, payoff as usize).unwrap()
                < without.value(TOTAL_INTEREST, 359).unwrap()
        );
    }

    #[test]
    fn test_rejects_empty_extra_payments() {
        let err = Mortgage::with_extra_payments(terms(), &[]).unwrap_err();
        assert!(matches!(err, HousingError::EmptyExtraPayments));
    }

    #[test]
    fn test_is_paid_agrees_with_payoff_month() {
        let mut paid = Mortgage::with_extra_payments(terms(), &[500.0]).unwrap();
        assert_eq!(paid.is_paid().unwrap(), paid.payoff_month().unwrap().is_some());

        let data = paid.data().unwrap();
        let payoff = paid.payoff_month().unwrap().unwrap() as usize;
        assert!(data.value(BALANCE, payoff).unwrap() <= PAID_OFF_EPSILON);
        assert!(data.value(BALANCE, payoff - 1).unwrap() > PAID_OFF_EPSILON);
    }

    #[test]
    fn test_rejects_mismatched_extra_schedule_at_construction() {
        let extra = ExtraPaymentSchedule::constant(1.0, 5).unwrap();
        let strategy = AmortizationStrategy::Iterative(extra);
        let err = Mortgage::new(terms(), strategy).unwrap_err();
        assert!(matches!(err, HousingError::ShapeMismatch { expected: 360, actual: 5 }));
    }

    #[test]
    fn test_rejects_bad_terms() {
        let bad = LoanTerms {
            loan_period_months: 0,
            ..terms()
        };
        assert!(Mortgage::fixed_rate(bad).is_err());
    }
}
