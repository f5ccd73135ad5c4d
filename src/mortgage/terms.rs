//! Fixed-rate loan terms shared by both amortization strategies

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{check_range, HousingError, Result};
use crate::timeseries;

/// Terms of a single fixed-rate home loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Price of the home
    pub home_purchase_price: f64,

    /// Down payment as a fraction of the price (0.20 = 20%)
    pub down_payment_pct: f64,

    /// Annual interest rate (0.04 = 4%), compounded monthly
    pub annual_interest_rate: f64,

    /// First month of the loan
    pub start_date: NaiveDate,

    /// Number of monthly payments (e.g. 360)
    pub loan_period_months: u32,
}

impl LoanTerms {
    /// Check everything the monthly loop would otherwise trip over
    pub fn validate(&self) -> Result<()> {
        check_range("home_purchase_price", self.home_purchase_price, 0.0, f64::MAX)?;
        check_range("down_payment_pct", self.down_payment_pct, 0.0, 1.0)?;
        check_range("annual_interest_rate", self.annual_interest_rate, 0.0, 1.0)?;

        if self.loan_period_months == 0 {
            return Err(HousingError::invalid("loan_period_months", "must be positive"));
        }
        if self.loan_amount() <= 0.0 {
            return Err(HousingError::invalid(
                "loan_amount",
                format!(
                    "price {} with down payment {} leaves nothing to finance",
                    self.home_purchase_price, self.down_payment_pct
                ),
            ));
        }
        timeseries::add_months(self.start_date, self.loan_period_months)?;
        Ok(())
    }

    pub fn loan_amount(&self) -> f64 {
        self.home_purchase_price * (1.0 - self.down_payment_pct)
    }

    pub fn down_payment_amount(&self) -> f64 {
        self.home_purchase_price * self.down_payment_pct
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_interest_rate / 12.0
    }

    /// Anticipated end date if the loan runs its full term
    pub fn end_date(&self) -> Result<NaiveDate> {
        timeseries::add_months(self.start_date, self.loan_period_months)
    }

    /// Level monthly payment that retires the loan in exactly `loan_period_months`
    ///
    /// `P * r(1+r)^N / ((1+r)^N - 1)`, floored at zero.
    pub fn fixed_monthly_payment(&self) -> f64 {
        annuity_payment(self.loan_amount(), self.monthly_rate(), self.loan_period_months).max(0.0)
    }
}

/// Level payment for `principal` over `periods` at `rate` per period
pub(crate) fn annuity_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + rate).powf(n);
    principal * rate * growth / (growth - 1.0)
}

/// Outstanding balance after `paid` level payments
pub(crate) fn balance_after(principal: f64, rate: f64, payment: f64, paid: u32) -> f64 {
    let k = paid as f64;
    if rate == 0.0 {
        return principal - payment * k;
    }
    let growth = (1.0 + rate).powf(k);
    principal * growth - payment * (growth - 1.0) / rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn terms_300k() -> LoanTerms {
        LoanTerms {
            home_purchase_price: 375_000.0,
            down_payment_pct: 0.20,
            annual_interest_rate: 0.04,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            loan_period_months: 360,
        }
    }

    #[test]
    fn test_fixed_payment() {
        let terms = terms_300k();
        assert_abs_diff_eq!(terms.loan_amount(), 300_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(terms.down_payment_amount(), 75_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(terms.fixed_monthly_payment(), 1432.25, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_payment() {
        let terms = LoanTerms { annual_interest_rate: 0.0, ..terms_300k() };
        assert_abs_diff_eq!(terms.fixed_monthly_payment(), 300_000.0 / 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_balance_after_full_term_is_zero() {
        let terms = terms_300k();
        let payment = terms.fixed_monthly_payment();
        let end = balance_after(terms.loan_amount(), terms.monthly_rate(), payment, 360);
        assert_abs_diff_eq!(end, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_end_date() {
        let terms = terms_300k();
        assert_eq!(terms.end_date().unwrap(), NaiveDate::from_ymd_opt(2050, 1, 1).unwrap());
    }

    #[test]
    fn test_validation() {
        assert!(terms_300k().validate().is_ok());

        let no_loan = LoanTerms { down_payment_pct: 1.0, ..terms_300k() };
        assert!(matches!(no_loan.validate(), Err(HousingError::InvalidInput { .. })));

        let no_months = LoanTerms { loan_period_months: 0, ..terms_300k() };
        assert!(no_months.validate().is_err());

        let negative_rate = LoanTerms { annual_interest_rate: -0.01, ..terms_300k() };
        assert!(negative_rate.validate().is_err());
    }
}
