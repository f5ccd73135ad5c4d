//! Extra principal payments, fitted to the loan horizon

use crate::error::{HousingError, Result};

/// One non-negative extra-principal amount per month of the loan
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraPaymentSchedule {
    amounts: Vec<f64>,
}

impl ExtraPaymentSchedule {
    /// Repeat `pattern` until it covers `months`, then truncate
    ///
    /// `[1, 2, 3]` over 7 months gives `[1, 2, 3, 1, 2, 3, 1]`; a pattern longer
    /// than the horizon is cut to length.
    pub fn fit(pattern: &[f64], months: u32) -> Result<Self> {
        if pattern.is_empty() {
            return Err(HousingError::EmptyExtraPayments);
        }
        if let Some(bad) = pattern.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(HousingError::invalid(
                "extra_payments",
                format!("amounts must be finite and non-negative, got {bad}"),
            ));
        }

        let amounts = pattern
            .iter()
            .copied()
            .cycle()
            .take(months as usize)
            .collect();
        Ok(Self { amounts })
    }

    /// The same amount every month
    pub fn constant(amount: f64, months: u32) -> Result<Self> {
        Self::fit(&[amount], months)
    }

    /// No extra payments at all
    pub fn none(months: u32) -> Self {
        Self {
            amounts: vec![0.0; months as usize],
        }
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }
}
