//! Home ownership cost rates

use serde::{Deserialize, Serialize};

use crate::error::{check_range, Result};

/// Yearly rates applied to the home's price or assessed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeCostRates {
    /// Homeowners insurance per year as a fraction of home value, paid monthly
    #[serde(default = "default_insurance_rate")]
    pub insurance_rate: f64,

    /// Property tax per year as a fraction of home value, paid every January
    #[serde(default = "default_property_tax_rate")]
    pub property_tax_rate: f64,

    /// Annual appreciation, compounded monthly
    #[serde(default = "default_appreciation_rate")]
    pub appreciation_rate: f64,

    /// One-time closing costs as a fraction of purchase price
    #[serde(default = "default_closing_cost_rate")]
    pub closing_cost_rate: f64,

    /// One-time title insurance as a fraction of purchase price
    #[serde(default = "default_title_insurance_rate")]
    pub title_insurance_rate: f64,
}

fn default_insurance_rate() -> f64 { 0.01 }
fn default_property_tax_rate() -> f64 { 0.02 }
fn default_appreciation_rate() -> f64 { 0.02 }
fn default_closing_cost_rate() -> f64 { 0.05 }
fn default_title_insurance_rate() -> f64 { 0.01 }

impl Default for HomeCostRates {
    fn default() -> Self {
        Self {
            insurance_rate: 0.01,       // 1% of value per year
            property_tax_rate: 0.02,    // 2% of value, billed in January
            appreciation_rate: 0.02,    // 2% per year
            closing_cost_rate: 0.05,    // 5% of price at purchase
            title_insurance_rate: 0.01, // 1% of price at purchase
        }
    }
}

impl HomeCostRates {
    pub fn validate(&self) -> Result<()> {
        check_range("insurance_rate", self.insurance_rate, 0.0, 1.0)?;
        check_range("property_tax_rate", self.property_tax_rate, 0.0, 1.0)?;
        // Depreciation is allowed, but not below -100%
        check_range("appreciation_rate", self.appreciation_rate, -1.0, 1.0)?;
        check_range("closing_cost_rate", self.closing_cost_rate, 0.0, 1.0)?;
        check_range("title_insurance_rate", self.title_insurance_rate, 0.0, 1.0)?;
        Ok(())
    }

    /// Monthly growth factor for home value
    pub fn monthly_appreciation_factor(&self) -> f64 {
        1.0 + self.appreciation_rate / 12.0
    }

    /// Closing costs plus title insurance, both paid in month 0
    pub fn one_time_fees(&self, purchase_price: f64) -> f64 {
        self.closing_cost_rate * purchase_price + self.title_insurance_rate * purchase_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let rates = HomeCostRates::default();
        assert!(rates.validate().is_ok());
        assert_relative_eq!(rates.one_time_fees(400_000.0), 24_000.0);
        assert_relative_eq!(rates.monthly_appreciation_factor(), 1.0 + 0.02 / 12.0);
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let rates: HomeCostRates = serde_json::from_str(r#"{"property_tax_rate": 0.018}"#).unwrap();
        assert_eq!(rates.property_tax_rate, 0.018);
        assert_eq!(rates.insurance_rate, 0.01);
        assert_eq!(rates.closing_cost_rate, 0.05);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let rates = HomeCostRates {
            insurance_rate: 1.5,
            ..Default::default()
        };
        assert!(rates.validate().is_err());
    }
}
