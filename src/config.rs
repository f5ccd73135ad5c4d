//! Scenario configuration and process-wide settings
//!
//! Scenarios are read from JSON. Any field left out falls back to its default,
//! so `{}` is a complete (default) scenario.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::assumptions::{HomeCostRates, RentAssumptions};
use crate::error::Result;
use crate::housing::{Apartment, Home};
use crate::mortgage::{LoanTerms, Mortgage};

/// Extra principal: a single monthly amount or a pattern to repeat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraPayments {
    Amount(f64),
    Pattern(Vec<f64>),
}

impl ExtraPayments {
    pub fn as_pattern(&self) -> Vec<f64> {
        match self {
            ExtraPayments::Amount(amount) => vec![*amount],
            ExtraPayments::Pattern(pattern) => pattern.clone(),
        }
    }
}

/// One buy-versus-rent scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Month the home is bought and the lease starts
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    #[serde(default = "default_purchase_price")]
    pub purchase_price: f64,

    /// Down payment as a fraction of price
    #[serde(default = "default_down_payment_pct")]
    pub down_payment_pct: f64,

    #[serde(default = "default_interest_rate")]
    pub annual_interest_rate: f64,

    #[serde(default = "default_loan_months")]
    pub loan_period_months: u32,

    /// Defaults to the loan period
    #[serde(default)]
    pub ownership_months: Option<u32>,

    /// None: level payments only
    #[serde(default)]
    pub extra_payments: Option<ExtraPayments>,

    #[serde(default)]
    pub home_costs: HomeCostRates,

    #[serde(default = "default_base_rent")]
    pub base_rent: f64,

    #[serde(default)]
    pub rent: RentAssumptions,
}

fn default_name() -> String { "baseline".to_string() }
fn default_start_date() -> NaiveDate { NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN) }
fn default_purchase_price() -> f64 { 300_000.0 }
fn default_down_payment_pct() -> f64 { 0.20 }
fn default_interest_rate() -> f64 { 0.04 }
fn default_loan_months() -> u32 { 360 }
fn default_base_rent() -> f64 { 1_500.0 }

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            start_date: default_start_date(),
            purchase_price: 300_000.0,
            down_payment_pct: 0.20,
            annual_interest_rate: 0.04,
            loan_period_months: 360,
            ownership_months: None,
            extra_payments: None,
            home_costs: HomeCostRates::default(),
            base_rent: 1_500.0,
            rent: RentAssumptions::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn loan_terms(&self) -> LoanTerms {
        LoanTerms {
            home_purchase_price: self.purchase_price,
            down_payment_pct: self.down_payment_pct,
            annual_interest_rate: self.annual_interest_rate,
            start_date: self.start_date,
            loan_period_months: self.loan_period_months,
        }
    }

    pub fn horizon_months(&self) -> u32 {
        self.ownership_months.unwrap_or(self.loan_period_months)
    }

    /// Analytic schedule without extra payments, iterative with them
    pub fn build_mortgage(&self) -> Result<Mortgage> {
        let terms = self.loan_terms();
        match &self.extra_payments {
            Some(extra) => Mortgage::with_extra_payments(terms, &extra.as_pattern()),
            None => Mortgage::fixed_rate(terms),
        }
    }

    pub fn build_home(&self) -> Result<Home> {
        Home::new(self.purchase_price, self.build_mortgage()?)?
            .with_rates(self.home_costs)?
            .with_ownership_months(self.horizon_months())
    }

    pub fn build_apartment(&self) -> Result<Apartment> {
        Apartment::new(self.base_rent, self.start_date, self.horizon_months())?
            .with_assumptions(self.rent)
    }
}

/// Read one scenario object or an array of them
pub fn load_scenarios(path: &Path) -> Result<Vec<ScenarioConfig>> {
    let text = std::fs::read_to_string(path)?;
    parse_scenarios(&text)
}

pub fn parse_scenarios(text: &str) -> Result<Vec<ScenarioConfig>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<ScenarioConfig>),
        One(Box<ScenarioConfig>),
    }

    Ok(match serde_json::from_str(text)? {
        OneOrMany::Many(configs) => configs,
        OneOrMany::One(config) => vec![*config],
    })
}

/// Process-wide settings, read once at start-up
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Where cached market data is stored
    pub data_dir: PathBuf,
}

pub const DATA_DIR_ENV: &str = "HOUSING_SIM_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = ".data";

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Settings {
    /// Environment variables, after loading a `.env` file if present
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let data_dir = std::env::var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        Self { data_dir }
    }
}
