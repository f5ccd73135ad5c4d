//! Home ownership costs, driven by a mortgage schedule
//!
//! Costs are split the way they affect net worth:
//! - direct: cash that builds equity (down payment in month 0, then principal)
//! - indirect: cash with no equity benefit (insurance, property tax, interest,
//!   one-time fees)

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::assumptions::HomeCostRates;
use crate::error::{check_range, HousingError, Result};
use crate::mortgage::{self, LoanTerms, Mortgage};
use crate::projection::Memo;
use crate::timeseries::{self, MonthlyTimeSeries};

pub const HOME_VALUE: &str = "home_value";
pub const HOME_OWNERSHIP_PCT: &str = "home_ownership_pct";
pub const DIRECT: &str = "direct";
pub const INDIRECT: &str = "indirect";
pub const TOTAL_DIRECT: &str = "total_direct";
pub const TOTAL_INDIRECT: &str = "total_indirect";

pub const HOMEOWNERS_INSURANCE: &str = "homeowners_insurance";
pub const PROPERTY_TAX: &str = "property_tax";
pub const INTEREST: &str = "interest";
pub const FEES: &str = "fees";
pub const TOTAL: &str = "total";

const COST_COLUMNS: [&str; 6] = [
    HOME_VALUE,
    HOME_OWNERSHIP_PCT,
    DIRECT,
    INDIRECT,
    TOTAL_DIRECT,
    TOTAL_INDIRECT,
];

const INDIRECT_COLUMNS: [&str; 5] = [HOMEOWNERS_INSURANCE, PROPERTY_TAX, INTEREST, FEES, TOTAL];

/// Property tax is billed in this calendar month
const PROPERTY_TAX_MONTH: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
struct HomeProjection {
    costs: MonthlyTimeSeries,
    indirect: MonthlyTimeSeries,
}

/// A purchased home financed by a single mortgage
#[derive(Debug, Clone)]
pub struct Home {
    purchase_price: f64,
    mortgage: Mortgage,
    rates: HomeCostRates,
    start_date: NaiveDate,
    ownership_period_months: u32,
    projection: Memo<HomeProjection>,
}

impl Home {
    /// Start date and ownership period default to the mortgage's
    pub fn new(purchase_price: f64, mortgage: Mortgage) -> Result<Self> {
        check_range("purchase_price", purchase_price, 0.0, f64::MAX)?;
        if purchase_price == 0.0 {
            return Err(HousingError::invalid("purchase_price", "must be positive"));
        }
        Ok(Self {
            purchase_price,
            start_date: mortgage.start_date(),
            ownership_period_months: mortgage.loan_period_months(),
            mortgage,
            rates: HomeCostRates::default(),
            projection: Memo::Uncomputed,
        })
    }

    pub fn with_rates(mut self, rates: HomeCostRates) -> Result<Self> {
        rates.validate()?;
        self.rates = rates;
        self.projection = Memo::Uncomputed;
        Ok(self)
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self.projection = Memo::Uncomputed;
        self
    }

    /// Must equal the mortgage's loan period by the time costs are computed
    pub fn with_ownership_months(mut self, months: u32) -> Result<Self> {
        if months == 0 {
            return Err(HousingError::invalid("ownership_period_months", "must be positive"));
        }
        self.ownership_period_months = months;
        self.projection = Memo::Uncomputed;
        Ok(self)
    }

    pub fn purchase_price(&self) -> f64 {
        self.purchase_price
    }

    pub fn rates(&self) -> &HomeCostRates {
        &self.rates
    }

    pub fn mortgage(&self) -> &Mortgage {
        &self.mortgage
    }

    pub fn mortgage_mut(&mut self) -> &mut Mortgage {
        &mut self.mortgage
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Result<NaiveDate> {
        timeseries::add_months(self.start_date, self.ownership_period_months)
    }

    pub fn ownership_period_months(&self) -> u32 {
        self.ownership_period_months
    }

    pub fn is_computed(&self) -> bool {
        self.projection.is_computed()
    }

    fn projection(&mut self) -> Result<&HomeProjection> {
        let Self {
            purchase_price,
            mortgage,
            rates,
            start_date,
            ownership_period_months,
            projection,
        } = self;
        projection.get_or_try_compute(|| {
            let terms = *mortgage.terms();
            let schedule = mortgage.schedule()?;
            let costs = MonthlyTimeSeries::blank(*start_date, *ownership_period_months, &COST_COLUMNS)?;
            debug!(
                "projecting home costs for {:.2} over {} months",
                purchase_price, ownership_period_months
            );
            project_costs(*purchase_price, rates, &terms, schedule, costs)
        })
    }

    /// Owned copy of the monthly cost table
    ///
    /// Columns: `date`, `month`, `home_value`, `home_ownership_pct`, `direct`,
    /// `indirect`, `total_direct`, `total_indirect`.
    pub fn data(&mut self) -> Result<MonthlyTimeSeries> {
        Ok(self.projection()?.costs.clone())
    }

    /// Owned copy of the indirect cost breakdown
    ///
    /// Columns: `date`, `month`, `homeowners_insurance`, `property_tax`,
    /// `interest`, `fees`, `total`.
    pub fn indirect_cost_data(&mut self) -> Result<MonthlyTimeSeries> {
        Ok(self.projection()?.indirect.clone())
    }
}

fn project_costs(
    purchase_price: f64,
    rates: &HomeCostRates,
    terms: &LoanTerms,
    schedule: &MonthlyTimeSeries,
    mut costs: MonthlyTimeSeries,
) -> Result<HomeProjection> {
    if costs.len() != schedule.len() {
        return Err(HousingError::ShapeMismatch {
            expected: costs.len(),
            actual: schedule.len(),
        });
    }

    // Home value and ownership percentage
    let growth = rates.monthly_appreciation_factor();
    let home_value: Vec<f64> = costs
        .months()
        .iter()
        .map(|&m| purchase_price * growth.powi(m as i32))
        .collect();
    let down_payment_pct = terms.down_payment_pct;
    let ownership: Vec<f64> = schedule
        .column(mortgage::PCT_PAID)?
        .iter()
        .map(|paid| down_payment_pct + (1.0 - down_payment_pct) * paid)
        .collect();

    // Direct costs: down payment replaces month-0 principal
    let mut direct = schedule.column(mortgage::PRINCIPAL)?.to_vec();
    direct[0] = terms.down_payment_amount();

    let indirect = project_indirect(purchase_price, rates, &home_value, schedule, &costs)?;
    let indirect_total = indirect.column(TOTAL)?.to_vec();

    costs.set_column(HOME_VALUE, home_value)?;
    costs.set_column(HOME_OWNERSHIP_PCT, ownership)?;
    costs.set_column(DIRECT, direct)?;
    costs.set_column(INDIRECT, indirect_total)?;
    costs.fill_cumulative(DIRECT, TOTAL_DIRECT)?;
    costs.fill_cumulative(INDIRECT, TOTAL_INDIRECT)?;

    Ok(HomeProjection { costs, indirect })
}

fn project_indirect(
    purchase_price: f64,
    rates: &HomeCostRates,
    home_value: &[f64],
    schedule: &MonthlyTimeSeries,
    costs: &MonthlyTimeSeries,
) -> Result<MonthlyTimeSeries> {
    let mut indirect = MonthlyTimeSeries::blank(costs.start_date(), costs.len() as u32, &INDIRECT_COLUMNS)?;

    let insurance: Vec<f64> = home_value
        .iter()
        .map(|v| v * rates.insurance_rate / 12.0)
        .collect();

    // Property tax on the January assessment; the first bill only covers the
    // months owned in the preceding calendar year
    let is_tax_month = costs.mask(|d| d.month() == PROPERTY_TAX_MONTH);
    let mut property_tax: Vec<f64> = home_value
        .iter()
        .zip(&is_tax_month)
        .map(|(v, &due)| if due { v * rates.property_tax_rate } else { 0.0 })
        .collect();
    if let Some(first) = is_tax_month.iter().position(|&due| due) {
        property_tax[first] *= (first + 1) as f64 / 12.0;
    }

    let interest = schedule.column(mortgage::INTEREST)?.to_vec();

    let mut fees = vec![0.0; costs.len()];
    fees[0] = rates.one_time_fees(purchase_price);

    let total: Vec<f64> = (0..costs.len())
        .map(|m| property_tax[m] + insurance[m] + fees[m] + interest[m])
        .collect();

    indirect.set_column(HOMEOWNERS_INSURANCE, insurance)?;
    indirect.set_column(PROPERTY_TAX, property_tax)?;
    indirect.set_column(INTEREST, interest)?;
    indirect.set_column(FEES, fees)?;
    indirect.set_column(TOTAL, total)?;
    Ok(indirect)
}
