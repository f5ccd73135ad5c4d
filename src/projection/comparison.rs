//! Side-by-side projection of owning and renting
//!
//! Every scenario owns its mortgage, home and apartment outright, so scenarios
//! share nothing and run in parallel.

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::ScenarioConfig;
use crate::error::{HousingError, Result};
use crate::housing::{apartment, home};
use crate::mortgage;
use crate::timeseries::MonthlyTimeSeries;

/// Cash paid into the home so far: total direct + extra principal + total indirect
pub const HOME_CASH_OUTLAY: &str = "home_cash_outlay";
/// Owned share of the current home value
pub const HOME_EQUITY: &str = "home_equity";
/// Money spent on owning that builds no equity, less the rent avoided
pub const NET_COST_OF_OWNING: &str = "net_cost_of_owning";

pub const COMPARISON_COLUMNS: [&str; 5] = [
    HOME_CASH_OUTLAY,
    HOME_EQUITY,
    home::TOTAL_INDIRECT,
    apartment::TOTAL_RENT,
    NET_COST_OF_OWNING,
];

/// Headline numbers for one scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub fixed_monthly_payment: f64,
    /// First month with the loan paid off, if within the horizon
    pub payoff_month: Option<u32>,
    pub total_interest: f64,
    pub total_direct: f64,
    pub total_extra_principal: f64,
    pub total_indirect: f64,
    pub total_rent: f64,
    pub final_home_equity: f64,
}

/// Everything computed for one scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub mortgage: MonthlyTimeSeries,
    pub home: MonthlyTimeSeries,
    pub indirect_costs: MonthlyTimeSeries,
    pub rent: MonthlyTimeSeries,
    pub comparison: MonthlyTimeSeries,
    pub summary: ScenarioSummary,
}

/// A named scenario's result; failures stay with their scenario
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<ScenarioResult>,
}

/// Month-by-month comparison of a home's cost table with a rent table
///
/// The mortgage schedule supplies the extra principal, which is cash paid into
/// the home on top of the regular direct cost.
pub fn compare(
    home_data: &MonthlyTimeSeries,
    mortgage_data: &MonthlyTimeSeries,
    rent_data: &MonthlyTimeSeries,
) -> Result<MonthlyTimeSeries> {
    for other in [mortgage_data, rent_data] {
        if home_data.len() != other.len() {
            return Err(HousingError::ShapeMismatch {
                expected: home_data.len(),
                actual: other.len(),
            });
        }
    }

    let total_direct = home_data.column(home::TOTAL_DIRECT)?;
    let total_extra = mortgage_data.column(mortgage::TOTAL_EXTRA_PRINCIPAL)?;
    let total_indirect = home_data.column(home::TOTAL_INDIRECT)?;
    let home_value = home_data.column(home::HOME_VALUE)?;
    let ownership = home_data.column(home::HOME_OWNERSHIP_PCT)?;
    let total_rent = rent_data.column(apartment::TOTAL_RENT)?;

    let mut out = MonthlyTimeSeries::blank(home_data.start_date(), home_data.len() as u32, &COMPARISON_COLUMNS)?;
    out.set_column(
        HOME_CASH_OUTLAY,
        total_direct
            .iter()
            .zip(total_extra)
            .zip(total_indirect)
            .map(|((d, e), i)| d + e + i)
            .collect(),
    )?;
    out.set_column(
        HOME_EQUITY,
        home_value.iter().zip(ownership).map(|(v, p)| v * p).collect(),
    )?;
    out.set_column(home::TOTAL_INDIRECT, total_indirect.to_vec())?;
    out.set_column(apartment::TOTAL_RENT, total_rent.to_vec())?;
    out.set_column(
        NET_COST_OF_OWNING,
        total_indirect.iter().zip(total_rent).map(|(i, r)| i - r).collect(),
    )?;
    Ok(out)
}

/// Build and project one scenario from its configuration
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioResult> {
    let mut home = config.build_home()?;
    let mut apartment = config.build_apartment()?;

    let home_data = home.data()?;
    let indirect_costs = home.indirect_cost_data()?;
    let rent = apartment.data()?;

    let fixed_monthly_payment = home.mortgage().fixed_monthly_payment();
    let payoff_month = home.mortgage_mut().payoff_month()?;
    let mortgage = home.mortgage_mut().data()?;
    let comparison = compare(&home_data, &mortgage, &rent)?;

    let last = home_data.len() - 1;
    let summary = ScenarioSummary {
        name: config.name.clone(),
        fixed_monthly_payment,
        payoff_month,
        total_interest: mortgage.value(mortgage::TOTAL_INTEREST, last)?,
        total_direct: home_data.value(home::TOTAL_DIRECT, last)?,
        total_extra_principal: mortgage.value(mortgage::TOTAL_EXTRA_PRINCIPAL, last)?,
        total_indirect: home_data.value(home::TOTAL_INDIRECT, last)?,
        total_rent: rent.value(apartment::TOTAL_RENT, last)?,
        final_home_equity: comparison.value(HOME_EQUITY, last)?,
    };

    Ok(ScenarioResult {
        mortgage,
        home: home_data,
        indirect_costs,
        rent,
        comparison,
        summary,
    })
}

/// Project every scenario in parallel, keeping input order
pub fn run_scenarios(configs: &[ScenarioConfig]) -> Vec<ScenarioOutcome> {
    let outcomes: Vec<ScenarioOutcome> = configs
        .par_iter()
        .map(|config| ScenarioOutcome {
            name: config.name.clone(),
            result: run_scenario(config),
        })
        .collect();

    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => info!(
                "scenario '{}': total indirect {:.2} vs total rent {:.2}",
                outcome.name, result.summary.total_indirect, result.summary.total_rent
            ),
            Err(e) => warn!("scenario '{}' failed: {}", outcome.name, e),
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtraPayments;
    use approx::assert_relative_eq;

    #[test]
    fn test_run_scenario() {
        let result = run_scenario(&ScenarioConfig::default()).unwrap();
        let summary = &result.summary;

        assert_eq!(result.comparison.len(), 360);
        assert_eq!(summary.payoff_month, Some(359));
        assert!(summary.total_interest > 0.0);

        let last = 359;
        assert_relative_eq!(
            result.comparison.value(HOME_CASH_OUTLAY, last).unwrap(),
            summary.total_direct + summary.total_indirect,
            max_relative = 1e-12
        );
        assert_eq!(summary.total_extra_principal, 0.0);
        assert_relative_eq!(
            result.comparison.value(NET_COST_OF_OWNING, last).unwrap(),
            summary.total_indirect - summary.total_rent,
            max_relative = 1e-12
        );
        // Fully owned home at the end of the loan
        assert_relative_eq!(
            summary.final_home_equity,
            result.home.value(home::HOME_VALUE, last).unwrap(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_run_scenarios_keeps_order_and_isolates_failures() {
        let configs = vec![
            ScenarioConfig {
                name: "baseline".into(),
                ..Default::default()
            },
            ScenarioConfig {
                name: "broken".into(),
                extra_payments: Some(ExtraPayments::Pattern(vec![])),
                ..Default::default()
            },
            ScenarioConfig {
                name: "extra".into(),
                extra_payments: Some(ExtraPayments::Amount(500.0)),
                ..Default::default()
            },
        ];

        let outcomes = run_scenarios(&configs);
        let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["baseline", "broken", "extra"]);

        assert!(matches!(outcomes[1].result, Err(HousingError::EmptyExtraPayments)));

        let baseline = outcomes[0].result.as_ref().unwrap();
        let extra = outcomes[2].result.as_ref().unwrap();
        assert!(extra.summary.payoff_month.unwrap() < 359);
        assert!(extra.summary.total_interest < baseline.summary.total_interest);
    }

    #[test]
    fn test_compare_requires_equal_lengths() {
        let mut home = ScenarioConfig::default().build_home().unwrap();
        let short = ScenarioConfig {
            ownership_months: Some(12),
            ..Default::default()
        };
        let mut apartment = short.build_apartment().unwrap();

        let home_data = home.data().unwrap();
        let mortgage_data = home.mortgage_mut().data().unwrap();
        let err = compare(&home_data, &mortgage_data, &apartment.data().unwrap()).unwrap_err();
        assert!(matches!(err, HousingError::ShapeMismatch { expected: 360, actual: 12 }));
    }

    #[test]
    fn test_extra_principal_counts_as_cash_outlay() {
        let config = ScenarioConfig {
            extra_payments: Some(ExtraPayments::Amount(500.0)),
            ..Default::default()
        };
        let result = run_scenario(&config).unwrap();
        let summary = &result.summary;
        let last = 359;

        // Paid off early: the down payment, regular principal and extra principal
        // together buy the whole home. Month-0 principal is reported as the down
        // payment instead.
        let terms = config.loan_terms();
        let first_principal = result.mortgage.value(mortgage::PRINCIPAL, 0).unwrap();
        assert!(summary.payoff_month.unwrap() < last as u32);
        assert!(summary.total_extra_principal > 0.0);
        assert_relative_eq!(
            summary.total_direct + summary.total_extra_principal,
            terms.down_payment_amount() + terms.loan_amount() - first_principal,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            result.comparison.value(HOME_CASH_OUTLAY, last).unwrap(),
            summary.total_direct + summary.total_extra_principal + summary.total_indirect,
            max_relative = 1e-12
        );
    }
}
