//! Projection engine for single and multi-scenario buy-versus-rent runs

mod comparison;
mod memo;

pub use comparison::{
    compare, run_scenario, run_scenarios, ScenarioOutcome, ScenarioResult, ScenarioSummary,
    COMPARISON_COLUMNS, HOME_CASH_OUTLAY, HOME_EQUITY, NET_COST_OF_OWNING,
};
pub use memo::Memo;
