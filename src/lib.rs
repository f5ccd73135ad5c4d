//! Buy-versus-rent projection engine
//!
//! Projects, month by month, what financing and owning a home costs compared
//! with renting over the same horizon:
//! - `mortgage`: fixed-rate amortization, with optional extra principal
//! - `housing`: home ownership costs and the rent baseline
//! - `projection`: scenario comparison, run in parallel
//! - `market`: cached regional market indicators

pub mod assumptions;
pub mod config;
pub mod error;
pub mod housing;
pub mod market;
pub mod mortgage;
pub mod projection;
pub mod timeseries;

pub use config::{ScenarioConfig, Settings};
pub use error::{HousingError, Result};
pub use housing::{Apartment, Home};
pub use mortgage::{LoanTerms, Mortgage};
pub use timeseries::MonthlyTimeSeries;
