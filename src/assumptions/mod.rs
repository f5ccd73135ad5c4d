//! Cost and growth assumptions for owning and renting

mod home;
mod rent;

pub use home::HomeCostRates;
pub use rent::RentAssumptions;
