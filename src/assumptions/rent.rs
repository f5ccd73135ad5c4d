//! Rent growth assumptions

use serde::{Deserialize, Serialize};

use crate::error::{check_range, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentAssumptions {
    /// Rent increase applied once per full year of the lease (0.02 = 2%)
    #[serde(default = "default_yearly_increase_rate")]
    pub yearly_increase_rate: f64,
}

fn default_yearly_increase_rate() -> f64 { 0.02 }

impl Default for RentAssumptions {
    fn default() -> Self {
        Self {
            yearly_increase_rate: 0.02,
        }
    }
}

impl RentAssumptions {
    pub fn validate(&self) -> Result<()> {
        check_range("yearly_increase_rate", self.yearly_increase_rate, -1.0, 1.0)
    }

    /// Multiplier on base rent for the given lease year (0-based)
    pub fn increase_factor(&self, year: u32) -> f64 {
        (1.0 + self.yearly_increase_rate).powi(year as i32)
    }
}
