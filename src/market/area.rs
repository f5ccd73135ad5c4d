//! Area categories and dataset codes for regional housing indicators

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaCategory {
    State,
    County,
    Metro,
    City,
    Neighborhood,
    Zipcode,
}

impl AreaCategory {
    pub const ALL: [AreaCategory; 6] = [
        AreaCategory::State,
        AreaCategory::County,
        AreaCategory::Metro,
        AreaCategory::City,
        AreaCategory::Neighborhood,
        AreaCategory::Zipcode,
    ];

    /// Prefix used by the data provider
    pub fn code(self) -> &'static str {
        match self {
            AreaCategory::State => "S",
            AreaCategory::County => "CO",
            AreaCategory::Metro => "M",
            AreaCategory::City => "C",
            AreaCategory::Neighborhood => "N",
            AreaCategory::Zipcode => "Z",
        }
    }
}

impl fmt::Display for AreaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Provider code for one indicator in one area, e.g. `ZILLOW/M31_MSPAH`
pub fn dataset_code(category: AreaCategory, area_code: &str, indicator_code: &str) -> String {
    format!("ZILLOW/{}{}_{}", category.code(), area_code, indicator_code)
}
