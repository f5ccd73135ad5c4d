//! Renting baseline

use chrono::NaiveDate;
use log::debug;

use crate::assumptions::RentAssumptions;
use crate::error::{check_range, HousingError, Result};
use crate::projection::Memo;
use crate::timeseries::{self, MonthlyTimeSeries};

pub const RENT: &str = "rent";
pub const TOTAL_RENT: &str = "total_rent";

const RENT_COLUMNS: [&str; 2] = [RENT, TOTAL_RENT];

/// A rented apartment whose rent steps up once per full year
#[derive(Debug, Clone)]
pub struct Apartment {
    base_rent: f64,
    start_date: NaiveDate,
    rent_period_months: u32,
    assumptions: RentAssumptions,
    data: Memo<MonthlyTimeSeries>,
}

impl Apartment {
    pub fn new(base_rent: f64, start_date: NaiveDate, rent_period_months: u32) -> Result<Self> {
        check_range("base_rent", base_rent, 0.0, f64::MAX)?;
        if rent_period_months == 0 {
            return Err(HousingError::invalid("rent_period_months", "must be positive"));
        }
        timeseries::add_months(start_date, rent_period_months)?;
        Ok(Self {
            base_rent,
            start_date,
            rent_period_months,
            assumptions: RentAssumptions::default(),
            data: Memo::Uncomputed,
        })
    }

    pub fn with_assumptions(mut self, assumptions: RentAssumptions) -> Result<Self> {
        assumptions.validate()?;
        self.assumptions = assumptions;
        self.data = Memo::Uncomputed;
        Ok(self)
    }

    pub fn base_rent(&self) -> f64 {
        self.base_rent
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Result<NaiveDate> {
        timeseries::add_months(self.start_date, self.rent_period_months)
    }

    pub fn rent_period_months(&self) -> u32 {
        self.rent_period_months
    }

    pub fn is_computed(&self) -> bool {
        self.data.is_computed()
    }

    /// Owned copy of the rent table
    ///
    /// Columns: `date`, `month`, `rent`, `total_rent`.
    pub fn data(&mut self) -> Result<MonthlyTimeSeries> {
        let Self {
            base_rent,
            start_date,
            rent_period_months,
            assumptions,
            data,
        } = self;
        let projected = data.get_or_try_compute(|| {
            debug!("projecting rent of {:.2} over {} months", base_rent, rent_period_months);
            project_rent(*base_rent, assumptions, *start_date, *rent_period_months)
        })?;
        Ok(projected.clone())
    }
}

fn project_rent(
    base_rent: f64,
    assumptions: &RentAssumptions,
    start_date: NaiveDate,
    months: u32,
) -> Result<MonthlyTimeSeries> {
    let mut data = MonthlyTimeSeries::blank(start_date, months, &RENT_COLUMNS)?;

    // One factor per lease year, held flat for all twelve months of it
    let rent: Vec<f64> = (0..months.div_ceil(12))
        .flat_map(|year| std::iter::repeat(base_rent * assumptions.increase_factor(year)).take(12))
        .take(months as usize)
        .collect();

    data.set_column(RENT, rent)?;
    data.fill_cumulative(RENT, TOTAL_RENT)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }

    #[test]
    fn test_rent_steps_yearly() {
        let mut apt = Apartment::new(2_000.0, start(), 30).unwrap();
        let data = apt.data().unwrap();
        let rent = data.column(RENT).unwrap();

        assert_eq!(rent.len(), 30);
        assert!(rent[..12].iter().all(|r| *r == 2_000.0));
        assert!(rent[12..24].iter().all(|r| *r == rent[12]));
        assert!(rent[24..].iter().all(|r| *r == rent[24]));
        assert_relative_eq!(rent[12], 2_000.0 * 1.02);
        assert_relative_eq!(rent[24] / rent[12], 1.02, max_relative = 1e-12);
    }

    #[test]
    fn test_total_rent() {
        let mut apt = Apartment::new(1_000.0, start(), 24)
            .unwrap()
            .with_assumptions(RentAssumptions { yearly_increase_rate: 0.10 })
            .unwrap();
        let data = apt.data().unwrap();

        assert_relative_eq!(data.value(TOTAL_RENT, 0).unwrap(), 1_000.0);
        assert_relative_eq!(data.value(TOTAL_RENT, 11).unwrap(), 12_000.0);
        assert_relative_eq!(data.value(TOTAL_RENT, 23).unwrap(), 12_000.0 + 13_200.0, max_relative = 1e-12);
    }

    #[test]
    fn test_idempotent_access() {
        let mut apt = Apartment::new(1_500.0, start(), 360).unwrap();
        assert!(!apt.is_computed());
        let first = apt.data().unwrap();
        assert!(apt.is_computed());
        assert_eq!(first, apt.data().unwrap());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(Apartment::new(-1.0, start(), 12).is_err());
        assert!(Apartment::new(1_000.0, start(), 0).is_err());
        let apt = Apartment::new(1_000.0, start(), 12).unwrap();
        assert!(apt
            .with_assumptions(RentAssumptions { yearly_increase_rate: f64::NAN })
            .is_err());
    }
}
