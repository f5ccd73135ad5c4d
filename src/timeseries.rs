//! Fixed-length monthly tables
//!
//! Every projection in the crate writes into a `MonthlyTimeSeries`: one row per
//! month of the horizon, pre-populated with the 0-based month index and the
//! first-of-month calendar date. The row count is fixed at allocation; only
//! column values change afterwards.

use chrono::{Datelike, Months, NaiveDate};
use std::io::Write;

use crate::error::{HousingError, Result};

/// Name of the pre-populated date column
pub const DATE: &str = "date";
/// Name of the pre-populated month index column
pub const MONTH: &str = "month";

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<f64>,
}

/// Date-indexed table of per-month numeric fields
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTimeSeries {
    dates: Vec<NaiveDate>,
    months: Vec<u32>,
    columns: Vec<Column>,
}

impl MonthlyTimeSeries {
    /// Allocate `number_rows` months starting at `start_date`
    ///
    /// Dates follow month-start frequency: a start date that is not the first of
    /// its month rolls forward to the next first-of-month. Every named field is
    /// initialised to NaN (undefined) until assigned.
    pub fn blank(start_date: NaiveDate, number_rows: u32, fields: &[&str]) -> Result<Self> {
        if number_rows == 0 {
            return Err(HousingError::invalid("number_rows", "must be positive"));
        }

        let mut columns: Vec<Column> = Vec::with_capacity(fields.len());
        for &name in fields {
            if name == DATE || name == MONTH {
                return Err(HousingError::invalid(name, "column name is reserved"));
            }
            if columns.iter().any(|c| c.name == name) {
                return Err(HousingError::invalid(name, "duplicate column name"));
            }
            columns.push(Column {
                name: name.to_string(),
                values: vec![f64::NAN; number_rows as usize],
            });
        }

        let first = first_of_month_on_or_after(start_date)?;
        let dates = (0..number_rows)
            .map(|m| {
                first.checked_add_months(Months::new(m)).ok_or_else(|| {
                    HousingError::invalid("start_date", format!("{first} + {m} months is out of range"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dates,
            months: (0..number_rows).collect(),
            columns,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn months(&self) -> &[u32] {
        &self.months
    }

    pub fn start_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| HousingError::MissingColumn(name.to_string()))
    }

    pub fn value(&self, name: &str, row: usize) -> Result<f64> {
        let column = self.column(name)?;
        column.get(row).copied().ok_or(HousingError::ShapeMismatch {
            expected: column.len(),
            actual: row + 1,
        })
    }

    fn column_mut(&mut self, name: &str) -> Result<&mut Vec<f64>> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.values)
            .ok_or_else(|| HousingError::MissingColumn(name.to_string()))
    }

    /// Replace a whole column; `values` must have exactly one entry per month
    pub fn set_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        let rows = self.len();
        if values.len() != rows {
            return Err(HousingError::ShapeMismatch {
                expected: rows,
                actual: values.len(),
            });
        }
        *self.column_mut(name)? = values;
        Ok(())
    }

    /// Running sum of a column
    pub fn cumulative_sum(&self, name: &str) -> Result<Vec<f64>> {
        Ok(cumulative_sum(self.column(name)?))
    }

    /// Write the running sum of `source` into `target`
    pub fn fill_cumulative(&mut self, source: &str, target: &str) -> Result<()> {
        let totals = self.cumulative_sum(source)?;
        self.set_column(target, totals)
    }

    /// One flag per month from a predicate on the row date
    pub fn mask<F>(&self, predicate: F) -> Vec<bool>
    where
        F: Fn(NaiveDate) -> bool,
    {
        self.dates.iter().map(|&d| predicate(d)).collect()
    }

    /// Write the table as CSV: `date,month,<fields...>`
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec![DATE.to_string(), MONTH.to_string()];
        header.extend(self.columns.iter().map(|c| c.name.clone()));
        wtr.write_record(&header)?;

        let precision: Vec<usize> = self.columns.iter().map(|c| csv_precision(&c.name)).collect();
        for row in 0..self.len() {
            let mut record = Vec::with_capacity(header.len());
            record.push(self.dates[row].format("%Y-%m-%d").to_string());
            record.push(self.months[row].to_string());
            for (column, &digits) in self.columns.iter().zip(&precision) {
                record.push(format!("{:.*}", digits, column.values[row]));
            }
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

/// Decimal places for a column in CSV output: fractions keep 8, amounts 2
fn csv_precision(name: &str) -> usize {
    if name.starts_with("pct_") || name.ends_with("_pct") {
        8
    } else {
        2
    }
}

/// Partial sums up to and including each position
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, v| {
            *total += v;
            Some(*total)
        })
        .collect()
}

/// Whole months elapsed from `start` to `stop`
pub fn months_between(start: NaiveDate, stop: NaiveDate) -> i32 {
    let mut months = (stop.year() - start.year()) * 12 + stop.month() as i32 - start.month() as i32;
    // An incomplete final month does not count
    if months > 0 && stop.day() < start.day() {
        months -= 1;
    } else if months < 0 && stop.day() > start.day() {
        months += 1;
    }
    months
}

/// Roll a date forward to the first day of a month
pub fn first_of_month_on_or_after(date: NaiveDate) -> Result<NaiveDate> {
    let first = date.with_day(1).ok_or_else(|| HousingError::invalid("date", date.to_string()))?;
    if first == date {
        return Ok(first);
    }
    first
        .checked_add_months(Months::new(1))
        .ok_or_else(|| HousingError::invalid("date", format!("{date} is out of range")))
}

/// `start + months`, for computing end dates
pub fn add_months(start: NaiveDate, months: u32) -> Result<NaiveDate> {
    start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| HousingError::invalid("date", format!("{start} + {months} months is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_blank_prepopulates_dates_and_months() {
        let ts = MonthlyTimeSeries::blank(date(2020, 11, 1), 4, &["rent"]).unwrap();

        assert_eq!(ts.len(), 4);
        assert_eq!(ts.months(), &[0, 1, 2, 3]);
        assert_eq!(
            ts.dates(),
            &[date(2020, 11, 1), date(2020, 12, 1), date(2021, 1, 1), date(2021, 2, 1)]
        );
        assert!(ts.column("rent").unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_mid_month_start_rolls_forward() {
        let ts = MonthlyTimeSeries::blank(date(2021, 3, 15), 2, &[]).unwrap();
        assert_eq!(ts.dates(), &[date(2021, 4, 1), date(2021, 5, 1)]);
    }

    #[test]
    fn test_rejects_bad_allocation() {
        assert!(MonthlyTimeSeries::blank(date(2021, 1, 1), 0, &["a"]).is_err());
        assert!(MonthlyTimeSeries::blank(date(2021, 1, 1), 3, &["a", "a"]).is_err());
        assert!(MonthlyTimeSeries::blank(date(2021, 1, 1), 3, &[DATE]).is_err());
    }

    #[test]
    fn test_set_column_requires_matching_length() {
        let mut ts = MonthlyTimeSeries::blank(date(2021, 1, 1), 3, &["a"]).unwrap();

        let err = ts.set_column("a", vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, HousingError::ShapeMismatch { expected: 3, actual: 2 }));

        let err = ts.set_column("b", vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, HousingError::MissingColumn(_)));

        ts.set_column("a", vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ts.column("a").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_cumulative_sum() {
        let mut ts = MonthlyTimeSeries::blank(date(2021, 1, 1), 4, &["x", "total_x"]).unwrap();
        ts.set_column("x", vec![1.5, 2.0, 0.0, 4.0]).unwrap();
        ts.fill_cumulative("x", "total_x").unwrap();

        let totals = ts.column("total_x").unwrap();
        assert_relative_eq!(totals[0], 1.5);
        assert_relative_eq!(totals[1], 3.5);
        assert_relative_eq!(totals[2], 3.5);
        assert_relative_eq!(totals[3], 7.5);
    }

    #[test]
    fn test_january_mask() {
        let ts = MonthlyTimeSeries::blank(date(2020, 11, 1), 15, &[]).unwrap();
        let january = ts.mask(|d| d.month() == 1);

        let idx: Vec<usize> = january.iter().enumerate().filter(|(_, &j)| j).map(|(i, _)| i).collect();
        assert_eq!(idx, vec![2, 14]);
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2020, 1, 1), date(2050, 1, 1)), 360);
        assert_eq!(months_between(date(2020, 1, 15), date(2020, 3, 14)), 1);
        assert_eq!(months_between(date(2020, 1, 15), date(2020, 3, 15)), 2);
        assert_eq!(months_between(date(2020, 3, 1), date(2020, 1, 1)), -2);
    }

    #[test]
    fn test_write_csv() {
        let mut ts = MonthlyTimeSeries::blank(date(2021, 1, 1), 2, &["rent"]).unwrap();
        ts.set_column("rent", vec![1000.0, 1000.0]).unwrap();

        let mut buf = Vec::new();
        ts.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text, "date,month,rent\n2021-01-01,0,1000.00\n2021-02-01,1,1000.00\n");
    }

    #[test]
    fn test_write_csv_keeps_fraction_precision() {
        let fields = ["balance", "pct_paid", "home_ownership_pct"];
        let mut ts = MonthlyTimeSeries::blank(date(2021, 1, 1), 1, &fields).unwrap();
        ts.set_column("balance", vec![239_567.891]).unwrap();
        ts.set_column("pct_paid", vec![0.201234567]).unwrap();
        ts.set_column("home_ownership_pct", vec![0.36098765]).unwrap();

        let mut buf = Vec::new();
        ts.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "date,month,balance,pct_paid,home_ownership_pct\n2021-01-01,0,239567.89,0.20123457,0.36098765\n"
        );
    }
}
