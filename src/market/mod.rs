//! Historical market indicators by area
//!
//! The remote provider sits behind `MarketDataSource`; `CachedSource` keeps a
//! CSV copy of each response so repeated runs stay offline.

mod area;
mod cache;

pub use area::{dataset_code, AreaCategory};
pub use cache::{CachedSource, DataRequest};

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{HousingError, Result};

/// One dated value of an indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

pub trait MarketDataSource {
    fn get(&self, request: &DataRequest) -> Result<Vec<Observation>>;
}

/// An area to compare: display name and provider area code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub name: String,
    pub code: String,
}

impl Area {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// One indicator for several areas, outer-joined on date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaComparison {
    areas: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<Option<f64>>>,
}

impl AreaComparison {
    fn push_area(&mut self, name: &str, observations: &[Observation]) {
        let column = self.areas.len();
        self.areas.push(name.to_string());
        for row in self.rows.values_mut() {
            row.push(None);
        }
        for obs in observations {
            let row = self
                .rows
                .entry(obs.date)
                .or_insert_with(|| vec![None; column + 1]);
            row[column] = Some(obs.value);
        }
    }

    /// Areas that were fetched successfully, in request order
    pub fn areas(&self) -> &[String] {
        &self.areas
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.rows.keys()
    }

    pub fn value(&self, area: &str, date: NaiveDate) -> Option<f64> {
        let column = self.areas.iter().position(|a| a == area)?;
        self.rows.get(&date).and_then(|row| row[column])
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec!["date".to_string()];
        header.extend(self.areas.iter().cloned());
        wtr.write_record(&header)?;

        for (date, row) in &self.rows {
            let mut record = vec![date.format("%Y-%m-%d").to_string()];
            record.extend(row.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Fetch one indicator for every area and line them up by date
///
/// An area whose fetch fails is logged and left out; the comparison only fails
/// when no area could be fetched at all.
pub fn compare_areas<S: MarketDataSource>(
    source: &S,
    areas: &[Area],
    category: AreaCategory,
    indicator_code: &str,
    args: &[String],
    kwargs: &BTreeMap<String, String>,
) -> Result<AreaComparison> {
    let mut comparison = AreaComparison::default();

    for area in areas {
        let request = DataRequest {
            code: dataset_code(category, &area.code, indicator_code),
            args: args.to_vec(),
            kwargs: kwargs.clone(),
        };
        match source.get(&request) {
            Ok(observations) => comparison.push_area(&area.name, &observations),
            Err(e) => warn!("unable to fetch {}|{}: {}", area.name, area.code, e),
        }
    }

    if comparison.areas.is_empty() && !areas.is_empty() {
        return Err(HousingError::Fetch {
            key: format!("{category}*_{indicator_code}"),
            reason: "no area could be fetched".to_string(),
        });
    }
    Ok(comparison)
}
