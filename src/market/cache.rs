//! Local file cache in front of a remote market data source

use log::debug;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::{MarketDataSource, Observation};
use crate::config::Settings;
use crate::error::Result;

/// What to fetch: a dataset code plus positional and keyword arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataRequest {
    pub code: String,
    pub args: Vec<String>,
    pub kwargs: BTreeMap<String, String>,
}

impl DataRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Deterministic cache file name for this request
    ///
    /// `{method}_{code}__{args}__{kwargs}.csv`, with `/` in the code replaced,
    /// args joined by `_` and `key_value` pairs joined by `__` in key order.
    pub fn cache_key(&self, method: &str) -> String {
        let code = self.code.replace('/', "_");
        let args = self.args.join("_");
        let kwargs = self
            .kwargs
            .iter()
            .map(|(k, v)| format!("{k}_{v}"))
            .collect::<Vec<_>>()
            .join("__");
        format!("{method}_{code}__{args}__{kwargs}.csv")
    }
}

/// Serves requests from `cache_dir` when possible, fetching and saving otherwise
pub struct CachedSource<S> {
    source: S,
    cache_dir: PathBuf,
}

const GET: &str = "GET";

impl<S: MarketDataSource> CachedSource<S> {
    pub fn new(source: S, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            cache_dir: cache_dir.into(),
        }
    }

    pub fn from_settings(source: S, settings: &Settings) -> Self {
        Self::new(source, settings.data_dir.clone())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_path(&self, request: &DataRequest) -> PathBuf {
        self.cache_dir.join(request.cache_key(GET))
    }
}

impl<S: MarketDataSource> MarketDataSource for CachedSource<S> {
    fn get(&self, request: &DataRequest) -> Result<Vec<Observation>> {
        let path = self.cache_path(request);
        if path.exists() {
            debug!("cache hit: {}", path.display());
            return read_observations(&path);
        }

        debug!("cache miss: {}", path.display());
        let observations = self.source.get(request)?;
        fs::create_dir_all(&self.cache_dir)?;
        write_observations(&path, &observations)?;
        Ok(observations)
    }
}

fn read_observations(path: &Path) -> Result<Vec<Observation>> {
    let mut rdr = csv::Reader::from_reader(File::open(path)?);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        out.push(record?);
    }
    Ok(out)
}

fn write_observations(path: &Path, observations: &[Observation]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for obs in observations {
        wtr.serialize(obs)?;
    }
    wtr.flush()?;
    Ok(())
}
