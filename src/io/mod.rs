/*
    Sensitivity, Monte Carlo impact analysis
    Copyright (C) 2024 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::impact::{Dispersion, ImpactFactor};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use snafu::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use typed_builder::TypedBuilder;

pub mod plot;
pub mod report;
pub mod samples;

pub use plot::{plot_heatmap, plot_histogram};
pub use report::{Report, ReportRow};
pub use samples::write_samples;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read configuration file {}: {source}", path.display()))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to parse YAML configuration: {source}"))]
    ParseConfig { source: serde_yaml::Error },
    #[snafu(display("failed to serialize configuration: {source}"))]
    SerializeConfig { source: serde_yaml::Error },
}

impl PartialEq for ConfigError {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExportError {
    #[snafu(display("failed to create {}: {source}", path.display()))]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("CSV export failed: {source}"))]
    Csv { source: csv::Error },
    #[snafu(display("CSV export failed to flush: {source}"))]
    CsvFlush { source: std::io::Error },
    #[snafu(display("could not build the record batch: {source}"))]
    Arrow {
        source: arrow::error::ArrowError,
    },
    #[snafu(display("parquet export failed: {source}"))]
    Parquet {
        source: parquet::errors::ParquetError,
    },
    #[snafu(display("plotting failed: {msg}"))]
    Plot { msg: String },
    #[snafu(display("nothing to export: {msg}"))]
    NoData { msg: String },
}

/// Configuration of an export of the Monte Carlo data
#[derive(Clone, Default, Debug, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct ExportCfg {
    /// Factors to export alongside the total, all of them if unset
    #[builder(default, setter(strip_option))]
    pub fields: Option<Vec<ImpactFactor>>,
    /// Additional file metadata
    #[builder(default, setter(strip_option))]
    pub metadata: Option<HashMap<String, String>>,
}

impl ExportCfg {
    pub fn from_metadata(metadata: Vec<(String, String)>) -> Self {
        Self {
            metadata: Some(metadata.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Returns the factors to export, in factor order
    pub(crate) fn factors(&self) -> Vec<ImpactFactor> {
        match &self.fields {
            Some(fields) => ImpactFactor::iter()
                .filter(|factor| fields.contains(factor))
                .collect(),
            None => ImpactFactor::iter().collect(),
        }
    }
}

pub trait ConfigRepr: Debug + Sized + Serialize + DeserializeOwned {
    /// Builds the configuration representation from the path to a yaml
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref()).context(ReadConfigSnafu {
            path: path.as_ref().to_path_buf(),
        })?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseConfigSnafu)
    }

    /// Builds the configuration representation from the string of a yaml
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseConfigSnafu)
    }

    /// Serializes this configuration into a yaml string
    fn dumps(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).context(SerializeConfigSnafu)
    }
}

/// Either parameter of a factor's dispersion may be omitted, in which case the default is used
#[derive(Copy, Clone, Debug, Default, Deserialize)]
struct DispersionSerde {
    mean: Option<f64>,
    std_dev: Option<f64>,
}

/// Deserializes a possibly partial map of dispersions, filling in the defaults of every missing factor
pub(crate) fn dispersions_from_partial<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<ImpactFactor, Dispersion>, D::Error>
where
    D: Deserializer<'de>,
{
    let partial: BTreeMap<ImpactFactor, DispersionSerde> = BTreeMap::deserialize(deserializer)?;
    Ok(ImpactFactor::iter()
        .map(|factor| {
            let default = factor.default_dispersion();
            let disp = match partial.get(&factor) {
                Some(serde) => Dispersion {
                    mean: serde.mean.unwrap_or(default.mean),
                    std_dev: serde.std_dev.unwrap_or(default.std_dev),
                },
                None => default,
            };
            (factor, disp)
        })
        .collect())
}
