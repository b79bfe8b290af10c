/*
    satnav, capture planning for imaging satellites
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

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

use crate::md::{CaptureConfig, ExtremalSearchStrategy};
use crate::time::{Duration, Unit};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use typed_builder::TypedBuilder;

/// Exports a capture plan as a plain text table
pub mod plan;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read configuration file {}: {source}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse YAML configuration: {source}"))]
    ParseError { source: serde_yaml::Error },

    #[snafu(display("invalid configuration: {msg}"))]
    InvalidConfig { msg: String },
}

impl PartialEq for ConfigError {
    /// No two configuration errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

pub trait ConfigRepr: Debug + Sized + Serialize + DeserializeOwned {
    /// Builds the configuration representation from the path to a yaml
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let reader = open(path.as_ref())?;
        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a sequence of "Selves" from the provided path to a yaml
    fn load_many<P>(path: P) -> Result<Vec<Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let reader = open(path.as_ref())?;
        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a map of names to "selves" from the provided path to a yaml
    fn load_named<P>(path: P) -> Result<BTreeMap<String, Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let reader = open(path.as_ref())?;
        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds "Self" from the provided string of a yaml
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }

    /// Builds a sequence of "Selves" from the provided string of a yaml
    fn loads_many(data: &str) -> Result<Vec<Self>, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ConfigError> {
    let file = File::open(path).context(ReadSnafu { path })?;
    Ok(BufReader::new(file))
}

/// Configuration of a [`crate::md::CapturePlanner`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
#[builder(doc)]
pub struct PlannerConfig {
    /// Number of equal sub-windows of the horizon, one capture is planned in each
    #[builder(default = 1)]
    pub intervals: usize,
    /// Time between two samples of the search, in seconds
    #[builder(default = 60.0)]
    pub search_step_s: f64,
    #[builder(default)]
    pub strategy: ExtremalSearchStrategy,
    /// Plan the windows on the rayon thread pool
    #[builder(default = true)]
    pub parallel: bool,
    #[builder(default)]
    pub show_progress: bool,
    #[builder(default)]
    pub capture: CaptureConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PlannerConfig {
    pub fn search_step(&self) -> Duration {
        self.search_step_s * Unit::Second
    }

    /// Checks the search and capture parameters. The interval count is checked when planning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.search_step_s.is_finite() && self.search_step_s > 0.0,
            InvalidConfigSnafu {
                msg: format!("search_step_s must be finite and positive, got {}", self.search_step_s)
            }
        );
        self.capture.validate()
    }
}

impl ConfigRepr for PlannerConfig {}

impl ConfigRepr for CaptureConfig {}
