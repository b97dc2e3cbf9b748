// ccbench: Congestion-Control Experiments with Pantheon over MahiMahi-Emulated Links
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Configuration of an experiment batch: which algorithms run on which network profiles, and
//! where the external tools and the output trees live.
use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::{
    error::HarnessError,
    profiles::{Algorithm, NetworkProfile},
    util::PathBufExt,
};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Algorithms to test, in order.
    pub algorithms: Vec<Algorithm>,
    /// Network profiles to test on, in order.
    pub profiles: Vec<NetworkProfile>,
    pub results_dir: PathBuf,
    pub graphs_dir: PathBuf,
    /// Directory where Pantheon writes its `metrics_<scheme>_*.csv` files.
    pub logs_dir: PathBuf,
    /// Working directory of the test command (the Pantheon checkout).
    pub pantheon_dir: PathBuf,
    pub test_script: PathBuf,
    pub python: String,
    /// Also record a `downlink.log` of `mm-link` for every run.
    pub link_log: bool,
    /// Filename of the combined data points, placed in `results_dir`.
    pub combined_csv: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            algorithms: Algorithm::defaults(),
            profiles: NetworkProfile::defaults(),
            results_dir: "results".into(),
            graphs_dir: "graphs".into(),
            logs_dir: "logs".into(),
            pantheon_dir: ".".into(),
            test_script: "tests/test_schemes.py".into(),
            python: "python3".to_string(),
            link_log: false,
            combined_csv: "combined.csv".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Read the configuration from a JSON file. Missing fields take their default value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {path:?}");
        let config = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(config)
    }

    /// Only keep the given algorithms and profiles. Empty selections keep everything.
    pub fn restrict(&mut self, algorithms: &[Algorithm], profiles: &[String]) {
        if !algorithms.is_empty() {
            self.algorithms.retain(|a| algorithms.contains(a));
        }
        if !profiles.is_empty() {
            self.profiles.retain(|p| profiles.contains(&p.name));
        }
    }

    /// Create the results, graphs and logs directories.
    pub fn setup_directories(&self) -> Result<(), HarnessError> {
        for dir in [&self.results_dir, &self.graphs_dir, &self.logs_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Output folder of a single run, i.e., `<results>/profile_<profile>/<algorithm>`.
    pub fn result_path(&self, profile: &NetworkProfile, algorithm: Algorithm) -> PathBuf {
        self.results_dir
            .as_path()
            .then(format!("profile_{}", profile.name))
            .then(algorithm.to_string())
    }

    pub fn combined_csv_path(&self) -> PathBuf {
        self.results_dir.as_path().then(&self.combined_csv)
    }
}

/// Command line of the `ccbench` driver. Every flag overrides the configuration file.
#[derive(Parser, Debug, Default)]
#[command(about, long_about = None)]
pub struct HarnessArgs {
    /// Load the experiment configuration from this JSON file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Overwrite the output path for the collected results.
    #[arg(short, long)]
    pub results_dir: Option<PathBuf>,
    /// Overwrite the output path for plots.
    #[arg(short, long)]
    pub graphs_dir: Option<PathBuf>,
    /// Overwrite the path where Pantheon stores its metrics.
    #[arg(short, long)]
    pub logs_dir: Option<PathBuf>,
    /// Only test these algorithms. Can be applied multiple times.
    #[arg(short, long, value_enum)]
    pub algorithm: Vec<Algorithm>,
    /// Only test on the network profiles with these names. Can be applied multiple times.
    #[arg(short, long)]
    pub profile: Vec<String>,
    /// Record the downlink log of mm-link for every run.
    #[arg(long)]
    pub link_log: bool,
}

impl HarnessArgs {
    /// Load the configuration file (or the defaults) and apply the overrides.
    pub fn into_config(self) -> Result<HarnessConfig, HarnessError> {
        let config = match &self.config {
            Some(path) => HarnessConfig::load(path)?,
            None => HarnessConfig::default(),
        };
        Ok(self.apply(config))
    }

    /// Apply the overrides to `config`.
    pub fn apply(self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(dir) = self.results_dir {
            config.results_dir = dir;
        }
        if let Some(dir) = self.graphs_dir {
            config.graphs_dir = dir;
        }
        if let Some(dir) = self.logs_dir {
            config.logs_dir = dir;
        }
        config.link_log |= self.link_log;
        config.restrict(&self.algorithm, &self.profile);
        config
    }
}
