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
//! Module defining record data types to (de-)serialize measurements and summaries to CSV.
use serde::{Deserialize, Serialize};

use crate::profiles::Algorithm;

/// One measurement interval of a single run, as written by Pantheon to `metrics_<scheme>_*.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MetricSample {
    /// Throughput in Mbps
    pub throughput: f64,
    /// Round-trip time in ms
    pub rtt: f64,
    /// Fraction of lost bytes, if the log reports it
    #[serde(default)]
    pub loss_rate: Option<f64>,
}

/// The parsed samples of one (algorithm, profile) run.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub algorithm: Algorithm,
    pub profile: String,
    pub samples: Vec<MetricSample>,
}

/// A sample of a run, tagged with the run it belongs to.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CombinedRow {
    pub scheme: Algorithm,
    pub profile: String,
    /// Index of the sample within its run, i.e., seconds since the start of the run.
    pub timestamp: usize,
    pub throughput: f64,
    pub rtt: f64,
    pub loss_rate: Option<f64>,
}

/// Average and tail RTT of one (algorithm, profile) pair.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RttSummary {
    #[serde(rename = "Algorithm")]
    pub algorithm: Algorithm,
    #[serde(rename = "Profile")]
    pub profile: String,
    #[serde(rename = "Avg RTT")]
    pub avg_rtt: f64,
    #[serde(rename = "95th RTT")]
    pub p95_rtt: f64,
}

/// Aggregated metrics of a single run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunSummary {
    pub profile: String,
    pub algorithm: Algorithm,
    pub samples: usize,
    pub avg_throughput: f64,
    pub std_throughput: Option<f64>,
    pub avg_rtt: f64,
    pub p95_rtt: f64,
    pub avg_loss_rate: Option<f64>,
}
