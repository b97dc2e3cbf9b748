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
//! Congestion control algorithms under test and the emulated network profiles they are tested on.
use std::{path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    clap::ValueEnum,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
/// Congestion control schemes, named as Pantheon's `--schemes` argument expects them.
pub enum Algorithm {
    Bbr,
    Vivace,
    Vegas,
}

impl Algorithm {
    /// Line and marker color used for this algorithm in all plots.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Bbr => "#8A2BE2",
            Self::Vivace => "#DC143C",
            Self::Vegas => "#32CD32",
        }
    }

    /// Upper-case name used in plot legends.
    pub fn label(&self) -> String {
        self.to_string().to_uppercase()
    }

    /// Parse a scheme name, e.g., a directory name in the results tree.
    pub fn from_scheme(scheme: impl AsRef<str>) -> Result<Self, HarnessError> {
        let scheme = scheme.as_ref();
        Self::from_str(scheme).map_err(|_| HarnessError::UnknownAlgorithm(scheme.to_string()))
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::Bbr, Self::Vivace, Self::Vegas]
    }
}

/// Link parameters of an emulated network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkProfile {
    /// Name used in output paths and plot titles, e.g., `low_latency`.
    pub name: String,
    /// One-way delay in ms added by `mm-delay`.
    pub latency: u32,
    /// Downlink packet delivery trace for `mm-link`.
    pub dl_trace: PathBuf,
    /// Uplink packet delivery trace for `mm-link`.
    pub ul_trace: PathBuf,
}

impl NetworkProfile {
    pub fn new(
        name: impl Into<String>,
        latency: u32,
        dl_trace: impl Into<PathBuf>,
        ul_trace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            latency,
            dl_trace: dl_trace.into(),
            ul_trace: ul_trace.into(),
        }
    }

    /// Round-trip propagation delay in ms, as `mm-delay` delays both directions.
    pub fn base_rtt(&self) -> f64 {
        2.0 * self.latency as f64
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "low_latency",
                5,
                "mahimahi/traces/TMobile-LTE-driving.down",
                "mahimahi/traces/TMobile-LTE-driving.up",
            ),
            Self::new(
                "high_latency",
                200,
                "mahimahi/traces/TMobile-LTE-short.down",
                "mahimahi/traces/TMobile-LTE-short.up",
            ),
        ]
    }
}
