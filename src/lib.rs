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
//! Harness for comparing congestion control schemes with Pantheon on MahiMahi-emulated links.
//!
//! Every (algorithm, profile) pair is tested by running Pantheon's test script inside `mm-delay`
//! and `mm-link`. The metrics Pantheon writes are collected into a results tree, combined into CSV
//! tables, and rendered as plots.

pub mod aggregate;
pub mod collector;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod profiles;
pub mod records;
pub mod render;
pub mod runner;
pub mod util;

#[cfg(test)]
mod test;

pub mod prelude {
    pub use super::{
        config::HarnessConfig,
        error::HarnessError,
        profiles::{Algorithm, NetworkProfile},
        records::{CombinedRow, MetricSample, TestResult},
        runner::{Executor, RunOutcome, Runner, ShellExecutor, TestCommand},
    };
}
