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
//! The steps shared by all binaries after the tests ran: load, aggregate, write CSVs, render.
use std::{
    fs,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::{
    aggregate::{prepare_data, rtt_summary, run_summary, write_csv},
    collector::scan_results,
    config::HarnessConfig,
    error::HarnessError,
    parser::read_metrics,
    records::TestResult,
    render::generate_plots,
    util::PathBufExt,
};

pub const RTT_SUMMARY_CSV: &str = "rtt_summary.csv";
pub const RUN_SUMMARY_CSV: &str = "summary.csv";

/// Files written by `report`.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub combined_csv: Option<PathBuf>,
    pub run_summary_csv: Option<PathBuf>,
    pub rtt_summary_csv: Option<PathBuf>,
    pub plots: Vec<PathBuf>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.combined_csv.is_none() && self.plots.is_empty()
    }
}

/// Load all collected metrics from an existing results tree. Unreadable files are skipped.
pub fn load_results(results_dir: impl AsRef<Path>) -> Result<Vec<TestResult>, HarnessError> {
    Ok(scan_results(results_dir)?
        .into_par_iter()
        .map(|(profile, algorithm, path)| {
            read_metrics(&path)
                .map(|samples| TestResult {
                    algorithm,
                    profile,
                    samples,
                })
                .map_err(|e| log::error!("Skipping {path:?}: {e}"))
                .ok()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect())
}

/// Aggregate the results, write the combined data and the summaries, and render all plots.
pub fn report(config: &HarnessConfig, results: &[TestResult]) -> Result<Report, HarnessError> {
    let rows = prepare_data(results);
    if rows.is_empty() {
        log::error!("No data available for plotting");
        return Ok(Report::default());
    }

    fs::create_dir_all(&config.results_dir)?;
    fs::create_dir_all(&config.graphs_dir)?;

    let combined_csv = config.combined_csv_path();
    write_csv(&rows, &combined_csv)?;

    let run_summary_csv = config.results_dir.as_path().then(RUN_SUMMARY_CSV);
    write_csv(&run_summary(&rows), &run_summary_csv)?;

    let rtt = rtt_summary(&rows);
    let rtt_summary_csv = config.graphs_dir.as_path().then(RTT_SUMMARY_CSV);
    write_csv(&rtt, &rtt_summary_csv)?;
    log::info!("Generated RTT summary statistics");

    let plots = generate_plots(&rows, &rtt, &config.graphs_dir)?;

    Ok(Report {
        combined_csv: Some(combined_csv),
        run_summary_csv: Some(run_summary_csv),
        rtt_summary_csv: Some(rtt_summary_csv),
        plots,
    })
}
