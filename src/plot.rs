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
use std::{path::PathBuf, process};

use anyhow::{Context, Result};
use clap::Parser;

use ccbench::{config::HarnessConfig, pipeline, util};

/// Aggregate and plot the metrics of an existing results tree, without running any tests.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Overwrite the input path for the collected results.
    #[arg(short, long, default_value = "./results/")]
    results_dir: PathBuf,
    /// Overwrite the output path for plots.
    #[arg(short, long, default_value = "./graphs/")]
    graphs_dir: PathBuf,
}

fn main() -> Result<()> {
    util::init_logging();

    let args = Args::parse();
    let config = HarnessConfig {
        results_dir: args.results_dir,
        graphs_dir: args.graphs_dir,
        ..Default::default()
    };

    // ensure that the data folder exists
    if !config.results_dir.exists() {
        log::error!("Could not read data in {:?}!", config.results_dir);
        process::exit(1)
    }

    let results = pipeline::load_results(&config.results_dir)
        .with_context(|| format!("Cannot scan {:?}", config.results_dir))?;
    log::info!("Loaded {} runs", results.len());

    let report = pipeline::report(&config, &results)?;
    for plot in &report.plots {
        log::debug!("Plotted {plot:?}");
    }
    if report.is_empty() {
        process::exit(1)
    }
    Ok(())
}
