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
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::MultiProgress;

use ccbench::{
    config::HarnessArgs,
    pipeline,
    runner::{progress_bar, Runner},
    util,
};

#[tokio::main]
async fn main() -> Result<()> {
    let multi = MultiProgress::new();
    util::init_logging_with_progress(&multi);

    let args = HarnessArgs::parse();
    let config_file = args.config.clone();
    let config = args
        .into_config()
        .with_context(|| format!("Cannot load the configuration from {config_file:?}"))?;
    log::info!("Congestion Control Algorithm Test Framework");
    log::debug!("{config:#?}");

    config
        .setup_directories()
        .context("Cannot create the output directories")?;

    let runner = Runner::new(config).with_progress(multi.add(progress_bar()));
    let (results, records) = runner.run_all().await?;
    runner
        .write_manifest(records)
        .context("Cannot store the run manifest")?;

    let report = pipeline::report(&runner.config, &results)?;
    if report.is_empty() {
        log::error!("No valid test results were collected");
        process::exit(1)
    }

    log::info!(
        "All tests finished and results saved to {:?}, plots to {:?}",
        runner.config.results_dir,
        runner.config.graphs_dir
    );
    Ok(())
}
