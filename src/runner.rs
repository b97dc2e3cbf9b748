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
//! Module that runs Pantheon inside the MahiMahi shells for every (algorithm, profile)
//! combination and collects the produced metrics.

use std::{
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
    process::ExitStatus,
    time::SystemTime,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::process::Command;

use ccbench_utils::other::get_timestamp;

use crate::{
    collector::{collect_metrics, LINK_LOG, TEST_LOG},
    config::HarnessConfig,
    error::HarnessError,
    parser::read_metrics,
    profiles::{Algorithm, NetworkProfile},
    records::TestResult,
    util::PathBufExt,
};

/// Shell command running Pantheon's test script for a single scheme inside
/// `mm-delay` and `mm-link`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCommand {
    pub algorithm: Algorithm,
    pub profile: String,
    /// Folder the test log (and link log) is written to.
    pub result_path: PathBuf,
    pub command: String,
}

impl TestCommand {
    pub fn new(
        config: &HarnessConfig,
        algorithm: Algorithm,
        profile: &NetworkProfile,
        result_path: &Path,
    ) -> Self {
        let result = result_path.display();
        let link_log = if config.link_log {
            format!(" --downlink-log={}", result_path.then(LINK_LOG).display())
        } else {
            String::new()
        };
        let command = format!(
            "mm-delay {latency} mm-link {dl} {ul}{link_log} -- bash -c '{python} {script} --schemes \"{algorithm}\" > {result}/{TEST_LOG} 2>&1'",
            latency = profile.latency,
            dl = profile.dl_trace.display(),
            ul = profile.ul_trace.display(),
            python = config.python,
            script = config.test_script.display(),
        );
        Self {
            algorithm,
            profile: profile.name.clone(),
            result_path: result_path.to_path_buf(),
            command,
        }
    }
}

impl Display for TestCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)
    }
}

/// Executes test commands.
#[async_trait::async_trait]
pub trait Executor {
    async fn execute(&self, command: &TestCommand) -> Result<ExitStatus, HarnessError>;
}

/// Runs the test command with `sh -c` in the Pantheon directory.
pub struct ShellExecutor {
    pub working_dir: PathBuf,
}

#[async_trait::async_trait]
impl Executor for ShellExecutor {
    async fn execute(&self, command: &TestCommand) -> Result<ExitStatus, HarnessError> {
        log::debug!("Executing: {command}");
        let status = Command::new("sh")
            .arg("-c")
            .arg(&command.command)
            .current_dir(&self.working_dir)
            .status()
            .await?;
        Ok(status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The run succeeded and its metrics are stored at the given path.
    Collected(PathBuf),
    /// The run succeeded, but no metrics were found.
    NoMetrics,
    /// The test command could not be run or exited with a failure.
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub profile: String,
    pub algorithm: Algorithm,
    pub outcome: RunOutcome,
}

/// Everything that happened during `Runner::run_all`, stored as `run_<timestamp>.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest<'a> {
    pub timestamp: String,
    pub config: &'a HarnessConfig,
    pub runs: Vec<RunRecord>,
}

pub struct Runner<E> {
    pub config: HarnessConfig,
    executor: E,
    progress: Option<ProgressBar>,
}

impl Runner<ShellExecutor> {
    pub fn new(config: HarnessConfig) -> Self {
        let executor = ShellExecutor {
            working_dir: config.pantheon_dir.clone(),
        };
        Self::with_executor(config, executor)
    }
}

impl<E: Executor> Runner<E> {
    pub fn with_executor(config: HarnessConfig, executor: E) -> Self {
        Self {
            config,
            executor,
            progress: None,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Report the progress of `run_all` on this bar.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Run a single test and collect its metrics.
    pub async fn run_single(
        &self,
        algorithm: Algorithm,
        profile: &NetworkProfile,
    ) -> Result<RunOutcome, HarnessError> {
        let result_path = self.config.result_path(profile, algorithm);
        fs::create_dir_all(&result_path)?;

        let command = TestCommand::new(&self.config, algorithm, profile, &result_path);
        let label = algorithm.label();
        let profile_name = &profile.name;
        // metrics files older than this belong to earlier runs
        let started = SystemTime::now();
        match self.executor.execute(&command).await {
            Ok(status) if status.success() => {
                log::info!("{label} test completed for Profile {profile_name}");
            }
            Ok(status) => {
                log::error!("Test failed for {label} (Profile {profile_name}): {status}");
                return Ok(RunOutcome::Failed(status.to_string()));
            }
            Err(e) => {
                log::error!("Test failed for {label} (Profile {profile_name}): {e}");
                return Ok(RunOutcome::Failed(e.to_string()));
            }
        }

        match collect_metrics(
            &self.config.logs_dir,
            algorithm,
            &result_path,
            profile.base_rtt(),
            started,
        )? {
            Some(path) => {
                log::info!("Metrics file saved for {label} (Profile {profile_name})");
                Ok(RunOutcome::Collected(path))
            }
            None => {
                log::warn!("No metrics file found for {label} (Profile {profile_name})");
                Ok(RunOutcome::NoMetrics)
            }
        }
    }

    /// Run all configured tests, profile by profile, and load the collected metrics.
    ///
    /// Failed runs and unreadable metrics are logged and skipped.
    pub async fn run_all(&self) -> Result<(Vec<TestResult>, Vec<RunRecord>), HarnessError> {
        let mut results = Vec::new();
        let mut records = Vec::new();

        if let Some(bar) = &self.progress {
            bar.set_length((self.config.profiles.len() * self.config.algorithms.len()) as u64);
        }

        for profile in &self.config.profiles {
            log::info!(
                "Running tests for Network Profile {} (latency = {} ms)",
                profile.name,
                profile.latency
            );
            for &algorithm in &self.config.algorithms {
                log::info!("Testing congestion control algorithm: {}", algorithm.label());
                if let Some(bar) = &self.progress {
                    bar.set_message(format!("{} / {}", profile.name, algorithm));
                }

                let outcome = match self.run_single(algorithm, profile).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        log::error!(
                            "Cannot collect the results of {} (Profile {}): {e}",
                            algorithm.label(),
                            profile.name
                        );
                        RunOutcome::Failed(e.to_string())
                    }
                };
                if let RunOutcome::Collected(path) = &outcome {
                    match read_metrics(path) {
                        Ok(samples) => results.push(TestResult {
                            algorithm,
                            profile: profile.name.clone(),
                            samples,
                        }),
                        Err(e) => log::error!("Cannot load metrics of {algorithm}: {e}"),
                    }
                }
                records.push(RunRecord {
                    profile: profile.name.clone(),
                    algorithm,
                    outcome,
                });

                if let Some(bar) = &self.progress {
                    bar.inc(1);
                }
            }
        }

        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }

        Ok((results, records))
    }

    /// Store the manifest of a batch in the results directory.
    pub fn write_manifest(&self, runs: Vec<RunRecord>) -> Result<PathBuf, HarnessError> {
        let manifest = RunManifest {
            timestamp: get_timestamp(),
            config: &self.config,
            runs,
        };
        let path = self
            .config
            .results_dir
            .as_path()
            .then(format!("run_{}.json", manifest.timestamp));
        fs::write(&path, serde_json::to_string_pretty(&manifest)?)?;
        log::debug!("Stored the run manifest at {path:?}");
        Ok(path)
    }
}

/// Progress bar for `Runner::run_all`.
pub fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("[{bar:40}] {pos}/{len} {msg}, elapsed: {elapsed}")
    {
        bar.set_style(style.progress_chars("##-"));
    }
    bar
}
