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
//! End-to-end tests of the pipeline, with the external tools replaced by a fake executor.
//!
//! ```shell
//! cargo test -- --nocapture
//! ```

use std::{
    fs,
    os::unix::process::ExitStatusExt,
    path::{Path, PathBuf},
    process::ExitStatus,
    sync::Mutex,
    time::SystemTime,
};

use crate::{
    config::HarnessConfig,
    error::HarnessError,
    profiles::Algorithm,
    runner::{Executor, TestCommand},
};

/// What the fake Pantheon does for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Exit successfully and write a metrics file.
    Metrics,
    /// Exit successfully and write an `mm-link` log, but no metrics.
    LinkLog,
    /// Exit successfully and write an `mm-link` log that is not valid UTF-8.
    BrokenLinkLog,
    /// Exit successfully without writing anything.
    Silent,
    /// Exit with status 1.
    Fail,
}

/// Executor that imitates Pantheon by writing files to the logs directory.
pub struct FakeExecutor {
    logs_dir: PathBuf,
    behavior: fn(Algorithm, &str) -> Behavior,
    pub executed: Mutex<Vec<TestCommand>>,
}

impl FakeExecutor {
    /// `behavior` decides what happens for an algorithm on a profile.
    pub fn new(logs_dir: impl AsRef<Path>, behavior: fn(Algorithm, &str) -> Behavior) -> Self {
        Self {
            logs_dir: logs_dir.as_ref().to_path_buf(),
            behavior,
            executed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl Executor for FakeExecutor {
    async fn execute(&self, command: &TestCommand) -> Result<ExitStatus, HarnessError> {
        let n = {
            let mut executed = self.executed.lock().unwrap();
            executed.push(command.clone());
            executed.len()
        };
        let algorithm = command.algorithm;
        match (self.behavior)(algorithm, &command.profile) {
            Behavior::Metrics => {
                // throughput and rtt differ per run to tell them apart
                let content = (0..4).fold(
                    "throughput,rtt,loss_rate\n".to_string(),
                    |acc, i| format!("{acc}{},{},0.0{i}\n", n * 10 + i, 20 * n + i),
                );
                let path = self.logs_dir.join(format!("metrics_{algorithm}_{n}.csv"));
                fs::write(&path, content)?;
                // the kernel stamps files with a coarse clock, which may lag behind the start
                // time the runner took
                fs::File::options()
                    .write(true)
                    .open(&path)?
                    .set_modified(SystemTime::now())?;
            }
            Behavior::LinkLog => {
                fs::write(
                    command.result_path.join("downlink.log"),
                    "# base timestamp: 0\n0 + 1500\n3 - 1500 4\n1000 + 1500\n1001 d 1 1500\n",
                )?;
            }
            Behavior::BrokenLinkLog => {
                fs::write(command.result_path.join("downlink.log"), b"0 + 1500\n\xff\xfe\n")?;
            }
            Behavior::Silent => {}
            Behavior::Fail => return Ok(ExitStatus::from_raw(1 << 8)),
        }
        fs::write(command.result_path.join("log.txt"), "done\n")?;
        Ok(ExitStatus::from_raw(0))
    }
}

/// Configuration with all output trees inside `root`.
pub fn test_config(root: &Path) -> HarnessConfig {
    HarnessConfig {
        results_dir: root.join("results"),
        graphs_dir: root.join("graphs"),
        logs_dir: root.join("logs"),
        pantheon_dir: root.to_path_buf(),
        ..Default::default()
    }
}

mod pipeline;
