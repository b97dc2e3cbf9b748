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
//! Locates the output files of the external tools and stores them in the results tree.
//!
//! The results tree has the layout `<results>/profile_<profile>/<algorithm>/`, containing
//! - `log.txt`: stdout and stderr of Pantheon's test script,
//! - `<algorithm>_cc_log.csv`: the metrics of the run,
//! - `downlink.log`: the `mm-link` downlink log, if enabled.
use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use itertools::Itertools;

use crate::{
    error::HarnessError,
    parser::{link_log_to_samples, write_metrics, LinkLogParser},
    profiles::Algorithm,
    util::{file_name, PathBufExt},
};

pub const LINK_LOG: &str = "downlink.log";
pub const TEST_LOG: &str = "log.txt";
const PROFILE_DIR_PREFIX: &str = "profile_";
const LINK_LOG_BIN_MS: u64 = 1000;

/// Filename of the collected metrics of a run.
pub fn metrics_filename(algorithm: Algorithm) -> String {
    format!("{algorithm}_cc_log.csv")
}

/// Find the most recently modified `metrics_<algorithm>_*.csv` in `logs_dir`. Files last
/// modified before `since` are ignored.
pub fn find_newest_metrics(
    logs_dir: impl AsRef<Path>,
    algorithm: Algorithm,
    since: SystemTime,
) -> Result<Option<PathBuf>, HarnessError> {
    let pattern = logs_dir
        .as_ref()
        .then(format!("metrics_{algorithm}_*.csv"))
        .to_string_lossy()
        .to_string();

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        let modified = fs::metadata(&path)?.modified()?;
        if modified < since {
            log::trace!("Ignoring {path:?}, written before the current run");
            continue;
        }
        if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Copy the newest metrics file of `algorithm` written since `since` into `result_path`. If
/// Pantheon did not write any metrics, but `result_path` holds a link log, the metrics are
/// derived from that log instead.
///
/// Returns the path of the stored metrics, or `None` if neither source exists.
pub fn collect_metrics(
    logs_dir: impl AsRef<Path>,
    algorithm: Algorithm,
    result_path: impl AsRef<Path>,
    base_rtt: f64,
    since: SystemTime,
) -> Result<Option<PathBuf>, HarnessError> {
    let result_path = result_path.as_ref();
    let target = result_path.then(metrics_filename(algorithm));

    if let Some(newest) = find_newest_metrics(logs_dir, algorithm, since)? {
        log::debug!("Copy {newest:?} to {target:?}");
        fs::copy(&newest, &target)?;
        return Ok(Some(target));
    }

    let link_log = result_path.then(LINK_LOG);
    if link_log.exists() {
        log::info!("No metrics of {algorithm} found, deriving them from {link_log:?}");
        let events = LinkLogParser::parse_file(&link_log)?;
        let samples = link_log_to_samples(&events, LINK_LOG_BIN_MS, base_rtt);
        write_metrics(&samples, &target)?;
        return Ok(Some(target));
    }

    Ok(None)
}

/// Find all collected metrics in an existing results tree, as `(profile, algorithm, path)`.
/// Profiles are sorted by name, algorithms in their natural order.
pub fn scan_results(
    results_dir: impl AsRef<Path>,
) -> Result<Vec<(String, Algorithm, PathBuf)>, HarnessError> {
    let results_dir = results_dir.as_ref();
    let mut found = Vec::new();

    for profile_dir in fs::read_dir(results_dir)? {
        let profile_path = profile_dir?.path();
        let dir_name = file_name(&profile_path);
        let Some(profile) = dir_name.strip_prefix(PROFILE_DIR_PREFIX) else {
            continue;
        };
        if !profile_path.is_dir() {
            continue;
        }

        for algorithm_dir in fs::read_dir(&profile_path)? {
            let algorithm_path = algorithm_dir?.path();
            if !algorithm_path.is_dir() {
                continue;
            }
            let algorithm = match Algorithm::from_scheme(file_name(&algorithm_path)) {
                Ok(algorithm) => algorithm,
                Err(e) => {
                    log::warn!("Skipping {algorithm_path:?}: {e}");
                    continue;
                }
            };
            let metrics = algorithm_path.as_path().then(metrics_filename(algorithm));
            if metrics.exists() {
                found.push((profile.to_string(), algorithm, metrics));
            } else {
                log::trace!("Skipping {algorithm_path:?} as it has no collected metrics yet.");
            }
        }
    }

    Ok(found
        .into_iter()
        .sorted_by(|a, b| human_sort::compare(&a.0, &b.0).then(a.1.cmp(&b.1)))
        .collect())
}
