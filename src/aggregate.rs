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
//! Combines the samples of all runs into one table and computes per-run summaries.
use std::path::Path;

use itertools::Itertools;
use serde::Serialize;

use ccbench_utils::stats;

use crate::{
    error::HarnessError,
    profiles::Algorithm,
    records::{CombinedRow, RttSummary, RunSummary, TestResult},
};

/// Flatten all results into rows tagged with scheme, profile and the sample index of the run.
pub fn prepare_data(results: &[TestResult]) -> Vec<CombinedRow> {
    results
        .iter()
        .flat_map(|result| {
            result
                .samples
                .iter()
                .enumerate()
                .map(move |(timestamp, sample)| CombinedRow {
                    scheme: result.algorithm,
                    profile: result.profile.clone(),
                    timestamp,
                    throughput: sample.throughput,
                    rtt: sample.rtt,
                    loss_rate: sample.loss_rate,
                })
        })
        .collect()
}

/// Whether any row reports a loss rate.
pub fn has_loss_rate(rows: &[CombinedRow]) -> bool {
    rows.iter().any(|r| r.loss_rate.is_some())
}

/// Profiles in order of their first appearance.
pub fn profiles(rows: &[CombinedRow]) -> Vec<&str> {
    rows.iter().map(|r| r.profile.as_str()).unique().collect()
}

/// Algorithms in order of their first appearance.
pub fn schemes(rows: &[CombinedRow]) -> Vec<Algorithm> {
    rows.iter().map(|r| r.scheme).unique().collect()
}

/// All rows of a single run, in sample order.
pub fn run_rows<'a>(
    rows: &'a [CombinedRow],
    algorithm: Algorithm,
    profile: &'a str,
) -> impl Iterator<Item = &'a CombinedRow> + 'a {
    rows.iter()
        .filter(move |r| r.scheme == algorithm && r.profile == profile)
}

/// Iterate over all (profile, algorithm) pairs that have data, profile-major, both in order of
/// first appearance.
fn runs(rows: &[CombinedRow]) -> impl Iterator<Item = (&str, Algorithm, Vec<&CombinedRow>)> {
    let schemes = schemes(rows);
    profiles(rows)
        .into_iter()
        .cartesian_product(schemes)
        .map(|(profile, algorithm)| (profile, algorithm, run_rows(rows, algorithm, profile).collect_vec()))
        .filter(|(_, _, run)| !run.is_empty())
}

/// Mean and 95th percentile RTT per (algorithm, profile).
pub fn rtt_summary(rows: &[CombinedRow]) -> Vec<RttSummary> {
    runs(rows)
        .filter_map(|(profile, algorithm, run)| {
            let rtts = run.iter().map(|r| r.rtt).collect_vec();
            Some(RttSummary {
                algorithm,
                profile: profile.to_string(),
                avg_rtt: stats::mean(&rtts)?,
                p95_rtt: stats::quantile(&rtts, 0.95)?,
            })
        })
        .collect()
}

/// Aggregated metrics per (algorithm, profile).
pub fn run_summary(rows: &[CombinedRow]) -> Vec<RunSummary> {
    runs(rows)
        .filter_map(|(profile, algorithm, run)| {
            let throughputs = run.iter().map(|r| r.throughput).collect_vec();
            let rtts = run.iter().map(|r| r.rtt).collect_vec();
            let losses = run.iter().filter_map(|r| r.loss_rate).collect_vec();
            Some(RunSummary {
                profile: profile.to_string(),
                algorithm,
                samples: run.len(),
                avg_throughput: stats::mean(&throughputs)?,
                std_throughput: stats::std_dev(&throughputs),
                avg_rtt: stats::mean(&rtts)?,
                p95_rtt: stats::quantile(&rtts, 0.95)?,
                avg_loss_rate: stats::mean(&losses),
            })
        })
        .collect()
}

/// Write all records to a CSV file with a header row.
pub fn write_csv<T: Serialize>(records: &[T], path: impl AsRef<Path>) -> Result<(), HarnessError> {
    let path = path.as_ref();
    log::debug!("Writing {} records to {path:?}", records.len());
    let mut csv = csv::Writer::from_path(path)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}
