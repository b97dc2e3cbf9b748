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
use std::{collections::HashSet, fs};

use itertools::Itertools;

use super::{test_config, Behavior, FakeExecutor};
use crate::{
    pipeline::{load_results, report},
    profiles::Algorithm,
    records::RttSummary,
    runner::{RunOutcome, Runner},
};

fn only_bbr(algorithm: Algorithm, _profile: &str) -> Behavior {
    match algorithm {
        Algorithm::Bbr => Behavior::Metrics,
        Algorithm::Vivace => Behavior::Fail,
        Algorithm::Vegas => Behavior::Silent,
    }
}

#[tokio::test]
async fn run_all_collects_successful_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.setup_directories().unwrap();
    let runner = Runner::with_executor(config.clone(), FakeExecutor::new(&config.logs_dir, only_bbr));

    let (results, records) = runner.run_all().await.unwrap();

    assert_eq!(
        results
            .iter()
            .map(|r| (r.algorithm, r.profile.as_str()))
            .collect_vec(),
        [
            (Algorithm::Bbr, "low_latency"),
            (Algorithm::Bbr, "high_latency")
        ]
    );
    // the second bbr run is the fourth command overall
    assert_eq!(
        results[1].samples.iter().map(|s| s.throughput).collect_vec(),
        [40.0, 41.0, 42.0, 43.0]
    );
    assert_eq!(results[0].samples[2].loss_rate, Some(0.02));

    let outcomes = records.iter().map(|r| &r.outcome).collect_vec();
    assert_eq!(outcomes.len(), 6);
    assert!(matches!(outcomes[0], RunOutcome::Collected(_)));
    assert!(matches!(outcomes[1], RunOutcome::Failed(_)));
    assert_eq!(outcomes[2], &RunOutcome::NoMetrics);

    let run_dir = config.results_dir.join("profile_high_latency").join("bbr");
    assert!(run_dir.join("bbr_cc_log.csv").exists());
    assert!(run_dir.join("log.txt").exists());
    // failed runs still get their folder
    assert!(config
        .results_dir
        .join("profile_low_latency")
        .join("vivace")
        .is_dir());
}

#[tokio::test]
async fn commands_follow_profile_then_algorithm_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.setup_directories().unwrap();
    let runner = Runner::with_executor(config.clone(), FakeExecutor::new(&config.logs_dir, only_bbr));
    runner.run_all().await.unwrap();

    let executed = runner_commands(&runner);
    assert_eq!(
        executed,
        [
            ("low_latency", Algorithm::Bbr),
            ("low_latency", Algorithm::Vivace),
            ("low_latency", Algorithm::Vegas),
            ("high_latency", Algorithm::Bbr),
            ("high_latency", Algorithm::Vivace),
            ("high_latency", Algorithm::Vegas),
        ]
        .map(|(p, a)| (p.to_string(), a))
    );
}

fn runner_commands(runner: &Runner<FakeExecutor>) -> Vec<(String, Algorithm)> {
    runner
        .executor()
        .executed
        .lock()
        .unwrap()
        .iter()
        .map(|c| (c.profile.clone(), c.algorithm))
        .collect()
}

#[tokio::test]
async fn link_log_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.link_log = true;
    config.restrict(&[Algorithm::Vegas], &["low_latency".to_string()]);
    config.setup_directories().unwrap();
    let runner = Runner::with_executor(
        config.clone(),
        FakeExecutor::new(&config.logs_dir, |_, _| Behavior::LinkLog),
    );

    let (results, _) = runner.run_all().await.unwrap();
    assert_eq!(results.len(), 1);
    let samples = &results[0].samples;
    assert_eq!(samples.len(), 2);
    assert!((samples[0].throughput - 0.012).abs() < 1e-9);
    // 2 * 5 ms propagation + 4 ms queueing
    assert!((samples[0].rtt - 14.0).abs() < 1e-9);
    assert_eq!(samples[0].loss_rate, Some(0.0));
    assert_eq!(samples[1].loss_rate, Some(1.0));

    assert!(runner.executor().executed.lock().unwrap()[0]
        .command
        .contains("--downlink-log="));
}

#[tokio::test]
async fn unreadable_link_log_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.link_log = true;
    config.setup_directories().unwrap();
    let runner = Runner::with_executor(
        config.clone(),
        FakeExecutor::new(&config.logs_dir, |algorithm, profile| {
            match (algorithm, profile) {
                (Algorithm::Bbr, "low_latency") => Behavior::BrokenLinkLog,
                _ => Behavior::Metrics,
            }
        }),
    );

    let (results, records) = runner.run_all().await.unwrap();

    assert_eq!(runner_commands(&runner).len(), 6);
    assert_eq!(records.len(), 6);
    assert!(matches!(records[0].outcome, RunOutcome::Failed(_)));
    assert!(records[1..]
        .iter()
        .all(|r| matches!(r.outcome, RunOutcome::Collected(_))));
    assert_eq!(results.len(), 5);
    assert!(!results
        .iter()
        .any(|r| r.algorithm == Algorithm::Bbr && r.profile == "low_latency"));
}

#[tokio::test]
async fn link_log_is_used_when_only_an_earlier_profile_wrote_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.link_log = true;
    config.restrict(&[Algorithm::Vegas], &[]);
    config.setup_directories().unwrap();
    let runner = Runner::with_executor(
        config.clone(),
        FakeExecutor::new(&config.logs_dir, |_, profile| match profile {
            "low_latency" => Behavior::Metrics,
            _ => Behavior::LinkLog,
        }),
    );

    let (results, _) = runner.run_all().await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].profile, "low_latency");
    assert_eq!(results[0].samples[0].rtt, 20.0);

    assert_eq!(results[1].profile, "high_latency");
    let samples = &results[1].samples;
    assert_eq!(samples.len(), 2);
    assert!(samples.iter().all(|s| s.rtt >= 400.0));
    // 2 * 200 ms propagation + 4 ms queueing
    assert!((samples[0].rtt - 404.0).abs() < 1e-9);
}

#[tokio::test]
async fn report_writes_tables_and_plots() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.setup_directories().unwrap();
    let runner = Runner::with_executor(config.clone(), FakeExecutor::new(&config.logs_dir, only_bbr));
    let (results, _) = runner.run_all().await.unwrap();

    let written = report(&config, &results).unwrap();
    assert!(!written.is_empty());
    assert_eq!(written.plots.len(), 6);
    assert!(written.plots.iter().all(|p| p.starts_with(&config.graphs_dir)));
    assert!(written.combined_csv.unwrap().exists());
    assert!(written.run_summary_csv.unwrap().exists());

    let mut csv = csv::Reader::from_path(written.rtt_summary_csv.unwrap()).unwrap();
    let summary: Vec<RttSummary> = csv.deserialize().map(Result::unwrap).collect();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].profile, "low_latency");
    assert_eq!(summary[0].avg_rtt, 21.5);
    assert!((summary[0].p95_rtt - 22.85).abs() < 1e-9);
    assert_eq!(summary[1].avg_rtt, 81.5);
}

#[tokio::test]
async fn results_tree_can_be_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.setup_directories().unwrap();
    let runner = Runner::with_executor(config.clone(), FakeExecutor::new(&config.logs_dir, only_bbr));
    let (results, records) = runner.run_all().await.unwrap();
    runner.write_manifest(records).unwrap();
    report(&config, &results).unwrap();

    // neither the manifest nor the CSV tables confuse the scan
    let reloaded = load_results(&config.results_dir).unwrap();
    let key = |r: &crate::records::TestResult| (r.profile.clone(), r.algorithm, r.samples.len());
    assert_eq!(
        reloaded.iter().map(key).collect::<HashSet<_>>(),
        results.iter().map(key).collect::<HashSet<_>>()
    );
    // sorted by profile name
    assert_eq!(reloaded[0].profile, "high_latency");
}

#[tokio::test]
async fn manifest_records_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.setup_directories().unwrap();
    let runner = Runner::with_executor(config.clone(), FakeExecutor::new(&config.logs_dir, only_bbr));
    let (_, records) = runner.run_all().await.unwrap();

    let path = runner.write_manifest(records).unwrap();
    assert!(crate::util::file_name(&path).starts_with("run_"));
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let runs = manifest["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 6);
    assert!(runs[0]["outcome"]["collected"].is_string());
    assert!(runs[1]["outcome"]["failed"].is_string());
    assert_eq!(runs[2]["outcome"], "no_metrics");
    assert_eq!(manifest["config"]["algorithms"][1], "vivace");
}

#[tokio::test]
async fn nothing_to_report_when_all_runs_fail() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.setup_directories().unwrap();
    let runner = Runner::with_executor(
        config.clone(),
        FakeExecutor::new(&config.logs_dir, |_, _| Behavior::Fail),
    );
    let (results, _) = runner.run_all().await.unwrap();
    assert!(results.is_empty());

    let written = report(&config, &results).unwrap();
    assert!(written.is_empty());
    assert_eq!(fs::read_dir(&config.graphs_dir).unwrap().count(), 0);
}
