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
//! Renders the comparison plots as plotly HTML files.
use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use plotly::{
    common::{Line, Marker, MarkerSymbol, Mode, Title},
    layout::{Axis, BarMode, Layout},
    Bar, Plot, Scatter,
};

use ccbench_utils::stats;

use crate::{
    aggregate::{has_loss_rate, profiles, run_rows, schemes},
    error::HarnessError,
    records::{CombinedRow, RttSummary},
    util::PathBufExt,
};

const LINE_WIDTH: f64 = 2.0;
const MARKER_SIZE: usize = 6;

fn layout(title: &str, x_label: &str, y_label: &str) -> Layout {
    Layout::new()
        .title(Title::with_text(title))
        .x_axis(Axis::new().title(Title::with_text(x_label)))
        .y_axis(Axis::new().title(Title::with_text(y_label)))
}

fn write_plot(plot: &Plot, path: PathBuf) -> Result<PathBuf, HarnessError> {
    log::debug!("Plotting {path:?}");
    fs::write(&path, plot.to_html())?;
    Ok(path)
}

/// Line plot of one metric over time, one trace per algorithm, for a single profile.
fn plot_over_time<F>(
    rows: &[CombinedRow],
    profile: &str,
    metric: F,
    symbol: MarkerSymbol,
    layout: Layout,
) -> Plot
where
    F: Fn(&CombinedRow) -> Option<f64>,
{
    let mut plot = Plot::new();
    for algorithm in schemes(rows) {
        let (xs, ys): (Vec<usize>, Vec<f64>) = run_rows(rows, algorithm, profile)
            .filter_map(|r| metric(r).map(|y| (r.timestamp, y)))
            .unzip();
        if xs.is_empty() {
            continue;
        }
        let trace = Scatter::new(xs, ys)
            .name(&algorithm.label())
            .mode(Mode::LinesMarkers)
            .line(Line::new().color(algorithm.color()).width(LINE_WIDTH))
            .marker(
                Marker::new()
                    .color(algorithm.color())
                    .symbol(symbol.clone())
                    .size(MARKER_SIZE),
            );
        plot.add_trace(trace);
    }
    plot.set_layout(layout);
    plot
}

/// Throughput over time, one plot per profile.
pub fn plot_throughput(
    rows: &[CombinedRow],
    graphs_dir: &Path,
) -> Result<Vec<PathBuf>, HarnessError> {
    let mut written = Vec::new();
    for profile in profiles(rows) {
        let plot = plot_over_time(
            rows,
            profile,
            |r| Some(r.throughput),
            MarkerSymbol::Circle,
            layout(
                &format!("Throughput Over Time - Profile: {profile}"),
                "Time (s)",
                "Throughput (Mbps)",
            ),
        );
        written.push(write_plot(
            &plot,
            graphs_dir.then(format!("throughput_profile_{profile}.html")),
        )?);
        log::info!("Generated throughput plot for Profile {profile}");
    }
    Ok(written)
}

/// Loss rate over time, one plot per profile. Nothing is plotted if no run reports losses.
pub fn plot_loss_rate(
    rows: &[CombinedRow],
    graphs_dir: &Path,
) -> Result<Vec<PathBuf>, HarnessError> {
    if !has_loss_rate(rows) {
        log::warn!("No loss rate data available");
        return Ok(Vec::new());
    }

    let mut written = Vec::new();
    for profile in profiles(rows) {
        let plot = plot_over_time(
            rows,
            profile,
            |r| r.loss_rate,
            MarkerSymbol::X,
            layout(
                &format!("Loss Rate Over Time - Profile: {profile}"),
                "Time (s)",
                "Loss Rate",
            ),
        );
        written.push(write_plot(
            &plot,
            graphs_dir.then(format!("loss_profile_{profile}.html")),
        )?);
        log::info!("Generated loss rate plot for Profile {profile}");
    }
    Ok(written)
}

/// Grouped bar chart of the average and the 95th percentile RTT per algorithm and profile.
pub fn plot_rtt_summary(
    summary: &[RttSummary],
    graphs_dir: &Path,
) -> Result<PathBuf, HarnessError> {
    let labels = summary
        .iter()
        .map(|s| format!("{} ({})", s.algorithm.label(), s.profile))
        .collect_vec();

    let mut plot = Plot::new();
    plot.add_trace(
        Bar::new(labels.clone(), summary.iter().map(|s| s.avg_rtt).collect_vec()).name("Avg RTT"),
    );
    plot.add_trace(
        Bar::new(labels, summary.iter().map(|s| s.p95_rtt).collect_vec()).name("95th RTT"),
    );
    plot.set_layout(
        Layout::new()
            .title(Title::with_text(
                "Avg vs 95th-Percentile RTT by Algorithm and Profile",
            ))
            .bar_mode(BarMode::Group)
            .x_axis(Axis::new().tick_angle(45.0))
            .y_axis(Axis::new().title(Title::with_text("RTT (ms)"))),
    );

    let path = write_plot(&plot, graphs_dir.then("rtt_summary_plot.html"))?;
    log::info!("Saved RTT summary bar chart to {path:?}");
    Ok(path)
}

/// One point per algorithm and profile at its average RTT and average throughput.
pub fn plot_rtt_vs_throughput(
    rows: &[CombinedRow],
    graphs_dir: &Path,
) -> Result<PathBuf, HarnessError> {
    let mut plot = Plot::new();
    for profile in profiles(rows) {
        for algorithm in schemes(rows) {
            let run = run_rows(rows, algorithm, profile).collect_vec();
            let rtts = run.iter().map(|r| r.rtt).collect_vec();
            let throughputs = run.iter().map(|r| r.throughput).collect_vec();
            let (Some(avg_rtt), Some(avg_throughput)) =
                (stats::mean(&rtts), stats::mean(&throughputs))
            else {
                continue;
            };
            let trace = Scatter::new(vec![avg_rtt], vec![avg_throughput])
                .name(&format!("{}-{profile}", algorithm.label()))
                .mode(Mode::Markers)
                .marker(
                    Marker::new()
                        .color(algorithm.color())
                        .symbol(MarkerSymbol::Circle)
                        .size(MARKER_SIZE),
                );
            plot.add_trace(trace);
        }
    }
    plot.set_layout(layout(
        "Avg Throughput vs Avg RTT",
        "RTT (ms)",
        "Throughput (Mbps)",
    ));

    let path = write_plot(&plot, graphs_dir.then("rtt_vs_throughput.html"))?;
    log::info!("Generated RTT vs Throughput plot");
    Ok(path)
}

/// Render all plots into `graphs_dir` and return the written files.
pub fn generate_plots(
    rows: &[CombinedRow],
    summary: &[RttSummary],
    graphs_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, HarnessError> {
    let graphs_dir = graphs_dir.as_ref();
    if rows.is_empty() {
        log::error!("No data available for plotting");
        return Ok(Vec::new());
    }
    fs::create_dir_all(graphs_dir)?;

    let mut written = plot_throughput(rows, graphs_dir)?;
    written.extend(plot_loss_rate(rows, graphs_dir)?);
    written.push(plot_rtt_summary(summary, graphs_dir)?);
    written.push(plot_rtt_vs_throughput(rows, graphs_dir)?);
    Ok(written)
}
