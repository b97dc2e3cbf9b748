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
//! Parsers for the logs of the external tools: Pantheon's per-scheme metrics CSV and MahiMahi's
//! `mm-link` packet log.
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use ccbench_utils::stats;

use crate::{error::HarnessError, records::MetricSample};

const REQUIRED_COLUMNS: [&str; 2] = ["throughput", "rtt"];

/// Read all samples of a metrics CSV. Columns other than `throughput`, `rtt` and `loss_rate` are
/// ignored.
pub fn read_metrics(path: impl AsRef<Path>) -> Result<Vec<MetricSample>, HarnessError> {
    let path = path.as_ref();
    log::debug!("Loading: {path:?}");
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = csv.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(HarnessError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    csv.deserialize()
        .enumerate()
        .map(|(row, record)| {
            record.map_err(|e| HarnessError::InvalidRow {
                path: path.to_path_buf(),
                row,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Write samples in the same format Pantheon uses for its metrics.
pub fn write_metrics(samples: &[MetricSample], path: impl AsRef<Path>) -> Result<(), HarnessError> {
    let mut csv = csv::Writer::from_path(path)?;
    for sample in samples {
        csv.serialize(sample)?;
    }
    csv.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum LinkEventKind {
    /// A packet entered the link queue.
    Arrival,
    /// The link could have delivered this many bytes.
    Opportunity,
    /// A packet left the link queue.
    Departure,
    /// Packets were dropped from the link queue.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkEvent {
    /// Time in ms
    pub time: u64,
    pub kind: LinkEventKind,
    pub bytes: u64,
    /// Time spent in the queue in ms, only for departures
    pub delay: Option<u64>,
}

lazy_static! {
    static ref LINK_LOG_RE: Vec<(LinkEventKind, Regex)> = vec![
        (
            LinkEventKind::Arrival,
            Regex::new(r"^(\d+) \+ (\d+)$").unwrap()
        ),
        (
            LinkEventKind::Opportunity,
            Regex::new(r"^(\d+) # (\d+)$").unwrap()
        ),
        (
            LinkEventKind::Departure,
            Regex::new(r"^(\d+) - (\d+) (\d+)$").unwrap()
        ),
        // <time> d <num packets> <bytes>
        (
            LinkEventKind::Drop,
            Regex::new(r"^(\d+) d \d+ (\d+)$").unwrap()
        ),
    ];
}

/// Parser for the log written by `mm-link --uplink-log` / `--downlink-log`.
pub struct LinkLogParser;

impl LinkLogParser {
    /// Parse a single line. Header lines (starting with `#`) and unknown lines yield `None`.
    pub fn parse_line(line: &str) -> Option<LinkEvent> {
        let line = line.trim();
        if line.starts_with('#') {
            return None;
        }
        LINK_LOG_RE.iter().find_map(|(kind, re)| {
            let groups = re.captures(line)?;
            let field = |i: usize| groups.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
            Some(LinkEvent {
                time: field(1)?,
                kind: *kind,
                bytes: field(2)?,
                delay: if *kind == LinkEventKind::Departure {
                    Some(field(3)?)
                } else {
                    None
                },
            })
        })
    }

    pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<LinkEvent>, HarnessError> {
        let path = path.as_ref();
        log::debug!("Parsing link log {path:?}");
        let mut events = Vec::new();
        for line in BufReader::new(File::open(path)?).lines() {
            if let Some(event) = Self::parse_line(&line?) {
                events.push(event);
            }
        }
        log::trace!("{} events in {path:?}", events.len());
        Ok(events)
    }
}

#[derive(Debug, Default)]
struct Bin {
    arrived: u64,
    departed: u64,
    dropped: u64,
    delays: Vec<f64>,
}

/// Convert link events into one sample per `bin_ms` interval, starting at the first event.
///
/// The RTT of a bin is `base_rtt` plus the mean queueing delay of all departures in that bin. The
/// loss rate is the share of arrived bytes that were dropped.
pub fn link_log_to_samples(events: &[LinkEvent], bin_ms: u64, base_rtt: f64) -> Vec<MetricSample> {
    let Some((start, end)) = events.iter().map(|e| e.time).minmax().into_option() else {
        return Vec::new();
    };
    let bin_ms = bin_ms.max(1);

    let mut bins: Vec<Bin> = (0..=(end - start) / bin_ms).map(|_| Bin::default()).collect();
    for event in events {
        let bin = &mut bins[((event.time - start) / bin_ms) as usize];
        match event.kind {
            LinkEventKind::Arrival => bin.arrived += event.bytes,
            LinkEventKind::Departure => {
                bin.departed += event.bytes;
                bin.delays.extend(event.delay.map(|d| d as f64));
            }
            LinkEventKind::Drop => bin.dropped += event.bytes,
            LinkEventKind::Opportunity => {}
        }
    }

    let bin_secs = bin_ms as f64 / 1000.0;
    bins.into_iter()
        .map(|bin| MetricSample {
            throughput: bin.departed as f64 * 8.0 / bin_secs / 1e6,
            rtt: base_rtt + stats::mean(&bin.delays).unwrap_or(0.0),
            loss_rate: Some(if bin.arrived == 0 {
                0.0
            } else {
                bin.dropped as f64 / bin.arrived as f64
            }),
        })
        .collect()
}
