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
//! Utility module collection of functions

use std::{
    env,
    path::{Path, PathBuf},
};

use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

const LOG4RS_CONFIG: &str = "log4rs.yml";

fn log_filters() -> String {
    env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}

/// Initialize logging from `log4rs.yml` in the working directory, or from `RUST_LOG` if there is
/// no such file.
pub fn init_logging() {
    if Path::new(LOG4RS_CONFIG).exists() {
        match log4rs::init_file(LOG4RS_CONFIG, Default::default()) {
            Ok(()) => return,
            Err(e) => eprintln!("Cannot load {LOG4RS_CONFIG}: {e}"),
        }
    }
    let _ = pretty_env_logger::formatted_builder()
        .parse_filters(&log_filters())
        .try_init();
}

/// Build the logger described by a log4rs configuration file.
fn log4rs_logger(path: impl AsRef<Path>) -> Option<log4rs::Logger> {
    let path = path.as_ref();
    if !path.exists() {
        return None;
    }
    match log4rs::config::load_config_file(path, Default::default()) {
        Ok(config) => Some(log4rs::Logger::new(config)),
        Err(e) => {
            eprintln!("Cannot load {path:?}: {e}");
            None
        }
    }
}

/// Initialize logging like [`init_logging`], such that log lines are printed above the progress
/// bars in `multi`.
pub fn init_logging_with_progress(multi: &MultiProgress) {
    let result = match log4rs_logger(LOG4RS_CONFIG) {
        Some(logger) => {
            let level = logger.max_log_level();
            LogWrapper::new(multi.clone(), logger)
                .try_init()
                .map(|()| level)
        }
        None => {
            let logger = pretty_env_logger::formatted_builder()
                .parse_filters(&log_filters())
                .build();
            let level = logger.filter();
            LogWrapper::new(multi.clone(), logger)
                .try_init()
                .map(|()| level)
        }
    };
    if let Ok(level) = result {
        log::set_max_level(level);
    }
}

pub trait PathBufExt: Sized {
    fn then(self, p: impl AsRef<Path>) -> PathBuf;
}

impl PathBufExt for PathBuf {
    fn then(mut self, p: impl AsRef<Path>) -> PathBuf {
        self.push(p);
        self
    }
}

impl PathBufExt for &Path {
    fn then(self, p: impl AsRef<Path>) -> PathBuf {
        let mut path = self.to_path_buf();
        path.push(p);
        path
    }
}

/// Name of the last path component as a `String`, empty if there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
