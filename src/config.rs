// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logger configuration.

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Level;

/// Settings read from a configuration file.
///
/// Every field falls back to its default when missing:
///
/// ```
/// use tierlog::Level;
/// use tierlog::LogConfig;
///
/// let config: LogConfig = toml::from_str(r#"logfile_level = "warn""#).unwrap();
/// assert_eq!(config.file_level, Level::Warn);
/// assert_eq!(config.console_level, Level::Debug);
/// assert_eq!(config.max_age_days, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Lowest level written to files.
    #[serde(rename = "logfile_level")]
    pub file_level: Level,
    /// Lowest level written to the console.
    pub console_level: Level,
    /// The directory holding the log files. Created if absent.
    #[serde(rename = "logfile_dir")]
    pub dir: PathBuf,
    /// Maximum size of a single file in bytes.
    ///
    /// Files are rotated by hour only, so this is accepted but not enforced.
    #[serde(rename = "logfile_max_size")]
    pub max_file_size: u64,
    /// Days a log file is kept after its last write. Zero or negative keeps files forever.
    #[serde(rename = "logfile_max_age")]
    pub max_age_days: i64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_level: Level::Info,
            console_level: Level::Debug,
            dir: PathBuf::from("logs"),
            max_file_size: 100 * 1024 * 1024,
            max_age_days: 7,
        }
    }
}
