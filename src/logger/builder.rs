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

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Append;
use crate::Error;
use crate::ErrorKind;
use crate::Filter;
use crate::Layout;
use crate::Level;
use crate::LogConfig;
use crate::Logger;
use crate::Trap;
use crate::append::Stdout;
use crate::append::file::RetentionCleaner;
use crate::append::file::clock::Clock;
use crate::append::file::rotation::RotationCoordinator;
use crate::append::file::router::LevelRouter;
use crate::filter::LevelFilter;
use crate::layout::TextLayout;
use crate::logger::dispatch::Dispatch;
use crate::trap::DefaultTrap;

/// A builder for configuring a [`Logger`].
///
/// # Examples
///
/// ```
/// use tierlog::Level;
/// use tierlog::Logger;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = Logger::builder(dir.path())
///     .file_level(Level::Warn)
///     .console_level(Level::Info)
///     .max_age_days(3)
///     .build()
///     .unwrap();
///
/// logger.warn("disk almost full", &[]);
/// logger.close().unwrap();
/// ```
#[must_use = "call `build` to construct the logger"]
#[derive(Debug)]
pub struct LoggerBuilder {
    dir: PathBuf,
    file_level: Level,
    console_level: Level,
    max_file_size: u64,
    max_age_days: i64,

    console_filters: Vec<Box<dyn Filter>>,
    console_appends: Option<Vec<Box<dyn Append>>>,
    file_layout: Option<Box<dyn Layout>>,
    trap: Option<Box<dyn Trap>>,
    clock: Clock,
}

impl LoggerBuilder {
    /// Create a builder writing files under `dir`, with the default settings of [`LogConfig`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let config = LogConfig {
            dir: dir.into(),
            ..LogConfig::default()
        };
        LoggerBuilder::from_config(&config)
    }

    /// Create a builder from loaded settings.
    pub fn from_config(config: &LogConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            file_level: config.file_level,
            console_level: config.console_level,
            max_file_size: config.max_file_size,
            max_age_days: config.max_age_days,
            console_filters: vec![],
            console_appends: None,
            file_layout: None,
            trap: None,
            clock: Clock::DefaultClock,
        }
    }

    /// Lowest level written to files. Each level at or above it gets its own file.
    pub fn file_level(mut self, level: Level) -> Self {
        self.file_level = level;
        self
    }

    /// Lowest level written to the console.
    pub fn console_level(mut self, level: Level) -> Self {
        self.console_level = level;
        self
    }

    /// Maximum size of a single file in bytes. Accepted but not enforced.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Days a log file is kept. Files older than this are removed when the logger closes.
    ///
    /// Zero or a negative count keeps every file.
    pub fn max_age_days(mut self, days: i64) -> Self {
        self.max_age_days = days;
        self
    }

    /// Add a console appender. The first call replaces the default [`Stdout`].
    pub fn console(mut self, append: impl Into<Box<dyn Append>>) -> Self {
        self.console_appends
            .get_or_insert_with(Vec::new)
            .push(append.into());
        self
    }

    /// Disable console output.
    pub fn no_console(mut self) -> Self {
        self.console_appends = Some(vec![]);
        self
    }

    /// Add a filter applied to console output, after the console level.
    pub fn console_filter(mut self, filter: impl Into<Box<dyn Filter>>) -> Self {
        self.console_filters.push(filter.into());
        self
    }

    /// The layout of file lines. Defaults to [`TextLayout`] without colors.
    pub fn file_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.file_layout = Some(layout.into());
        self
    }

    /// Where errors that have no caller to return to are reported. Defaults to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = Some(trap.into());
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build the [`Logger`], creating the log directory if needed.
    ///
    /// # Errors
    ///
    /// Return an error of [`ErrorKind::Io`] if the log directory cannot be created.
    pub fn build(self) -> Result<Logger, Error> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            Error::new(ErrorKind::Io, "failed to create log directory")
                .with_context("path", self.dir.display())
                .with_source(err)
        })?;

        let trap: Arc<dyn Trap> = match self.trap {
            Some(trap) => Arc::from(trap),
            None => Arc::new(DefaultTrap::default()),
        };

        let mut filters: Vec<Box<dyn Filter>> =
            vec![Box::new(LevelFilter::MoreSevereEqual(self.console_level))];
        filters.extend(self.console_filters);
        let appends = self
            .console_appends
            .unwrap_or_else(|| vec![Box::new(Stdout::default())]);
        let console = Dispatch::new(filters, appends);

        let layout = self
            .file_layout
            .unwrap_or_else(|| Box::new(TextLayout::default().no_color()));
        let router = LevelRouter::new(self.dir.clone(), self.file_level, layout, trap.clone());
        let cleaner = RetentionCleaner::new(self.dir, self.max_age_days);

        Ok(Logger::from_parts(
            console,
            router,
            RotationCoordinator::new(),
            cleaner,
            self.clock,
            trap,
            self.max_file_size,
        ))
    }
}
