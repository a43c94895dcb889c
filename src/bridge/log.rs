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

//! Bridge for the [`log`] crate.

use std::borrow::Cow;

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::Logger;
use crate::kv::Field;
use crate::logger::default_logger;
use crate::record::Record;

struct LogCrateLogger(());

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let Some(logger) = default_logger() else {
            return false;
        };

        log::Log::enabled(logger, metadata)
    }

    fn log(&self, record: &log::Record) {
        if let Some(logger) = default_logger() {
            log::Log::log(logger, record);
        }
    }

    fn flush(&self) {
        if let Some(logger) = default_logger() {
            log::Log::flush(logger);
        }
    }
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_logger`] to set up a `LogCrateLogger` and all logs from the
/// log crate will be forwarded to the [default logger](crate::set_default_logger).
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// let dir = tempfile::tempdir().unwrap();
/// let logger = tierlog::Logger::builder(dir.path()).build().unwrap();
/// if tierlog::set_default_logger(logger).is_ok() {
///     let _ = tierlog::bridge::try_setup_log_crate();
/// }
///
/// log::info!("forwarded to tierlog");
/// ```
pub fn try_setup_log_crate() -> Result<(), log::SetLoggerError> {
    static LOGGER: LogCrateLogger = LogCrateLogger(());
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// See [`try_setup_log_crate`] for details.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
pub fn setup_log_crate() {
    try_setup_log_crate().expect(
        "tierlog::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        if !Logger::enabled(self, level) {
            return;
        }

        // key-values
        let mut kvs = Vec::new();

        struct KeyValueVisitor<'a, 'b> {
            kvs: &'b mut Vec<(log::kv::Key<'a>, log::kv::Value<'a>)>,
        }

        impl<'a> log::kv::VisitSource<'a> for KeyValueVisitor<'a, '_> {
            fn visit_pair(
                &mut self,
                key: log::kv::Key<'a>,
                value: log::kv::Value<'a>,
            ) -> Result<(), log::kv::Error> {
                self.kvs.push((key, value));
                Ok(())
            }
        }

        let mut visitor = KeyValueVisitor { kvs: &mut kvs };
        if let Err(err) = record.key_values().visit(&mut visitor) {
            let err = Error::new(ErrorKind::Unexpected, "failed to collect key-values")
                .with_source(err);
            self.report(&err);
        }

        let fields = kvs
            .iter()
            .map(|(k, v)| Field::new(k.as_str(), v.clone()))
            .collect::<Vec<_>>();

        let args = record.args();
        let payload = match args.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(args.to_string()),
        };

        let record = Record::builder()
            .time(self.now())
            .level(level)
            .target(record.target())
            .file(record.file())
            .line(record.line())
            .payload(payload)
            .fields(&fields)
            .build();

        if let Err(err) = self.try_log(&record) {
            self.report(&err);
        }
    }

    fn flush(&self) {
        if let Err(err) = Logger::flush(self) {
            self.report(&err);
        }
    }
}
