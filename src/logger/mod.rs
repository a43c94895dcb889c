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

//! The logger facade.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic;
use std::panic::Location;
use std::panic::UnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use jiff::Zoned;

use crate::Error;
use crate::Level;
use crate::LogConfig;
use crate::Trap;
use crate::append::file::HourBucket;
use crate::append::file::RetentionCleaner;
use crate::append::file::clock::Clock;
use crate::append::file::rotation::RotationCoordinator;
use crate::append::file::router::LevelRouter;
use crate::kv::Field;
use crate::record::Record;

mod builder;
mod dispatch;
mod global;

pub use self::builder::LoggerBuilder;
pub use self::global::default_logger;
pub use self::global::set_default_logger;
use self::dispatch::Dispatch;

/// A logger that writes to the console and to one file per level, rotated every hour.
///
/// Each record goes to the console if its level passes the console level, and to the file of
/// exactly its own level if that level passes the file level. Files are named
/// `<level>-<yyyyMMddHH>.log`; [`Level::DPanic`] records land in the panic file.
///
/// The first record of a new hour rotates every open file. Rotation runs inline on the calling
/// thread; concurrent callers wait for it to finish.
///
/// [`Logger::close`] must be called on shutdown: it closes the files and removes those that have
/// outlived the retention window. Dropping a logger does neither.
///
/// # Examples
///
/// ```
/// use tierlog::Level;
/// use tierlog::Logger;
/// use tierlog::kv::Field;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = Logger::builder(dir.path())
///     .file_level(Level::Info)
///     .build()
///     .unwrap();
///
/// logger.info("server started", &[Field::new("port", 8080)]);
/// logger.error("request failed", &[Field::new("status", 503)]);
/// logger.close().unwrap();
/// ```
#[derive(Debug)]
pub struct Logger {
    console: Dispatch,
    router: LevelRouter,
    coordinator: RotationCoordinator,
    cleaner: RetentionCleaner,
    clock: Clock,
    trap: Arc<dyn Trap>,
    max_file_size: u64,
    closed: AtomicBool,
}

impl Logger {
    /// Build a logger from loaded settings.
    pub fn new(config: &LogConfig) -> Result<Logger, Error> {
        LoggerBuilder::from_config(config).build()
    }

    /// Start configuring a logger that writes files under `dir`.
    pub fn builder(dir: impl Into<std::path::PathBuf>) -> LoggerBuilder {
        LoggerBuilder::new(dir)
    }

    fn from_parts(
        console: Dispatch,
        router: LevelRouter,
        coordinator: RotationCoordinator,
        cleaner: RetentionCleaner,
        clock: Clock,
        trap: Arc<dyn Trap>,
        max_file_size: u64,
    ) -> Self {
        Self {
            console,
            router,
            coordinator,
            cleaner,
            clock,
            trap,
            max_file_size,
            closed: AtomicBool::new(false),
        }
    }

    /// The directory holding the log files.
    pub fn dir(&self) -> &Path {
        self.router.dir()
    }

    /// The configured maximum file size in bytes. Not enforced.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Whether [`Logger::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Whether a record of `level` would be written anywhere.
    pub fn enabled(&self, level: Level) -> bool {
        !self.is_closed() && (self.router.enabled(level) || self.console.enabled(level))
    }

    /// Log a message at [`Level::Debug`].
    #[track_caller]
    pub fn debug(&self, message: &str, fields: &[Field<'_>]) {
        self.emit(Level::Debug, message, fields, Location::caller());
    }

    /// Log a message at [`Level::Info`].
    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field<'_>]) {
        self.emit(Level::Info, message, fields, Location::caller());
    }

    /// Log a message at [`Level::Warn`].
    #[track_caller]
    pub fn warn(&self, message: &str, fields: &[Field<'_>]) {
        self.emit(Level::Warn, message, fields, Location::caller());
    }

    /// Log a message at [`Level::Error`].
    #[track_caller]
    pub fn error(&self, message: &str, fields: &[Field<'_>]) {
        self.emit(Level::Error, message, fields, Location::caller());
    }

    /// Log a message at [`Level::DPanic`], the level of a panic that was recovered.
    #[track_caller]
    pub fn dpanic(&self, message: &str, fields: &[Field<'_>]) {
        self.emit(Level::DPanic, message, fields, Location::caller());
    }

    /// Log a message at [`Level::Fatal`].
    ///
    /// The process keeps running. The returned [`Escalation`] lets the caller exit when it is
    /// ready to.
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: &[Field<'_>]) -> Escalation {
        self.emit(Level::Fatal, message, fields, Location::caller());
        Escalation::new(Level::Fatal, message)
    }

    /// Log a message at [`Level::Panic`].
    ///
    /// The current thread does not unwind. The returned [`Escalation`] lets the caller panic when
    /// it is ready to.
    #[track_caller]
    pub fn panic(&self, message: &str, fields: &[Field<'_>]) -> Escalation {
        self.emit(Level::Panic, message, fields, Location::caller());
        Escalation::new(Level::Panic, message)
    }

    /// Log a formatted message at [`Level::Info`].
    ///
    /// ```
    /// # let dir = tempfile::tempdir().unwrap();
    /// # let logger = tierlog::Logger::builder(dir.path()).build().unwrap();
    /// let user = "alice";
    /// logger.printf(format_args!("user {user} signed in"));
    /// # logger.close().unwrap();
    /// ```
    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        let message = match args.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(args.to_string()),
        };
        self.emit(Level::Info, &message, &[], Location::caller());
    }

    /// Log a message at the given level.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
        self.emit(level, message, fields, Location::caller());
    }

    /// Run `f`, logging a panic at [`Level::DPanic`] instead of letting it unwind further.
    ///
    /// Returns `None` if `f` panicked.
    #[track_caller]
    pub fn recover<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce() -> R + UnwindSafe,
    {
        let location = Location::caller();
        match panic::catch_unwind(f) {
            Ok(value) => Some(value),
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                let fields = [Field::new("panic", reason.as_str())];
                self.emit(Level::DPanic, "recovered from panic", &fields, location);
                None
            }
        }
    }

    pub(crate) fn now(&self) -> Zoned {
        self.clock.now()
    }

    pub(crate) fn report(&self, err: &Error) {
        self.trap.trap(err);
    }

    fn emit(
        &self,
        level: Level,
        message: &str,
        fields: &[Field<'_>],
        location: &'static Location<'static>,
    ) {
        let record = Record::builder()
            .time(self.now())
            .level(level)
            .location(location)
            .payload(message)
            .fields(fields)
            .build();

        if let Err(err) = self.try_log(&record) {
            self.report(&err);
        }
    }

    /// Write a record to the console and to the file of its level.
    ///
    /// The file is the one for the hour of the record's time, or for the latest hour seen if the
    /// record is older. A record of a newer hour first rotates every open file.
    ///
    /// # Errors
    ///
    /// Return an error of [`ErrorKind::Closed`](crate::ErrorKind::Closed) after
    /// [`Logger::close`], without touching any file. Otherwise, return the last error raised by
    /// the console or the file.
    pub fn try_log(&self, record: &Record) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::closed());
        }

        let bucket = HourBucket::of(record.time());
        self.coordinator
            .ensure_current(bucket, |bucket| self.router.rotate(bucket));
        let bucket = self.coordinator.current().unwrap_or(bucket);

        let mut result = self.console.log(record);
        if self.router.enabled(record.level()) {
            if let Err(err) = self.router.append(record, bucket) {
                result = Err(err);
            }
        }
        result
    }

    /// Flush the console and sync every open file.
    pub fn flush(&self) -> Result<(), Error> {
        let console = self.console.flush();
        let files = self.router.flush();
        console.and(files)
    }

    /// Close every file and remove files that have outlived the retention window.
    ///
    /// Calling this more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Return the last error raised while closing the files. Failures to remove expired files
    /// are ignored.
    pub fn close(&self) -> Result<(), Error> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if let Err(err) = self.console.flush() {
            self.trap.trap(&err);
        }
        let result = self.router.close();
        self.cleaner.sweep(&self.clock.now());
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// What a fatal or panic record asks of the caller.
///
/// Logging at [`Level::Fatal`] or [`Level::Panic`] never ends the process or unwinds the thread
/// by itself. Ignoring this value keeps the process running.
///
/// ```no_run
/// # let dir = tempfile::tempdir().unwrap();
/// # let logger = tierlog::Logger::builder(dir.path()).build().unwrap();
/// let escalation = logger.fatal("config is unreadable", &[]);
/// logger.close().unwrap();
/// escalation.exit();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalation {
    level: Level,
    message: String,
}

impl Escalation {
    fn new(level: Level, message: &str) -> Self {
        Self {
            level,
            message: message.to_string(),
        }
    }

    /// The level that was logged.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The message that was logged.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Exit the process with status code 1.
    pub fn exit(self) -> ! {
        std::process::exit(1)
    }

    /// Panic with the logged message.
    pub fn panic(self) -> ! {
        panic!("{}", self.message)
    }
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}
