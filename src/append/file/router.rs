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

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::Error;
use crate::Level;
use crate::append::file::handle::GuardedFile;
use crate::append::file::handle::open_append;
use crate::append::file::rotation::HourBucket;
use crate::filter::Filter;
use crate::filter::FilterResult;
use crate::filter::LevelFilter;
use crate::layout::Layout;
use crate::record::Record;
use crate::trap::Trap;

// one per file level at or above the threshold
#[derive(Debug)]
struct FileSink {
    level: Level,
    filter: LevelFilter,
}

#[derive(Debug, Default)]
struct Registry {
    handles: BTreeMap<Level, GuardedFile>,
    // levels whose file could not be opened, and the bucket that failed
    failed: BTreeMap<Level, HourBucket>,
    // the latest bucket rotated into
    bucket: Option<HourBucket>,
    closed: bool,
}

impl Registry {
    // a caller may carry a bucket read before a concurrent rotation
    fn effective(&self, bucket: HourBucket) -> HourBucket {
        match self.bucket {
            Some(current) => current.max(bucket),
            None => bucket,
        }
    }
}

/// Routes each record to the one file that matches its level.
///
/// Handles are opened on first demand and live in a registry keyed by level. The registry lock
/// guards structural changes, while each [`GuardedFile`] guards its own writes and swaps.
#[derive(Debug)]
pub(crate) struct LevelRouter {
    dir: PathBuf,
    sinks: Vec<FileSink>,
    layout: Box<dyn Layout>,
    registry: RwLock<Registry>,
    trap: Arc<dyn Trap>,
    opens: AtomicU64,
}

impl LevelRouter {
    pub(crate) fn new(
        dir: impl Into<PathBuf>,
        threshold: Level,
        layout: Box<dyn Layout>,
        trap: Arc<dyn Trap>,
    ) -> Self {
        let sinks = Level::FILE_LEVELS
            .into_iter()
            .filter(|level| *level >= threshold.file_level())
            .map(|level| FileSink {
                level,
                filter: LevelFilter::Partition(level),
            })
            .collect();

        Self {
            dir: dir.into(),
            sinks,
            layout,
            registry: RwLock::new(Registry::default()),
            trap,
            opens: AtomicU64::new(0),
        }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether some file takes records of `level`.
    pub(crate) fn enabled(&self, level: Level) -> bool {
        self.sinks.iter().any(|sink| sink.filter.test(level))
    }

    /// The number of files opened so far, lazily or by rotation.
    #[cfg(test)]
    pub(crate) fn opens(&self) -> u64 {
        self.opens.load(Ordering::Acquire)
    }

    /// The levels that currently own an open file.
    #[cfg(test)]
    pub(crate) fn active_levels(&self) -> Vec<Level> {
        self.read().handles.keys().copied().collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn lock(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Write the record to the file of its level, for the given hour.
    ///
    /// A level opened for the first time is named for the given hour or the latest rotated hour,
    /// whichever is newer. A file that cannot be opened is reported to the trap once and skipped until the next hour.
    pub(crate) fn append(&self, record: &Record, bucket: HourBucket) -> Result<(), Error> {
        for sink in self.sinks.iter() {
            if sink.filter.matches(record) == FilterResult::Reject {
                continue;
            }

            let mut bytes = self.layout.format(record)?;
            bytes.push(b'\n');
            self.write(sink.level, bucket, &bytes)?;
        }
        Ok(())
    }

    fn write(&self, level: Level, bucket: HourBucket, bytes: &[u8]) -> Result<(), Error> {
        {
            let registry = self.read();
            if registry.closed {
                return Err(Error::closed());
            }
            if let Some(handle) = registry.handles.get(&level) {
                return handle.write(bytes).map(|_| ());
            }
            if registry.failed.get(&level) == Some(&registry.effective(bucket)) {
                return Ok(());
            }
        }

        let mut registry = self.lock();
        if registry.closed {
            return Err(Error::closed());
        }
        if !registry.handles.contains_key(&level) {
            let bucket = registry.effective(bucket);
            if registry.failed.get(&level) == Some(&bucket) {
                return Ok(());
            }

            let path = self.dir.join(bucket.file_name(level));
            match GuardedFile::open(&path) {
                Ok(handle) => {
                    self.opens.fetch_add(1, Ordering::AcqRel);
                    registry.failed.remove(&level);
                    registry.handles.insert(level, handle);
                }
                Err(err) => {
                    self.trap.trap(&err.with_context("level", level));
                    registry.failed.insert(level, bucket);
                    return Ok(());
                }
            }
        }

        match registry.handles.get(&level) {
            Some(handle) => handle.write(bytes).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Point every open handle at the file named for `bucket`.
    ///
    /// A level whose new file cannot be opened keeps writing to its old file.
    pub(crate) fn rotate(&self, bucket: HourBucket) {
        let mut registry = self.lock();
        if registry.closed {
            return;
        }

        if registry.bucket.is_some_and(|current| current >= bucket) {
            return;
        }

        registry.bucket = Some(bucket);
        registry.failed.clear();
        for (level, handle) in registry.handles.iter() {
            let path = self.dir.join(bucket.file_name(*level));
            match open_append(&path) {
                Ok(file) => {
                    self.opens.fetch_add(1, Ordering::AcqRel);
                    handle.swap(file);
                }
                Err(err) => self.trap.trap(&err.with_context("level", level)),
            }
        }
    }

    pub(crate) fn flush(&self) -> Result<(), Error> {
        let registry = self.read();
        if registry.closed {
            return Err(Error::closed());
        }

        let mut result = Ok(());
        for handle in registry.handles.values() {
            if let Err(err) = handle.flush() {
                result = Err(err);
            }
        }
        result
    }

    /// Close and remove every handle. Returns the last error observed.
    pub(crate) fn close(&self) -> Result<(), Error> {
        let handles = {
            let mut registry = self.lock();
            registry.closed = true;
            registry.failed.clear();
            std::mem::take(&mut registry.handles)
        };

        let mut result = Ok(());
        for handle in handles.into_values() {
            if let Err(err) = handle.close() {
                result = Err(err);
            }
        }
        result
    }
}
