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

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::Error;
use crate::ErrorKind;

/// Open `path` for appending, creating it if absent.
pub(crate) fn open_append(path: &Path) -> Result<File, Error> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|err| {
            Error::new(ErrorKind::Io, "failed to open log file")
                .with_context("path", path.display())
                .with_source(err)
        })
}

/// A file handle whose backing file can be swapped while other threads write to it.
///
/// Writes and flushes share a read lock, so concurrent writers proceed in parallel; [`swap`] and
/// [`close`] take the write lock, so no write overlaps them. A writer observes either the old file
/// or the new one.
///
/// Once closed, every [`write`] and [`flush`] fails with [`ErrorKind::Closed`].
///
/// [`swap`]: GuardedFile::swap
/// [`close`]: GuardedFile::close
/// [`write`]: GuardedFile::write
/// [`flush`]: GuardedFile::flush
#[derive(Debug)]
pub struct GuardedFile {
    file: RwLock<Option<File>>,
    closed: AtomicBool,
}

impl GuardedFile {
    /// Wrap an open file.
    pub fn new(file: File) -> Self {
        Self {
            file: RwLock::new(Some(file)),
            closed: AtomicBool::new(false),
        }
    }

    /// Open `path` in append mode, creating the file if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        open_append(path.as_ref()).map(GuardedFile::new)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<File>> {
        self.file.read().unwrap_or_else(|e| e.into_inner())
    }

    fn lock(&self) -> RwLockWriteGuard<'_, Option<File>> {
        self.file.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether the handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Write the whole buffer to the current file, returning the number of bytes written.
    pub fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        let guard = self.read();
        if self.is_closed() {
            return Err(Error::closed());
        }
        let Some(mut file) = guard.as_ref() else {
            return Err(Error::closed());
        };

        file.write_all(buf).map_err(Error::from_io_error)?;
        Ok(buf.len())
    }

    /// Sync the current file to stable storage.
    pub fn flush(&self) -> Result<(), Error> {
        let guard = self.read();
        if self.is_closed() {
            return Err(Error::closed());
        }
        let Some(file) = guard.as_ref() else {
            return Err(Error::closed());
        };

        file.sync_all().map_err(Error::from_io_error)
    }

    /// Replace the backing file, closing the previous one.
    ///
    /// The handle is open after this call, even if it was closed before.
    pub fn swap(&self, file: File) {
        let mut guard = self.lock();
        let previous = guard.replace(file);
        self.closed.store(false, Ordering::Release);
        drop(previous);
    }

    /// Close the handle. Calling this more than once is a no-op.
    pub fn close(&self) -> Result<(), Error> {
        let mut guard = self.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        match guard.take() {
            Some(file) => file.sync_all().map_err(Error::from_io_error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Arc;
    use std::sync::Barrier;
    use std::thread;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_and_flush() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let path = temp_dir.path().join("info-2024081017.log");

        let handle = GuardedFile::open(&path).unwrap();
        assert_eq!(handle.write(b"hello\n").unwrap(), 6);
        handle.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_open_appends_to_existing_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let path = temp_dir.path().join("warn-2024081017.log");
        fs::write(&path, "before restart\n").unwrap();

        let handle = GuardedFile::open(&path).unwrap();
        handle.write(b"after restart\n").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "before restart\nafter restart\n"
        );
    }

    #[test]
    fn test_closed_handle_rejects_io() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let path = temp_dir.path().join("error-2024081017.log");

        let handle = GuardedFile::open(&path).unwrap();
        handle.write(b"kept\n").unwrap();
        handle.close().unwrap();
        assert!(handle.is_closed());

        let err = handle.write(b"dropped\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Closed);
        let err = handle.flush().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Closed);

        // idempotent
        handle.close().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
    }

    #[test]
    fn test_swap_moves_writes_to_new_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let old_path = temp_dir.path().join("info-2024081017.log");
        let new_path = temp_dir.path().join("info-2024081018.log");

        let handle = GuardedFile::open(&old_path).unwrap();
        handle.write(b"old\n").unwrap();
        handle.swap(open_append(&new_path).unwrap());
        handle.write(b"new\n").unwrap();

        assert_eq!(fs::read_to_string(&old_path).unwrap(), "old\n");
        assert_eq!(fs::read_to_string(&new_path).unwrap(), "new\n");
    }

    #[test]
    fn test_swap_reopens_closed_handle() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let handle = GuardedFile::open(temp_dir.path().join("a.log")).unwrap();
        handle.close().unwrap();

        let path = temp_dir.path().join("b.log");
        handle.swap(open_append(&path).unwrap());
        assert!(!handle.is_closed());
        handle.write(b"reopened\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "reopened\n");
    }

    #[test]
    fn test_concurrent_writes_survive_swap() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let old_path = temp_dir.path().join("info-2024081017.log");
        let new_path = temp_dir.path().join("info-2024081018.log");

        let writers = 8;
        let lines_per_writer = 500;
        let handle = Arc::new(GuardedFile::open(&old_path).unwrap());
        let barrier = Arc::new(Barrier::new(writers + 1));

        let threads = (0..writers)
            .map(|w| {
                let handle = handle.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let mut written = vec![];
                    for i in 0..lines_per_writer {
                        let line = format!("writer-{w}-line-{i}\n");
                        if handle.write(line.as_bytes()).is_ok() {
                            written.push(line.trim_end().to_string());
                        }
                    }
                    written
                })
            })
            .collect::<Vec<_>>();

        barrier.wait();
        handle.swap(open_append(&new_path).unwrap());

        let mut expected = vec![];
        for t in threads {
            expected.extend(t.join().unwrap());
        }
        handle.close().unwrap();

        let mut seen = HashMap::new();
        for path in [&old_path, &new_path] {
            for line in fs::read_to_string(path).unwrap().lines() {
                *seen.entry(line.to_string()).or_insert(0) += 1;
            }
        }

        assert_eq!(expected.len(), writers * lines_per_writer);
        assert_eq!(seen.len(), expected.len());
        for line in expected {
            assert_eq!(seen.get(&line), Some(&1), "{line} must appear exactly once");
        }
    }
}
