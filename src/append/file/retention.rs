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
use std::path::Path;
use std::path::PathBuf;

use jiff::Span;
use jiff::Timestamp;
use jiff::Zoned;

/// Deletes log files that have outlived the retention window.
///
/// A sweep lists the directory non-recursively and removes every regular `.log` file whose
/// modification time is at or before `now - max_age_days`. Failures are skipped one by one.
#[derive(Debug, Clone)]
pub struct RetentionCleaner {
    dir: PathBuf,
    max_age_days: i64,
}

impl RetentionCleaner {
    /// A cleaner for `dir` that keeps files for `max_age_days` days.
    ///
    /// Zero or a negative count disables the cleaner.
    pub fn new(dir: impl Into<PathBuf>, max_age_days: i64) -> Self {
        Self {
            dir: dir.into(),
            max_age_days,
        }
    }

    /// The directory being swept.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a sweep removes anything at all.
    pub fn is_enabled(&self) -> bool {
        self.max_age_days > 0
    }

    /// The moment at or before which a file is expired.
    pub fn cutoff(&self, now: &Zoned) -> Option<Timestamp> {
        if !self.is_enabled() {
            return None;
        }
        let span = Span::new().try_days(self.max_age_days).ok()?;
        now.checked_sub(span).ok().map(|cutoff| cutoff.timestamp())
    }

    /// Remove expired log files, returning how many were removed.
    pub fn sweep(&self, now: &Zoned) -> usize {
        let Some(cutoff) = self.cutoff(now) else {
            return 0;
        };
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "log") {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Some(modified) = metadata
                .modified()
                .ok()
                .and_then(|time| Timestamp::try_from(time).ok())
            else {
                continue;
            };

            if modified <= cutoff && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::str::FromStr;
    use std::time::SystemTime;

    use jiff::ToSpan;
    use tempfile::TempDir;

    use super::*;

    fn touch(dir: &Path, name: &str, modified: &Zoned) {
        let file = File::create(dir.join(name)).unwrap();
        file.set_modified(SystemTime::from(modified.timestamp()))
            .unwrap();
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn test_sweep_removes_files_at_or_before_cutoff() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let dir = temp_dir.path();
        let day0 = Zoned::from_str("2024-08-01T12:00:00[UTC]").unwrap();

        touch(dir, "info-2024080112.log", &day0);
        touch(dir, "info-2024080312.log", &day0.checked_add(2.days()).unwrap());
        touch(dir, "info-2024080512.log", &day0.checked_add(4.days()).unwrap());

        let now = day0.checked_add(5.days()).unwrap();
        let cleaner = RetentionCleaner::new(dir, 3);
        assert_eq!(
            cleaner.cutoff(&now),
            Some(day0.checked_add(2.days()).unwrap().timestamp())
        );
        assert_eq!(cleaner.sweep(&now), 2);
        assert_eq!(names(dir), vec!["info-2024080512.log"]);
    }

    #[test]
    fn test_sweep_skips_other_entries() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let dir = temp_dir.path();
        let old = Zoned::from_str("2020-01-01T00:00:00[UTC]").unwrap();

        touch(dir, "notes.txt", &old);
        touch(dir, "warn-2020010100.log", &old);
        fs::create_dir(dir.join("archive.log")).unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        touch(&dir.join("nested"), "error-2020010100.log", &old);

        let now = Zoned::from_str("2024-08-10T17:00:00[UTC]").unwrap();
        assert_eq!(RetentionCleaner::new(dir, 1).sweep(&now), 1);
        assert_eq!(names(dir), vec!["archive.log", "nested", "notes.txt"]);
        assert_eq!(names(&dir.join("nested")), vec!["error-2020010100.log"]);
    }

    #[test]
    fn test_disabled_window_keeps_everything() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let dir = temp_dir.path();
        let old = Zoned::from_str("2020-01-01T00:00:00[UTC]").unwrap();
        touch(dir, "debug-2020010100.log", &old);

        let now = Zoned::from_str("2024-08-10T17:00:00[UTC]").unwrap();
        for days in [0, -3] {
            let cleaner = RetentionCleaner::new(dir, days);
            assert!(!cleaner.is_enabled());
            assert_eq!(cleaner.cutoff(&now), None);
            assert_eq!(cleaner.sweep(&now), 0);
        }
        assert_eq!(names(dir), vec!["debug-2020010100.log"]);
    }

    #[test]
    fn test_missing_directory_is_ignored() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let cleaner = RetentionCleaner::new(temp_dir.path().join("gone"), 7);
        assert_eq!(cleaner.sweep(&Zoned::now()), 0);
    }
}
