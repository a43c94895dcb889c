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

use std::fmt;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use jiff::Zoned;

use crate::Level;

/// Wall-clock time truncated to the hour, encoded as `yyyyMMddHH`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourBucket(i64);

impl HourBucket {
    /// The bucket that `time` falls into, in the time's own time zone.
    pub fn of(time: &Zoned) -> HourBucket {
        let year = i64::from(time.year());
        let month = i64::from(time.month());
        let day = i64::from(time.day());
        let hour = i64::from(time.hour());
        HourBucket(((year * 100 + month) * 100 + day) * 100 + hour)
    }

    /// The name of the file that holds records routed to `level` during this hour.
    pub fn file_name(&self, level: Level) -> String {
        format!("{}-{self}.log", level.file_level())
    }

    fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HourBucket({self})")
    }
}

impl fmt::Display for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

// no bucket observed yet
const UNSET: i64 = i64::MIN;

/// Decides which caller rotates the log files when the hour bucket moves forward.
///
/// Exactly one caller wins the transition and runs the rotation; every other caller that
/// observes the transition in progress blocks until the winner finishes.
#[derive(Debug)]
pub(crate) struct RotationCoordinator {
    current: AtomicI64,
    rotating: AtomicBool,
    rotations: AtomicU64,
    steady: Mutex<()>,
    rotated: Condvar,
}

impl Default for RotationCoordinator {
    fn default() -> Self {
        RotationCoordinator::new()
    }
}

impl RotationCoordinator {
    pub(crate) fn new() -> Self {
        Self {
            current: AtomicI64::new(UNSET),
            rotating: AtomicBool::new(false),
            rotations: AtomicU64::new(0),
            steady: Mutex::new(()),
            rotated: Condvar::new(),
        }
    }

    /// A coordinator whose current bucket is already `bucket`.
    #[cfg(test)]
    pub(crate) fn starting_at(bucket: HourBucket) -> Self {
        let coordinator = RotationCoordinator::new();
        coordinator.current.store(bucket.as_i64(), Ordering::Release);
        coordinator
    }

    /// The last bucket rotated into, if any.
    pub(crate) fn current(&self) -> Option<HourBucket> {
        match self.current.load(Ordering::Acquire) {
            UNSET => None,
            bucket => Some(HourBucket(bucket)),
        }
    }

    /// The number of completed rotations.
    #[cfg(test)]
    pub(crate) fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Acquire)
    }

    /// Make sure `bucket` is current before the caller writes.
    ///
    /// If `bucket` is newer than the current one, the single winner calls `rotate` and the
    /// function returns `true` for it. Callers that lose the race wait for the winner and
    /// return `false`. Older or equal buckets never rotate.
    pub(crate) fn ensure_current(&self, bucket: HourBucket, rotate: impl FnOnce(HourBucket)) -> bool {
        loop {
            if !self.rotating.load(Ordering::Acquire) {
                if bucket.as_i64() <= self.current.load(Ordering::Acquire) {
                    return false;
                }

                if self
                    .rotating
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    let _finish = FinishOnDrop(self);
                    // another winner may have rotated between the check and the swap
                    if bucket.as_i64() <= self.current.load(Ordering::Acquire) {
                        return false;
                    }
                    rotate(bucket);
                    self.current.store(bucket.as_i64(), Ordering::Release);
                    self.rotations.fetch_add(1, Ordering::AcqRel);
                    return true;
                }
            }

            self.wait();
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.steady.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait(&self) {
        let mut guard = self.lock();
        while self.rotating.load(Ordering::Acquire) {
            guard = self
                .rotated
                .wait(guard)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    fn finish(&self) {
        let _guard = self.lock();
        self.rotating.store(false, Ordering::Release);
        self.rotated.notify_all();
    }
}

// leaves the rotating state even if the rotation panics
struct FinishOnDrop<'a>(&'a RotationCoordinator);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

#[cfg(test)]
mod tests {
    use std::panic;
    use std::str::FromStr;
    use std::sync::Arc;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    use rand::Rng;

    use super::*;

    fn bucket(s: &str) -> HourBucket {
        HourBucket::of(&Zoned::from_str(s).unwrap())
    }

    #[test]
    fn test_hour_bucket() {
        let b = bucket("2024-08-10T17:12:52.312+08:00[Asia/Shanghai]");
        assert_eq!(b.to_string(), "2024081017");
        assert_eq!(b.file_name(Level::Warn), "warn-2024081017.log");
        assert_eq!(b.file_name(Level::DPanic), "panic-2024081017.log");

        let same = bucket("2024-08-10T17:59:59.999+08:00[Asia/Shanghai]");
        let next = bucket("2024-08-10T18:00:00+08:00[Asia/Shanghai]");
        assert_eq!(b, same);
        assert!(next > b);

        let new_year = bucket("2025-01-01T00:00:00[UTC]");
        assert!(new_year > bucket("2024-12-31T23:59:59[UTC]"));
        assert_eq!(bucket("0999-01-01T03:00:00[UTC]").to_string(), "0999010103");
    }

    #[test]
    fn test_first_bucket_rotates() {
        let coordinator = RotationCoordinator::new();
        assert_eq!(coordinator.current(), None);

        let b = bucket("2024-08-10T17:00:00[UTC]");
        let mut seen = None;
        assert!(coordinator.ensure_current(b, |b| seen = Some(b)));
        assert_eq!(seen, Some(b));
        assert_eq!(coordinator.current(), Some(b));
        assert!(!coordinator.ensure_current(b, |_| unreachable!()));
        assert_eq!(coordinator.rotations(), 1);
    }

    #[test]
    fn test_never_rotates_backwards() {
        let now = bucket("2024-08-10T17:00:00[UTC]");
        let coordinator = RotationCoordinator::starting_at(now);
        let earlier = bucket("2024-08-10T16:59:59[UTC]");
        assert!(!coordinator.ensure_current(earlier, |_| unreachable!()));
        assert_eq!(coordinator.current(), Some(now));
        assert_eq!(coordinator.rotations(), 0);
    }

    #[test]
    fn test_single_winner_per_transition() {
        let threads = 16;
        let coordinator = Arc::new(RotationCoordinator::starting_at(bucket(
            "2024-08-10T17:00:00[UTC]",
        )));
        let runs = Arc::new(AtomicU64::new(0));
        let barrier = Arc::new(Barrier::new(threads));
        let next = bucket("2024-08-10T18:00:00[UTC]");

        let handles = (0..threads)
            .map(|_| {
                let coordinator = coordinator.clone();
                let runs = runs.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let won = coordinator.ensure_current(next, |_| {
                        runs.fetch_add(1, Ordering::SeqCst);
                        let jitter = rand::rng().random_range(1..20);
                        thread::sleep(Duration::from_millis(jitter));
                    });
                    // everyone returns only after the rotation completed
                    assert_eq!(coordinator.current(), Some(next));
                    won
                })
            })
            .collect::<Vec<_>>();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.rotations(), 1);
    }

    #[test]
    fn test_panicking_rotation_does_not_block_others() {
        let coordinator = RotationCoordinator::new();
        let first = bucket("2024-08-10T17:00:00[UTC]");

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            coordinator.ensure_current(first, |_| panic!("failed to rotate"));
        }));
        assert!(result.is_err());
        assert_eq!(coordinator.current(), None);

        assert!(coordinator.ensure_current(first, |_| {}));
        assert_eq!(coordinator.current(), Some(first));
    }
}
