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

//! Hourly rotated files, one per level.
//!
//! Records are written to `<level>-<yyyyMMddHH>.log` under the log directory, where the level is
//! the record's own level and the hour is taken from the record's time. See
//! [`Logger`](crate::Logger) for how the pieces fit together.

pub use self::handle::GuardedFile;
pub use self::retention::RetentionCleaner;
pub use self::rotation::HourBucket;

pub(crate) mod clock;
mod handle;
mod retention;
pub(crate) mod rotation;
pub(crate) mod router;
