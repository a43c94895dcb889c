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

use crate::Level;
use crate::filter::Filter;
use crate::filter::FilterResult;
use crate::record::Record;

/// A filter that checks the level of a record against a condition.
///
/// Console output uses [`LevelFilter::MoreSevereEqual`]; each level file uses
/// [`LevelFilter::Partition`], so a record lands in exactly one file.
///
/// # Examples
///
/// ```
/// use tierlog::Level;
/// use tierlog::filter::LevelFilter;
///
/// let console = LevelFilter::MoreSevereEqual(Level::Info);
/// assert!(!console.test(Level::Debug));
/// assert!(console.test(Level::Error));
///
/// let panic_file = LevelFilter::Partition(Level::Panic);
/// assert!(panic_file.test(Level::DPanic));
/// assert!(!panic_file.test(Level::Fatal));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum LevelFilter {
    /// Disables all levels.
    Off,
    /// Enables if the record level is equal to the filter level.
    Equal(Level),
    /// Enables if the record level is more severe than or equal to the filter level.
    MoreSevereEqual(Level),
    /// Enables if the record level routes to the file of the filter level.
    ///
    /// This is [`LevelFilter::Equal`], except that the panic partition also takes
    /// [`Level::DPanic`] records.
    Partition(Level),
    /// Enables all levels.
    All,
}

impl LevelFilter {
    /// Checks the given level if satisfies the filter condition.
    pub fn test(&self, level: Level) -> bool {
        match self {
            LevelFilter::Off => false,
            LevelFilter::Equal(l) => level == *l,
            LevelFilter::MoreSevereEqual(l) => level >= *l,
            LevelFilter::Partition(l) => level.file_level() == *l,
            LevelFilter::All => true,
        }
    }
}

impl Filter for LevelFilter {
    fn matches(&self, record: &Record) -> FilterResult {
        if self.test(record.level()) {
            FilterResult::Neutral
        } else {
            FilterResult::Reject
        }
    }
}
