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

use crate::Append;
use crate::Error;
use crate::Filter;
use crate::Level;
use crate::filter::FilterResult;
use crate::record::Record;

/// A grouped set of appenders and filters.
///
/// `filters` decide whether a record is passed on, `appends` write it out.
#[derive(Debug)]
pub(super) struct Dispatch {
    filters: Vec<Box<dyn Filter>>,
    appends: Vec<Box<dyn Append>>,
}

impl Dispatch {
    pub(super) fn new(filters: Vec<Box<dyn Filter>>, appends: Vec<Box<dyn Append>>) -> Self {
        Self { filters, appends }
    }

    pub(super) fn enabled(&self, level: Level) -> bool {
        if self.appends.is_empty() {
            return false;
        }

        let record = Record::builder().level(level).build();
        self.accepts(&record)
    }

    fn accepts(&self, record: &Record) -> bool {
        for filter in &self.filters {
            match filter.matches(record) {
                FilterResult::Reject => return false,
                FilterResult::Accept => return true,
                FilterResult::Neutral => {}
            }
        }

        true
    }

    pub(super) fn log(&self, record: &Record) -> Result<(), Error> {
        if !self.accepts(record) {
            return Ok(());
        }

        let mut result = Ok(());
        for append in &self.appends {
            if let Err(err) = append.append(record) {
                result = Err(err);
            }
        }
        result
    }

    pub(super) fn flush(&self) -> Result<(), Error> {
        let mut result = Ok(());
        for append in &self.appends {
            if let Err(err) = append.flush() {
                result = Err(err);
            }
        }
        result
    }
}
