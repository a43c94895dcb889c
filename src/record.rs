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

//! Log record.

use std::borrow::Cow;
use std::panic::Location;

use jiff::Zoned;

use crate::Level;
use crate::kv::Field;

/// The payload of a log message.
#[derive(Clone, Debug)]
pub struct Record<'a> {
    // the observed time
    time: Zoned,

    // the metadata
    level: Level,
    target: &'a str,
    file: Option<&'a str>,
    line: Option<u32>,

    // the payload
    payload: Cow<'a, str>,

    // structural logging
    fields: &'a [Field<'a>],
}

impl<'a> Record<'a> {
    /// Create a new [`RecordBuilder`].
    pub fn builder() -> RecordBuilder<'a> {
        RecordBuilder::default()
    }

    /// The observed time.
    pub fn time(&self) -> &Zoned {
        &self.time
    }

    /// The severity of the record.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The name of the target of the directive.
    pub fn target(&self) -> &'a str {
        self.target
    }

    /// The source file containing the message.
    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    /// The line containing the message.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The message body.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The structured fields attached to the record.
    pub fn fields(&self) -> &'a [Field<'a>] {
        self.fields
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    record: Record<'a>,
}

impl Default for RecordBuilder<'_> {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                time: Zoned::now(),
                level: Level::Info,
                target: "",
                file: None,
                line: None,
                payload: Cow::Borrowed(""),
                fields: &[],
            },
        }
    }
}

impl<'a> RecordBuilder<'a> {
    /// Set [`time`](Record::time).
    pub fn time(mut self, time: Zoned) -> Self {
        self.record.time = time;
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`target`](Record::target).
    pub fn target(mut self, target: &'a str) -> Self {
        self.record.target = target;
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: Option<&'a str>) -> Self {
        self.record.file = file;
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: Option<u32>) -> Self {
        self.record.line = line;
        self
    }

    /// Set [`file`](Record::file) and [`line`](Record::line) from a caller location.
    pub fn location(mut self, location: &'static Location<'static>) -> Self {
        self.record.file = Some(location.file());
        self.record.line = Some(location.line());
        self
    }

    /// Set [`payload`](Record::payload).
    pub fn payload(mut self, payload: impl Into<Cow<'a, str>>) -> Self {
        self.record.payload = payload.into();
        self
    }

    /// Set [`fields`](Record::fields).
    pub fn fields(mut self, fields: &'a [Field<'a>]) -> Self {
        self.record.fields = fields;
        self
    }

    /// Invoke the builder and return a [`Record`].
    pub fn build(self) -> Record<'a> {
        self.record
    }
}
