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

//! Layouts for formatting log records.

use std::fmt;

use crate::Error;
use crate::record::Record;

#[cfg(feature = "layout-json")]
mod json;
mod text;

#[cfg(feature = "layout-json")]
pub use self::json::JsonLayout;
pub use self::text::TextLayout;

/// A layout for formatting log records.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// Formats a log record into bytes, without the trailing newline.
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error>;
}

impl<T: Layout> From<T> for Box<dyn Layout> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// Render the caller of a record as `dir/file.rs:line`, or its target if the file is unknown.
pub(crate) fn caller(record: &Record) -> String {
    match record.file() {
        Some(file) => {
            let line = record.line().unwrap_or_default();
            format!("{}:{line}", trimmed_path(file))
        }
        None => record.target().to_string(),
    }
}

// keep the file name and its parent directory
fn trimmed_path(path: &str) -> &str {
    let is_sep = |c: char| c == '/' || c == '\\';
    let mut end = path.len();
    for _ in 0..2 {
        match path[..end].rfind(is_sep) {
            Some(pos) => end = pos,
            None => return path,
        }
    }
    &path[end + 1..]
}
