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

use std::fmt::Write;

use jiff::tz::TimeZone;

use crate::Error;
#[cfg(feature = "colored")]
use crate::color::LevelColor;
use crate::kv::FieldsDisplay;
use crate::layout::Layout;
use crate::layout::caller;
use crate::record::Record;

/// A layout that formats log record as bracketed text.
///
/// Output format:
///
/// ```text
/// [2024-08-10 17:12:52.312] [ DEBUG] [src/main.rs:12] connecting addr=127.0.0.1
/// [2024-08-10 17:12:52.313] [  INFO] [src/main.rs:13] connected
/// [2024-08-10 17:12:52.313] [  WARN] [db/pool.rs:88] pool exhausted waiters=3
/// [2024-08-10 17:12:52.314] [ ERROR] [db/pool.rs:97] query failed err=timeout
/// ```
///
/// With the `colored` feature, level labels are colored unless [`TextLayout::no_color`] is set.
/// File appenders always use a layout without colors.
///
/// You can customize the timezone of the timestamp with [`TextLayout::timezone`]. Otherwise, the
/// time zone of the record is used.
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    #[cfg(feature = "colored")]
    colors: LevelColor,
    #[cfg_attr(not(feature = "colored"), allow(dead_code))]
    no_color: bool,
    tz: Option<TimeZone>,
}

impl TextLayout {
    /// Disable colored level labels.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Customize the level colors.
    #[cfg(feature = "colored")]
    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    /// Render timestamps in the given time zone.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

impl Layout for TextLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let time = match self.tz.clone() {
            Some(tz) => record.time().with_time_zone(tz),
            None => record.time().clone(),
        };
        let time = time.strftime("%Y-%m-%d %H:%M:%S.%3f");

        let level = record.level();
        let label = format!("[{:>6}]", level.label());
        #[cfg(feature = "colored")]
        let label = self.colors.colorize(self.no_color, level, label);

        let caller = caller(record);
        let message = record.payload();
        let fields = FieldsDisplay::new(record.fields());

        let mut text = String::new();
        write!(&mut text, "[{time}] {label} [{caller}] {message}{fields}")
            .map_err(Error::from_fmt_error)?;
        Ok(text.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Zoned;

    use super::*;
    use crate::Level;
    use crate::kv::Field;

    #[test]
    fn test_text_layout_format() {
        let time: Zoned = "2024-08-10T17:12:52.312+00:00[UTC]".parse().unwrap();
        let fields = [Field::new("waiters", 3)];
        let record = Record::builder()
            .time(time)
            .level(Level::Warn)
            .file(Some("src/db/pool.rs"))
            .line(Some(88))
            .payload("pool exhausted")
            .fields(&fields)
            .build();

        let layout = TextLayout::default().no_color();
        let text = String::from_utf8(layout.format(&record).unwrap()).unwrap();
        assert_eq!(
            text,
            "[2024-08-10 17:12:52.312] [  WARN] [db/pool.rs:88] pool exhausted waiters=3"
        );
    }

    #[test]
    fn test_text_layout_timezone() {
        let time: Zoned = "2024-08-10T17:00:00+00:00[UTC]".parse().unwrap();
        let record = Record::builder()
            .time(time)
            .level(Level::DPanic)
            .target("worker")
            .payload("recovered")
            .build();

        let tz = TimeZone::fixed(jiff::tz::offset(8));
        let layout = TextLayout::default().no_color().timezone(tz);
        let text = String::from_utf8(layout.format(&record).unwrap()).unwrap();
        assert_eq!(text, "[2024-08-11 01:00:00.000] [DPANIC] [worker] recovered");
    }
}
