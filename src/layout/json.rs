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

use jiff::tz::TimeZone;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;

use crate::Error;
use crate::ErrorKind;
use crate::kv::Value;
use crate::layout::Layout;
use crate::layout::caller;
use crate::record::Record;

/// A layout that formats log record as JSON lines.
///
/// Output format:
///
/// ```json
/// {"timestamp":"2024-08-10T17:12:52.312000+00:00","level":"warn","caller":"db/pool.rs:88","message":"pool exhausted","fields":{"waiters":3}}
/// ```
#[derive(Default, Debug, Clone)]
pub struct JsonLayout {
    tz: Option<TimeZone>,
}

impl JsonLayout {
    /// Render timestamps in the given time zone.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct RecordLine<'a> {
    timestamp: String,
    level: &'a str,
    caller: String,
    message: &'a str,
    #[serde(skip_serializing_if = "Map::is_empty")]
    fields: Map<String, serde_json::Value>,
}

fn json_value(value: &Value) -> serde_json::Value {
    if let Some(b) = value.to_bool() {
        return serde_json::Value::Bool(b);
    }
    if let Some(n) = value.to_i64() {
        return serde_json::Value::Number(n.into());
    }
    if let Some(n) = value.to_u64() {
        return serde_json::Value::Number(n.into());
    }
    if let Some(n) = value.to_f64().and_then(Number::from_f64) {
        return serde_json::Value::Number(n);
    }
    match value.to_borrowed_str() {
        Some(s) => serde_json::Value::String(s.to_string()),
        None => serde_json::Value::String(value.to_string()),
    }
}

impl Layout for JsonLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let time = match self.tz.clone() {
            Some(tz) => record.time().with_time_zone(tz),
            None => record.time().clone(),
        };

        let fields = record
            .fields()
            .iter()
            .map(|field| (field.key().to_string(), json_value(field.value())))
            .collect();

        let line = RecordLine {
            timestamp: time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z").to_string(),
            level: record.level().as_str(),
            caller: caller(record),
            message: record.payload(),
            fields,
        };

        serde_json::to_vec(&line).map_err(|err| {
            Error::new(ErrorKind::Unexpected, "failed to serialize log record").with_source(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::Zoned;

    use super::*;
    use crate::Level;
    use crate::kv::Field;

    #[test]
    fn test_json_layout_format() {
        let time: Zoned = "2024-08-10T17:12:52.312+00:00[UTC]".parse().unwrap();
        let fields = [
            Field::new("waiters", 3),
            Field::new("pool", "primary"),
            Field::new("saturated", true),
        ];
        let record = Record::builder()
            .time(time)
            .level(Level::Warn)
            .file(Some("src/db/pool.rs"))
            .line(Some(88))
            .payload("pool exhausted")
            .fields(&fields)
            .build();

        let bytes = JsonLayout::default().format(&record).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["timestamp"], "2024-08-10T17:12:52.312000+00:00");
        assert_eq!(value["level"], "warn");
        assert_eq!(value["caller"], "db/pool.rs:88");
        assert_eq!(value["message"], "pool exhausted");
        assert_eq!(value["fields"]["waiters"], 3);
        assert_eq!(value["fields"]["pool"], "primary");
        assert_eq!(value["fields"]["saturated"], true);
    }

    #[test]
    fn test_json_layout_omits_empty_fields() {
        let record = Record::builder().payload("hello").build();
        let bytes = JsonLayout::default().format(&record).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("fields").is_none());
    }
}
