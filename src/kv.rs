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

//! Structured key-value fields attached to a log record.

use std::fmt;

/// Represents a value in a key-value pair.
pub type Value<'a> = log::kv::Value<'a>;

/// A structured key-value attachment of a log record.
///
/// # Examples
///
/// ```
/// use tierlog::kv::Field;
///
/// let port = 8080;
/// let fields = [Field::new("port", port), Field::display("addr", &"127.0.0.1")];
/// assert_eq!(fields[0].key(), "port");
/// ```
pub struct Field<'a> {
    key: &'a str,
    value: Value<'a>,
}

impl<'a> Field<'a> {
    /// Create a field from any value convertible into a [`Value`].
    pub fn new(key: &'a str, value: impl Into<Value<'a>>) -> Self {
        Field {
            key,
            value: value.into(),
        }
    }

    /// Create a field captured by its [`fmt::Display`] implementation.
    pub fn display<T: fmt::Display>(key: &'a str, value: &'a T) -> Self {
        Field {
            key,
            value: Value::from_display(value),
        }
    }

    /// Create a field captured by its [`fmt::Debug`] implementation.
    pub fn debug<T: fmt::Debug>(key: &'a str, value: &'a T) -> Self {
        Field {
            key,
            value: Value::from_debug(value),
        }
    }

    /// Create a field from an error.
    pub fn error(key: &'a str, err: &'a (dyn std::error::Error + 'static)) -> Self {
        Field {
            key,
            value: Value::from_dyn_error(err),
        }
    }

    /// The key of the field.
    pub fn key(&self) -> &str {
        self.key
    }

    /// The value of the field.
    pub fn value(&self) -> &Value<'a> {
        &self.value
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// A helper struct to format a record's fields as ` key=value` pairs.
pub struct FieldsDisplay<'a, 'kvs> {
    fields: &'a [Field<'kvs>],
}

impl<'a, 'kvs> FieldsDisplay<'a, 'kvs> {
    pub fn new(fields: &'a [Field<'kvs>]) -> Self {
        Self { fields }
    }
}

impl fmt::Display for FieldsDisplay<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in self.fields {
            write!(f, " {}={}", field.key, field.value)?;
        }
        Ok(())
    }
}
