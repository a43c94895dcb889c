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

//! Color utilities.

use colored::Color;
use colored::ColoredString;
use colored::Colorize;

use crate::Level;

/// Colors for different log levels.
#[derive(Debug, Clone)]
pub struct LevelColor {
    /// Color for debug level logs.
    pub debug: Color,
    /// Color for info level logs.
    pub info: Color,
    /// Color for warning level logs.
    pub warn: Color,
    /// Color for error level logs.
    pub error: Color,
    /// Color for dpanic, fatal and panic level logs.
    pub critical: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            debug: Color::Blue,
            info: Color::Green,
            warn: Color::Yellow,
            error: Color::Red,
            critical: Color::BrightRed,
        }
    }
}

impl LevelColor {
    /// Colorize an already rendered level label.
    pub fn colorize(&self, no_color: bool, level: Level, label: String) -> ColoredString {
        if no_color {
            ColoredString::from(label)
        } else {
            let color = match level {
                Level::Debug => self.debug,
                Level::Info => self.info,
                Level::Warn => self.warn,
                Level::Error => self.error,
                Level::DPanic | Level::Fatal | Level::Panic => self.critical,
            };
            label.as_str().color(color)
        }
    }
}
