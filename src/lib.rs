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

//! Tierlog is a logger that writes to the console and to one file per level, rotated every hour.
//!
//! # Overview
//!
//! Each record is written to the console when its level passes the console level, and to the
//! file of exactly its own level when that level passes the file level. An error record appears
//! in `error-<yyyyMMddHH>.log` and nowhere else on disk. Records logged at [`Level::DPanic`] after
//! a recovered panic land in the panic file.
//!
//! The first record of a new hour rotates every open file. Rotation happens inline on the
//! calling thread, so an idle process never rotates. Old files are removed by
//! [`Logger::close`] once they outlive the retention window.
//!
//! # Examples
//!
//! ```
//! use tierlog::Level;
//! use tierlog::Logger;
//! use tierlog::kv::Field;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = Logger::builder(dir.path())
//!     .file_level(Level::Warn)
//!     .console_level(Level::Debug)
//!     .max_age_days(1)
//!     .build()
//!     .unwrap();
//!
//! logger.debug("console only", &[]);
//! logger.warn("console and warn file", &[Field::new("retries", 3)]);
//!
//! let escalation = logger.fatal("cannot continue", &[]);
//! logger.close().unwrap();
//! assert_eq!(escalation.level(), Level::Fatal);
//! ```
//!
//! Loading the settings from a configuration file:
//!
//! ```
//! use tierlog::LogConfig;
//! use tierlog::Logger;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut config: LogConfig = toml::from_str(
//!     r#"
//!     logfile_level = "error"
//!     console_level = "info"
//!     logfile_max_age = 3
//!     "#,
//! )
//! .unwrap();
//! config.dir = dir.path().to_path_buf();
//!
//! let logger = Logger::new(&config).unwrap();
//! logger.error("written to error file", &[]);
//! logger.close().unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod bridge;
#[cfg(feature = "colored")]
pub mod color;
pub mod filter;
pub mod kv;
pub mod layout;
pub mod record;
pub mod trap;

mod config;
mod error;
mod level;
mod logger;

pub use self::append::Append;
pub use self::config::LogConfig;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::filter::Filter;
pub use self::layout::Layout;
pub use self::level::Level;
pub use self::logger::Escalation;
pub use self::logger::Logger;
pub use self::logger::LoggerBuilder;
pub use self::logger::default_logger;
pub use self::logger::set_default_logger;
pub use self::record::Record;
pub use self::trap::Trap;
