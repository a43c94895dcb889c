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

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use rand::Rng;
use rand::distr::Alphanumeric;
use tempfile::TempDir;
use tierlog::Append;
use tierlog::Error;
use tierlog::ErrorKind;
use tierlog::Level;
use tierlog::LogConfig;
use tierlog::Logger;
use tierlog::Record;
use tierlog::Trap;
use tierlog::kv::Field;

#[derive(Debug, Clone, Default)]
struct Console(Arc<Mutex<Vec<String>>>);

impl Append for Console {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let mut lines = self.0.lock().unwrap();
        lines.push(format!("{} {}", record.level(), record.payload()));
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct Collect(Arc<Mutex<Vec<ErrorKind>>>);

impl Trap for Collect {
    fn trap(&self, err: &Error) {
        self.0.lock().unwrap().push(err.kind());
    }
}

fn log_files(dir: &Path) -> Vec<String> {
    let mut files = fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let filename = entry.file_name().to_str()?.to_string();
            filename.ends_with(".log").then_some(filename)
        })
        .collect::<Vec<_>>();
    files.sort();
    files
}

#[test]
fn test_warn_threshold_creates_only_warn_file() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let config = LogConfig {
        file_level: Level::Warn,
        console_level: Level::Debug,
        dir: temp_dir.path().to_path_buf(),
        max_age_days: 1,
        ..LogConfig::default()
    };

    let console = Console::default();
    let logger = tierlog::LoggerBuilder::from_config(&config)
        .console(console.clone())
        .build()
        .unwrap();

    logger.debug("connecting", &[]);
    logger.warn("slow handshake", &[Field::new("millis", 1200)]);
    logger.close().unwrap();

    assert_eq!(
        console.0.lock().unwrap().clone(),
        vec!["debug connecting", "warn slow handshake"]
    );

    let files = log_files(temp_dir.path());
    assert_eq!(files.len(), 1, "{files:?}");
    assert!(files[0].starts_with("warn-"), "{files:?}");
    let content = fs::read_to_string(temp_dir.path().join(&files[0])).unwrap();
    assert!(content.contains("slow handshake millis=1200"), "{content}");
    assert!(!content.contains("connecting"), "{content}");
}

#[test]
fn test_every_level_is_written_once() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let logger = Logger::builder(temp_dir.path())
        .file_level(Level::Debug)
        .no_console()
        .build()
        .unwrap();

    logger.debug("a debug record", &[]);
    logger.info("an info record", &[]);
    logger.warn("a warn record", &[]);
    logger.error("an error record", &[]);
    let _ = logger.fatal("a fatal record", &[]);
    let _ = logger.panic("a panic record", &[]);
    logger.close().unwrap();

    let files = log_files(temp_dir.path());
    let all = files
        .iter()
        .map(|f| fs::read_to_string(temp_dir.path().join(f)).unwrap())
        .collect::<Vec<_>>()
        .join("");
    for (level, needle) in [
        ("debug", "a debug record"),
        ("info", "an info record"),
        ("warn", "a warn record"),
        ("error", "an error record"),
        ("fatal", "a fatal record"),
        ("panic", "a panic record"),
    ] {
        assert_eq!(all.matches(needle).count(), 1, "{needle}");

        let prefix = format!("{level}-");
        let content = files
            .iter()
            .filter(|f| f.starts_with(&prefix))
            .map(|f| fs::read_to_string(temp_dir.path().join(f)).unwrap())
            .collect::<String>();
        assert!(content.contains(needle), "{level}: {content}");
    }
}

#[test]
fn test_concurrent_writers_lose_nothing() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let logger = Arc::new(
        Logger::builder(temp_dir.path())
            .file_level(Level::Info)
            .no_console()
            .build()
            .unwrap(),
    );

    let threads = 8;
    let per_thread = 200;
    let handles = (0..threads)
        .map(|_| {
            let logger = logger.clone();
            thread::spawn(move || {
                let mut rng = rand::rng();
                (0..per_thread)
                    .map(|_| {
                        let token = (&mut rng)
                            .sample_iter(&Alphanumeric)
                            .take(24)
                            .map(char::from)
                            .collect::<String>();
                        logger.info(&token, &[]);
                        token
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect::<Vec<_>>();

    let tokens = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect::<Vec<_>>();
    logger.close().unwrap();

    let content = log_files(temp_dir.path())
        .iter()
        .map(|f| fs::read_to_string(temp_dir.path().join(f)).unwrap())
        .collect::<Vec<_>>()
        .join("");
    assert_eq!(content.lines().count(), threads * per_thread);
    for token in tokens {
        assert_eq!(content.matches(&format!(" {token}\n")).count(), 1, "{token}");
    }
}

#[test]
fn test_closed_logger_reports_closed() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let trap = Collect::default();
    let logger = Logger::builder(temp_dir.path())
        .no_console()
        .trap(trap.clone())
        .build()
        .unwrap();

    logger.close().unwrap();
    logger.error("too late", &[]);
    let record = Record::builder().level(Level::Error).payload("too late").build();
    assert_eq!(logger.try_log(&record).unwrap_err().kind(), ErrorKind::Closed);

    assert_eq!(trap.0.lock().unwrap().clone(), vec![ErrorKind::Closed]);
    assert!(log_files(temp_dir.path()).is_empty());
}

#[test]
fn test_unopenable_file_keeps_console_alive() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let dir = temp_dir.path().join("logs");
    let trap = Collect::default();
    let console = Console::default();
    let logger = Logger::builder(&dir)
        .file_level(Level::Info)
        .console_level(Level::Info)
        .console(console.clone())
        .trap(trap.clone())
        .build()
        .unwrap();

    fs::remove_dir_all(&dir).unwrap();
    for _ in 0..3 {
        logger.error("disk gone", &[]);
    }
    logger.close().unwrap();

    assert_eq!(console.0.lock().unwrap().len(), 3);
    assert_eq!(trap.0.lock().unwrap().clone(), vec![ErrorKind::Io]);
}
