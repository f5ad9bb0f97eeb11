use chrono::Local;
use log::{Level, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Appends `timestamp [LEVEL] message` lines to a file. Write failures are
/// dropped so logging can never take the scanner down.
pub struct Logger {
    file: Mutex<File>,
    level: Level,
}

impl Logger {
    pub fn new(log_file: &Path, level: Level) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(log_file)?;
        Ok(Self {
            file: Mutex::new(file),
            level,
        })
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(file, "{} [{}] {}", timestamp, record.level(), record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs the file logger as the global logger.
pub fn init(log_file: &Path, level: Level) -> crate::error::Result<()> {
    let logger = Logger::new(log_file, level)?;
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| crate::error::Error::ConfigError(format!("Logger already installed: {}", e)))?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}
