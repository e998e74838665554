//! Logger module
//!
//! Provides logging utilities for the service including:
//! - Leveled, timestamped server messages
//! - Access logging with multiple formats
//! - File-based logging support
//!
//! A [`Logger`] is built once at startup and handed to whoever needs it;
//! there is no process-wide logger.

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogWriter;

use chrono::Local;
use std::fmt;
use std::str::FromStr;

use crate::config::LoggingConfig;

/// Fire-and-forget status line sink used by the parse handlers
pub trait StatusLogger: Send + Sync {
    fn status(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" | "status" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(format!("Unknown log level: '{other}'")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        };
        f.write_str(tag)
    }
}

pub struct Logger {
    level: LogLevel,
    writer: LogWriter,
    access_log: bool,
    access_log_format: String,
}

impl Logger {
    pub fn new(level: LogLevel, writer: LogWriter) -> Self {
        Self {
            level,
            writer,
            access_log: false,
            access_log_format: "combined".to_string(),
        }
    }

    /// Build from the `[logging]` config section, opening any log files
    pub fn from_config(config: &LoggingConfig) -> Result<Self, String> {
        let level = config.level.parse::<LogLevel>()?;
        let writer = LogWriter::new(
            config.access_log_file.as_deref(),
            config.error_log_file.as_deref(),
        )
        .map_err(|e| format!("Failed to open log file: {e}"))?;

        Ok(Self {
            level,
            writer,
            access_log: config.access_log,
            access_log_format: config.access_log_format.clone(),
        })
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let line = format!("{} [{level}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"));
        match level {
            LogLevel::Error | LogLevel::Warn => self.writer.write_error(&line),
            LogLevel::Info | LogLevel::Debug => self.writer.write_info(&line),
        }
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.access_log
    }

    /// Write a formatted access log entry, if access logging is on
    pub fn access(&self, entry: &AccessLogEntry) {
        if self.access_log {
            self.writer.write_access(&entry.format(&self.access_log_format));
        }
    }
}

impl StatusLogger for Logger {
    fn status(&self, message: &str) {
        self.info(message);
    }
}
