//! Logging system for the Galaxy3D shading cache
//!
//! There is no global logger. Each component receives an `Arc<dyn Logger>`
//! at construction, so tests can capture and assert on diagnostics.
//!
//! This module provides:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output (DefaultLogger)
//! - In-memory capture for tests (MemoryLogger) and a discarding NullLogger
//! - File and line information for detailed ERROR logs

use colored::*;
use std::sync::Mutex;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_shading_cache::galaxy3d::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source component (e.g., "galaxy3d::InvalidationManager")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

impl LogEntry {
    /// Create an entry stamped with the current time
    pub fn new(severity: LogSeverity, source: &str, message: String) -> Self {
        Self {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        }
    }

    /// Create an entry carrying file:line information
    pub fn detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) -> Self {
        Self {
            file: Some(file),
            line: Some(line),
            ..Self::new(severity, source, message)
        }
    }
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Very verbose debug information (per-region decisions)
    Trace,

    /// Development/debugging information (per-frame decisions)
    Debug,

    /// Important informational messages
    Info,

    /// Warning messages (fallback escalations)
    Warn,

    /// Error messages (critical issues with file:line details)
    Error,
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
///
/// Entries below `min_severity` are dropped.
pub struct DefaultLogger {
    min_severity: LogSeverity,
}

impl DefaultLogger {
    /// Logger that prints every severity
    pub fn new() -> Self {
        Self { min_severity: LogSeverity::Trace }
    }

    /// Logger that prints `min_severity` and above
    pub fn with_min_severity(min_severity: LogSeverity) -> Self {
        Self { min_severity }
    }

    fn format(entry: &LogEntry) -> String {
        // Format timestamp as YYYY-MM-DD HH:MM:SS.mmm
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            )
        } else {
            format!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message)
        }
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity < self.min_severity {
            return;
        }
        println!("{}", Self::format(entry));
    }
}

/// Logger that keeps every entry in memory
///
/// Used by tests to assert on emitted diagnostics.
#[derive(Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all captured entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Captured entries at exactly `severity`
    pub fn entries_with_severity(&self, severity: LogSeverity) -> Vec<LogEntry> {
        self.entries().into_iter().filter(|e| e.severity == severity).collect()
    }

    /// Whether any captured message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        match self.entries.lock() {
            Ok(mut entries) => entries.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, entry: &LogEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry.clone()),
            Err(poisoned) => poisoned.into_inner().push(entry.clone()),
        }
    }
}

/// Logger that discards everything
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _entry: &LogEntry) {}
}

// ===== LOGGING MACROS =====

/// Log a TRACE message (very verbose, typically disabled)
///
/// # Example
///
/// ```ignore
/// cache_trace!(self.logger, "galaxy3d::InvalidationManager", "Skipping region {:?}", rect);
/// ```
#[macro_export]
macro_rules! cache_trace {
    ($logger:expr, $source:expr, $($arg:tt)*) => {{
        $logger.log(&$crate::log::LogEntry::new(
            $crate::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        ))
    }};
}

/// Log a DEBUG message (development information)
#[macro_export]
macro_rules! cache_debug {
    ($logger:expr, $source:expr, $($arg:tt)*) => {{
        $logger.log(&$crate::log::LogEntry::new(
            $crate::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        ))
    }};
}

/// Log an INFO message (important events)
#[macro_export]
macro_rules! cache_info {
    ($logger:expr, $source:expr, $($arg:tt)*) => {{
        $logger.log(&$crate::log::LogEntry::new(
            $crate::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        ))
    }};
}

/// Log a WARN message (potential issues)
#[macro_export]
macro_rules! cache_warn {
    ($logger:expr, $source:expr, $($arg:tt)*) => {{
        $logger.log(&$crate::log::LogEntry::new(
            $crate::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        ))
    }};
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! cache_error {
    ($logger:expr, $source:expr, $($arg:tt)*) => {{
        $logger.log(&$crate::log::LogEntry::detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        ))
    }};
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
