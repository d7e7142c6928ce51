//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger, MemoryLogger and the macros.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, MemoryLogger, NullLogger};
use std::sync::Arc;

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_new_has_no_file_line() {
    let entry = LogEntry::new(
        LogSeverity::Info,
        "galaxy3d::InvalidationManager",
        "Full invalidation".to_string(),
    );

    assert_eq!(entry.severity, LogSeverity::Info);
    assert_eq!(entry.source, "galaxy3d::InvalidationManager");
    assert_eq!(entry.message, "Full invalidation");
    assert!(entry.file.is_none());
    assert!(entry.line.is_none());
}

#[test]
fn test_log_entry_detailed_has_file_line() {
    let entry = LogEntry::detailed(
        LogSeverity::Error,
        "galaxy3d::CacheLayout",
        "Bad stride".to_string(),
        "cache_layout.rs",
        42,
    );

    assert_eq!(entry.file, Some("cache_layout.rs"));
    assert_eq!(entry.line, Some(42));
    assert_eq!(entry.message, "Bad stride");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_format_plain() {
    let entry = LogEntry::new(LogSeverity::Info, "test::module", "hello".to_string());
    let line = DefaultLogger::format(&entry);
    assert!(line.contains("test::module"));
    assert!(line.contains("hello"));
}

#[test]
fn test_default_logger_format_detailed() {
    let entry = LogEntry::detailed(
        LogSeverity::Error,
        "test::module",
        "boom".to_string(),
        "file.rs",
        7,
    );
    let line = DefaultLogger::format(&entry);
    assert!(line.contains("(file.rs:7)"));
}

#[test]
fn test_default_logger_does_not_panic() {
    let logger = DefaultLogger::with_min_severity(LogSeverity::Warn);
    logger.log(&LogEntry::new(LogSeverity::Debug, "test", "filtered".to_string()));
    logger.log(&LogEntry::new(LogSeverity::Warn, "test", "printed".to_string()));
}

// ============================================================================
// MEMORY / NULL LOGGER TESTS
// ============================================================================

#[test]
fn test_memory_logger_captures_in_order() {
    let logger = MemoryLogger::new();
    logger.log(&LogEntry::new(LogSeverity::Info, "a", "first".to_string()));
    logger.log(&LogEntry::new(LogSeverity::Warn, "b", "second".to_string()));

    let entries = logger.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "first");
    assert_eq!(entries[1].severity, LogSeverity::Warn);
    assert_eq!(logger.entries_with_severity(LogSeverity::Warn).len(), 1);
    assert!(logger.contains("sec"));

    logger.clear();
    assert!(logger.is_empty());
}

#[test]
fn test_null_logger_discards() {
    let logger = NullLogger;
    logger.log(&LogEntry::new(LogSeverity::Error, "x", "ignored".to_string()));
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
fn test_macros_through_shared_handle() {
    let memory = Arc::new(MemoryLogger::new());
    let logger: Arc<dyn Logger> = memory.clone();

    crate::cache_trace!(logger, "test::macros", "trace {}", 1);
    crate::cache_debug!(logger, "test::macros", "debug {}", 2);
    crate::cache_info!(logger, "test::macros", "info {}", 3);
    crate::cache_warn!(logger, "test::macros", "warn {}", 4);
    crate::cache_error!(logger, "test::macros", "error {}", 5);

    let entries = memory.entries();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].severity, LogSeverity::Trace);
    assert_eq!(entries[4].severity, LogSeverity::Error);
    assert_eq!(entries[4].message, "error 5");
    assert!(entries[4].file.is_some());
    assert!(entries[3].file.is_none());
}
