//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LoggingConfig,
};

#[test]
fn test_init_logging_only_once() {
    // One global subscriber per process; the second install must fail.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn);

    assert!(init_logging(config.clone()).is_ok());
    assert!(init_logging(config).is_err());
}

#[test]
fn test_invalid_filter_is_config_error() {
    let config = LoggingConfig::default().with_filter("core_data=loudest");
    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
fn test_identity_fields_are_redacted() {
    assert_eq!(redact_if_sensitive("sessionId", "5f0c"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("device_id", "phone"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("password", "hunter2"), "[REDACTED]");
}

#[test]
fn test_pii_redaction_emails() {
    let redacted = redact_if_sensitive("email", "user@example.com");

    assert!(redacted.starts_with('u'));
    assert!(redacted.contains("[REDACTED]"));
    assert!(!redacted.contains("example.com"));
}

#[test]
fn test_normal_values_pass_through() {
    assert_eq!(redact_if_sensitive("model", "PASSAGE"), "PASSAGE");
    assert_eq!(redact_if_sensitive("id", "2018-1"), "2018-1");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/data/offline/spa_cache.json"), "spa_cache.json");
    assert_eq!(strip_path("D:\\data\\store.db"), "store.db");
    assert_eq!(strip_path("filename.txt"), "filename.txt");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
