// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Covers defaults, overrides, storage URL parsing, validation, and secret-free summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;

use recipe_planner::config::environment::{
    DatabaseUrl, Environment, LogLevel, ServerConfig, DEFAULT_GEMINI_MODEL,
    DEFAULT_INFERENCE_TIMEOUT_SECS, DEFAULT_PLANNING_MODEL,
};
use recipe_planner::constants::ports;
use serial_test::serial;

const MANAGED_VARS: [&str; 12] = [
    "HOST",
    "HTTP_PORT",
    "RUST_LOG",
    "ENVIRONMENT",
    "DATABASE_URL",
    "CORS_ALLOWED_ORIGINS",
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "PLANNING_MODEL",
    "INFERENCE_TIMEOUT_SECS",
    "URL_FETCH_TIMEOUT_SECS",
    "SERVICE_NAME",
];

fn clear_env() {
    for key in MANAGED_VARS {
        env::remove_var(key);
    }
}

#[test]
fn test_log_level_parsing() {
    assert_eq!(LogLevel::from_str_or_default("error"), LogLevel::Error);
    assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
    assert_eq!(LogLevel::from_str_or_default("Debug"), LogLevel::Debug);
    assert_eq!(LogLevel::from_str_or_default("verbose"), LogLevel::Info);
}

#[test]
fn test_environment_parsing() {
    assert_eq!(
        Environment::from_str_or_default("PROD"),
        Environment::Production
    );
    assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
    assert_eq!(
        Environment::from_str_or_default("staging"),
        Environment::Development
    );
}

#[test]
fn test_database_url_parsing() {
    assert_eq!(
        DatabaseUrl::parse_url("sqlite::memory:").unwrap(),
        DatabaseUrl::Memory
    );
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:./data/planner.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("./data/planner.db")
        }
    );
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:///var/lib/planner.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("/var/lib/planner.db")
        }
    );
    // Bare paths are database files
    assert_eq!(
        DatabaseUrl::parse_url("planner.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("planner.db")
        }
    );

    assert!(DatabaseUrl::parse_url("").is_err());
    assert!(DatabaseUrl::parse_url("sqlite:").is_err());
    assert!(DatabaseUrl::parse_url("postgresql://localhost/planner").is_err());
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, ports::DEFAULT_HTTP_PORT);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.cors.allowed_origins, "*");
    assert!(!config.inference.is_enabled());
    assert_eq!(config.inference.model, DEFAULT_GEMINI_MODEL);
    assert_eq!(config.inference.planning_model, DEFAULT_PLANNING_MODEL);
    assert_eq!(config.inference.timeout_secs, DEFAULT_INFERENCE_TIMEOUT_SECS);
    assert!(!config.database.is_memory());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    env::set_var("HTTP_PORT", "9100");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("GEMINI_API_KEY", "test-key");
    env::set_var("PLANNING_MODEL", "gemini-planner");
    env::set_var("INFERENCE_TIMEOUT_SECS", "5");
    env::set_var("ENVIRONMENT", "testing");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9100);
    assert!(config.database.is_memory());
    assert!(config.inference.is_enabled());
    assert_eq!(config.inference.planning_model, "gemini-planner");
    assert_eq!(config.inference.timeout().as_secs(), 5);
    assert_eq!(config.environment, Environment::Testing);
}

#[test]
#[serial]
fn test_blank_api_key_disables_inference() {
    clear_env();
    env::set_var("GEMINI_API_KEY", "   ");
    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert!(config.inference.gemini_api_key.is_none());
    assert!(!config.inference.is_enabled());
}

#[test]
#[serial]
fn test_malformed_values_are_rejected() {
    clear_env();
    env::set_var("HTTP_PORT", "not-a-port");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("HTTP_PORT", "0");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("INFERENCE_TIMEOUT_SECS", "0");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("DATABASE_URL", "mysql://localhost/planner");
    assert!(ServerConfig::from_env().is_err());
    clear_env();
}

#[test]
fn test_summary_and_debug_hide_the_api_key() {
    let mut config = ServerConfig::default();
    config.inference.gemini_api_key = Some("super-secret-key".to_owned());

    let summary = config.summary();
    assert!(summary.contains("Inference: Enabled"));
    assert!(!summary.contains("super-secret-key"));

    let debug = format!("{:?}", config.inference);
    assert!(debug.contains("[REDACTED]"));
    assert!(!debug.contains("super-secret-key"));
}
