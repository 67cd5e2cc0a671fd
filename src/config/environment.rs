// ABOUTME: Environment configuration for the recipe planner server
// ABOUTME: Parses ports, storage URL, CORS origins, and inference settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{env_vars, ports, service_names};

/// Default SQLite database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/recipe_planner.db";
/// Default model for recipe generation and import
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
/// Default model for planning generation
pub const DEFAULT_PLANNING_MODEL: &str = "gemini-2.0-flash";
/// Default inference call timeout
pub const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 60;
/// Default timeout when fetching a recipe page
pub const DEFAULT_URL_FETCH_TIMEOUT_SECS: u64 = 15;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        };
        f.write_str(name)
    }
}

/// Type-safe storage location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database file
    SQLite {
        /// Path of the database file
        path: PathBuf,
    },
    /// Process memory, nothing survives a restart
    Memory,
}

impl DatabaseUrl {
    /// Parse from string
    ///
    /// `sqlite::memory:` selects the in-memory backend; any other `sqlite:`
    /// URL or bare path is a database file.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty URL or a non-SQLite scheme.
    pub fn parse_url(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            anyhow::bail!("{} must not be empty", env_vars::DATABASE_URL);
        }
        if let Some(path_str) = trimmed.strip_prefix("sqlite:") {
            if path_str == ":memory:" {
                return Ok(Self::Memory);
            }
            let path_str = path_str.trim_start_matches("//");
            if path_str.is_empty() {
                anyhow::bail!("SQLite URL '{trimmed}' has no path");
            }
            return Ok(Self::SQLite {
                path: PathBuf::from(path_str),
            });
        }
        if trimmed.contains("://") {
            anyhow::bail!("Unsupported database URL '{trimmed}', only sqlite is supported");
        }
        // Fallback: treat as SQLite file path
        Ok(Self::SQLite {
            path: PathBuf::from(trimmed),
        })
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is the in-memory backend
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/recipe_planner.db"),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*`
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".to_owned(),
        }
    }
}

/// Recipe inference (LLM) configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Gemini API key; inference routes answer 503 without one
    pub gemini_api_key: Option<String>,
    /// Model for recipe generation and import
    pub model: String,
    /// Model for planning generation
    pub planning_model: String,
    /// Upper bound on one inference call
    pub timeout_secs: u64,
    /// Upper bound on fetching a recipe page
    pub fetch_timeout_secs: u64,
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("model", &self.model)
            .field("planning_model", &self.planning_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .finish()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_owned(),
            planning_model: DEFAULT_PLANNING_MODEL.to_owned(),
            timeout_secs: DEFAULT_INFERENCE_TIMEOUT_SECS,
            fetch_timeout_secs: DEFAULT_URL_FETCH_TIMEOUT_SECS,
        }
    }
}

impl InferenceConfig {
    /// Inference call timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Recipe page fetch timeout
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// True when an API key is configured
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Snapshot storage location
    pub database: DatabaseUrl,
    /// CORS settings
    pub cors: CorsConfig,
    /// Inference settings
    pub inference: InferenceConfig,
    /// Service name reported by health routes
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            http_port: ports::DEFAULT_HTTP_PORT,
            log_level: LogLevel::default(),
            environment: Environment::default(),
            database: DatabaseUrl::default(),
            cors: CorsConfig::default(),
            inference: InferenceConfig::default(),
            service_name: service_names::RECIPE_PLANNER_SERVER.to_owned(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or validation fails.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            host: env_var_or(env_vars::HOST, "0.0.0.0"),
            http_port: env_var_or(env_vars::HTTP_PORT, &ports::DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database: DatabaseUrl::parse_url(&env_var_or(
                env_vars::DATABASE_URL,
                DEFAULT_DATABASE_URL,
            ))
            .context("Invalid DATABASE_URL value")?,
            cors: CorsConfig {
                allowed_origins: env_var_or(env_vars::CORS_ALLOWED_ORIGINS, "*"),
            },
            inference: InferenceConfig {
                gemini_api_key: env::var(env_vars::GEMINI_API_KEY)
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                model: env_var_or(env_vars::GEMINI_MODEL, DEFAULT_GEMINI_MODEL),
                planning_model: env_var_or(env_vars::PLANNING_MODEL, DEFAULT_PLANNING_MODEL),
                timeout_secs: env_var_or(
                    env_vars::INFERENCE_TIMEOUT_SECS,
                    &DEFAULT_INFERENCE_TIMEOUT_SECS.to_string(),
                )
                .parse()
                .context("Invalid INFERENCE_TIMEOUT_SECS value")?,
                fetch_timeout_secs: env_var_or(
                    env_vars::URL_FETCH_TIMEOUT_SECS,
                    &DEFAULT_URL_FETCH_TIMEOUT_SECS.to_string(),
                )
                .parse()
                .context("Invalid URL_FETCH_TIMEOUT_SECS value")?,
            },
            service_name: env_var_or("SERVICE_NAME", service_names::RECIPE_PLANNER_SERVER),
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error for a zero port or zero timeouts.
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            anyhow::bail!("HTTP_PORT must not be 0");
        }
        if self.inference.timeout_secs == 0 {
            anyhow::bail!("INFERENCE_TIMEOUT_SECS must be at least 1");
        }
        if self.inference.fetch_timeout_secs == 0 {
            anyhow::bail!("URL_FETCH_TIMEOUT_SECS must be at least 1");
        }
        if !self.inference.is_enabled() {
            warn!("GEMINI_API_KEY is not set, inference routes will answer 503");
        }
        if self.database.is_memory() && self.environment.is_production() {
            warn!("In-memory storage selected in production, data will not survive a restart");
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Recipe Planner Configuration:\n\
             - Bind: {}:{}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Storage: {}\n\
             - CORS Origins: {}\n\
             - Inference: {}\n\
             - Models: {} / {} (planning)",
            self.host,
            self.http_port,
            self.environment,
            self.log_level,
            self.database,
            self.cors.allowed_origins,
            if self.inference.is_enabled() {
                "Enabled"
            } else {
                "Disabled"
            },
            self.inference.model,
            self.inference.planning_model,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
