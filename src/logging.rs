// ABOUTME: Logging configuration and structured logging setup for the recipe planner
// ABOUTME: Configures log levels, formats, noise filters, and domain event helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Process-wide `tracing` setup.
//!
//! [`LoggingConfig`] decides the format and filter, [`AppLogger`] gives the
//! stores and the inference service one consistent shape for their events.

use std::env;
use std::io;

use anyhow::Result;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::constants::service_names;

/// How the process writes its logs
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Line format
    pub format: LogFormat,
    /// Attach `file:line` to every event
    pub include_location: bool,
    /// Attach the worker thread id
    pub include_thread: bool,
    /// Emit an event when a span opens and closes
    pub include_spans: bool,
    /// Reported in the startup banner
    pub service_name: String,
    /// Crate version, reported in the startup banner
    pub service_version: String,
    /// Deployment name (`development`, `testing`, `production`)
    pub environment: String,
}

/// Line format of the log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers
    Json,
    /// Multi-field human output
    Pretty,
    /// Single line per event, no target
    Compact,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value, anything unknown is pretty
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Crates whose chatter is capped regardless of `RUST_LOG`
const QUIET_TARGETS: [&str; 6] = [
    "hyper=warn",
    "hyper::proto=warn",
    "reqwest=warn",
    "sqlx=warn",
    "sqlx::query=warn",
    "tower_http=info",
];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: service_names::RECIPE_PLANNER_SERVER.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `ENVIRONMENT`, `SERVICE_NAME` and the `LOG_INCLUDE_*` switches
    ///
    /// Production always logs locations and thread ids.
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let production = environment == "production";
        let flag = |name: &str| env::var(name).is_ok();

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: env::var("LOG_FORMAT")
                .map_or(LogFormat::Pretty, |value| LogFormat::from_str_or_default(&value)),
            include_location: production || flag("LOG_INCLUDE_LOCATION"),
            include_thread: production || flag("LOG_INCLUDE_THREAD"),
            include_spans: flag("LOG_INCLUDE_SPANS"),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::RECIPE_PLANNER_SERVER.into()),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    /// `RUST_LOG` (or the configured level) with [`QUIET_TARGETS`] appended
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let base = env::var("RUST_LOG").unwrap_or_else(|_| self.level.clone());
        QUIET_TARGETS
            .into_iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::new(base), EnvFilter::add_directive)
    }

    fn output_layer(&self) -> BoxedLayer {
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        match self.format {
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(io::stdout)
                .with_filter(self.env_filter())
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_file(self.include_location)
                .with_line_number(self.include_location)
                .with_thread_ids(self.include_thread)
                .with_span_events(span_events)
                .with_writer(io::stdout)
                .with_filter(self.env_filter())
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_file(self.include_location)
                .with_line_number(self.include_location)
                .with_thread_ids(self.include_thread)
                .with_span_events(span_events)
                .with_writer(io::stdout)
                .with_filter(self.env_filter())
                .boxed(),
        }
    }

    /// Install the global subscriber and log the startup banner
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        tracing_subscriber::registry()
            .with(self.output_layer())
            .try_init()?;

        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            "Recipe planner starting up"
        );
        info!(
            "Logging configured: {}",
            json!({
                "level": self.level,
                "format": format!("{:?}", self.format),
                "location": self.include_location,
                "thread": self.include_thread,
                "spans": self.include_spans,
            })
        );
        Ok(())
    }
}

/// [`LoggingConfig::from_env`] then [`LoggingConfig::init`]
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Structured events shared across stores and inference
pub struct AppLogger;

impl AppLogger {
    /// Log a completed, failed, or cancelled inference call
    pub fn log_inference_call(
        provider: &str,
        flow: &str,
        model: &str,
        outcome: &str,
        duration_ms: u64,
    ) {
        info!(
            inference.provider = %provider,
            inference.flow = %flow,
            inference.model = %model,
            inference.outcome = %outcome,
            inference.duration_ms = %duration_ms,
            "Inference call"
        );
    }

    /// Log a change to a persisted store
    pub fn log_store_mutation(store: &str, operation: &str, target: &str) {
        info!(
            store.name = %store,
            store.operation = %operation,
            store.target = %target,
            "Store mutation"
        );
    }

    /// Log an input rejected at the HTTP boundary
    pub fn log_rejected_input(route: &str, reason: &str) {
        warn!(
            http.route = %route,
            rejection.reason = %reason,
            "Rejected input"
        );
    }
}
