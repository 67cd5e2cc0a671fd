// ABOUTME: CORS middleware configuration for the recipe planner HTTP API
// ABOUTME: Allows any origin or an explicit origin list taken from CORS_ALLOWED_ORIGINS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use http::header::{HeaderName, ACCEPT, CONTENT_TYPE, ORIGIN};
use http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::tracing::REQUEST_ID_HEADER;
use crate::config::ServerConfig;
use crate::routes::inference::VIEW_ID_HEADER;

/// Parse a comma-separated origin list
///
/// `None` means any origin: the setting is blank, `*`, or names nothing
/// usable as a header value.
fn parse_origins(configured: &str) -> Option<Vec<HeaderValue>> {
    let configured = configured.trim();
    if configured.is_empty() || configured == "*" {
        return None;
    }

    let origins: Vec<HeaderValue> = configured
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    (!origins.is_empty()).then_some(origins)
}

/// CORS layer for the web client
///
/// ```bash
/// export CORS_ALLOWED_ORIGINS="https://recettes.example.com,https://admin.example.com"
/// ```
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let allow_origin =
        parse_origins(&config.cors.allowed_origins).map_or_else(AllowOrigin::any, AllowOrigin::list);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            ORIGIN,
            request_id.clone(),
            HeaderName::from_static(VIEW_ID_HEADER),
        ])
        .expose_headers([request_id])
}
