// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Provides request id propagation and the CORS layer built from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

pub mod cors;
pub mod tracing;

// CORS configuration
pub use cors::setup_cors;

// Request tracing and correlation
pub use self::tracing::{create_request_span, request_id_middleware, RequestId, REQUEST_ID_HEADER};
