// ABOUTME: Time-based event identifier generator (`event-<unix millis>`)
// ABOUTME: Never issues the same id twice within a process, even within one millisecond
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Prefix of every generated event id
pub const EVENT_ID_PREFIX: &str = "event-";

/// Issues `event-<n>` ids where `n` is the current unix time in milliseconds,
/// bumped past the last issued value when the clock has not moved
#[derive(Debug, Default)]
pub struct EventIdGenerator {
    last: AtomicI64,
}

impl EventIdGenerator {
    /// Create a generator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id, strictly greater than every id issued before
    #[must_use]
    pub fn next_id(&self) -> String {
        self.next_after(Utc::now().timestamp_millis())
    }

    /// Next id given the current clock reading
    pub(crate) fn next_after(&self, now_millis: i64) -> String {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return format!("{EVENT_ID_PREFIX}{candidate}"),
                Err(current) => last = current,
            }
        }
    }

    /// Never issue an id at or below `value`
    pub(crate) fn observe(&self, value: i64) {
        self.last.fetch_max(value, Ordering::AcqRel);
    }

    /// Numeric part of a generated id
    #[must_use]
    pub fn parse_millis(id: &str) -> Option<i64> {
        id.strip_prefix(EVENT_ID_PREFIX)?.parse().ok()
    }
}
