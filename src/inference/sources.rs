// ABOUTME: Input sources of the import flows: recipe web pages and photo data URIs
// ABOUTME: Validates URLs, reduces HTML to readable text, and decodes base64 image payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::OnceLock;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::constants::limits::{MAX_IMAGE_BYTES, MAX_PAGE_TEXT_CHARS};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::InlineImage;

static STRUCTURED_DATA: OnceLock<Option<Regex>> = OnceLock::new();
static NON_CONTENT: OnceLock<Option<Regex>> = OnceLock::new();
static TAG: OnceLock<Option<Regex>> = OnceLock::new();

fn structured_data_pattern() -> Option<&'static Regex> {
    STRUCTURED_DATA
        .get_or_init(|| {
            Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
                .ok()
        })
        .as_ref()
}

fn non_content_pattern() -> Option<&'static Regex> {
    NON_CONTENT
        .get_or_init(|| {
            Regex::new(r"(?is)<(?:script|style|noscript|svg|head)\b[^>]*>.*?</(?:script|style|noscript|svg|head)>|<!--.*?-->").ok()
        })
        .as_ref()
}

fn tag_pattern() -> Option<&'static Regex> {
    TAG.get_or_init(|| Regex::new(r"(?s)<[^>]*>").ok()).as_ref()
}

/// Check that `input` is an absolute http(s) URL with a host
///
/// # Errors
///
/// Returns `INVALID_FORMAT` otherwise.
pub fn validate_recipe_url(input: &str) -> AppResult<Url> {
    let invalid = || {
        AppError::new(
            ErrorCode::InvalidFormat,
            format!("'{input}' is not an absolute http(s) URL"),
        )
    };
    let url = Url::parse(input.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce an HTML page to the text a model needs to read a recipe
///
/// Embedded JSON-LD blocks (where recipe sites publish structured recipe
/// data) come first, followed by the visible text. The result is capped at
/// `MAX_PAGE_TEXT_CHARS` characters.
#[must_use]
pub fn extract_page_text(html: &str) -> String {
    let mut sections = Vec::new();

    if let Some(pattern) = structured_data_pattern() {
        sections.extend(
            pattern
                .captures_iter(html)
                .filter_map(|caps| caps.get(1))
                .map(|m| collapse_whitespace(m.as_str()))
                .filter(|block| !block.is_empty()),
        );
    }

    let without_scripts = non_content_pattern().map_or_else(
        || html.to_owned(),
        |pattern| pattern.replace_all(html, " ").into_owned(),
    );
    let without_tags = tag_pattern().map_or_else(
        || without_scripts.clone(),
        |pattern| pattern.replace_all(&without_scripts, " ").into_owned(),
    );
    let visible = collapse_whitespace(&html_escape::decode_html_entities(&without_tags));
    if !visible.is_empty() {
        sections.push(visible);
    }

    let text = sections.join("\n\n");
    match text.char_indices().nth(MAX_PAGE_TEXT_CHARS) {
        Some((cut, _)) => text[..cut].to_owned(),
        None => text,
    }
}

/// Download a recipe page and return its readable text
///
/// # Errors
///
/// Returns `EXTERNAL_SERVICE_UNAVAILABLE` when the page cannot be fetched.
pub async fn fetch_page_text(client: &Client, url: &Url, timeout: Duration) -> AppResult<String> {
    let unavailable = |e: reqwest::Error| {
        AppError::new(
            ErrorCode::ExternalServiceUnavailable,
            format!("Could not fetch {url}: {e}"),
        )
    };

    let response = client
        .get(url.as_str())
        .timeout(timeout)
        .send()
        .await
        .map_err(unavailable)?
        .error_for_status()
        .map_err(unavailable)?;
    let html = response.text().await.map_err(unavailable)?;

    debug!(url = %url, bytes = html.len(), "Fetched recipe page");
    Ok(extract_page_text(&html))
}

/// Decoded photo payload, ready to be attached to a model request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPayload {
    /// Image MIME type
    pub mime_type: String,
    /// Base64 payload as received
    pub data: String,
    /// Decoded size in bytes
    pub size: usize,
}

impl PhotoPayload {
    /// Parse a `data:<mime>;base64,<payload>` URI
    ///
    /// # Errors
    ///
    /// Returns `INVALID_FORMAT` when the URI is malformed, not an image, or
    /// not valid base64, and `VALUE_OUT_OF_RANGE` when the decoded image is
    /// larger than `MAX_IMAGE_BYTES`.
    pub fn parse(data_uri: &str) -> AppResult<Self> {
        let malformed = |reason: &str| {
            AppError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid photo data URI: {reason}"),
            )
        };

        let rest = data_uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| malformed("missing 'data:' prefix"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| malformed("missing ',' separator"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| malformed("payload must be base64 encoded"))?
            .trim()
            .to_ascii_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(malformed("MIME type must be an image type"));
        }

        let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let decoded = STANDARD
            .decode(payload.as_bytes())
            .map_err(|_| malformed("payload is not valid base64"))?;
        if decoded.is_empty() {
            return Err(malformed("payload is empty"));
        }
        if decoded.len() > MAX_IMAGE_BYTES {
            return Err(AppError::new(
                ErrorCode::ValueOutOfRange,
                format!(
                    "Photo is {} bytes, the limit is {MAX_IMAGE_BYTES} bytes",
                    decoded.len()
                ),
            ));
        }

        Ok(Self {
            mime_type,
            data: payload,
            size: decoded.len(),
        })
    }

    /// Convert into a model attachment
    #[must_use]
    pub fn into_image(self) -> InlineImage {
        InlineImage {
            mime_type: self.mime_type,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_must_be_absolute_http() {
        assert!(validate_recipe_url("https://www.marmiton.org/recettes/tarte").is_ok());
        assert!(validate_recipe_url("/recettes/tarte").is_err());
        assert!(validate_recipe_url("ftp://example.com/file").is_err());
        assert!(validate_recipe_url("mailto:chef@example.com").is_err());
    }

    #[test]
    fn test_page_text_keeps_structured_data_and_visible_text() {
        let html = r#"<html><head><title>x</title><style>p{color:red}</style></head>
            <body><script type="application/ld+json">{"@type":"Recipe","name":"Tarte"}</script>
            <script>track()</script><h1>Tarte &amp; cr&#232;me</h1><!-- ad --><p>Cuire 20 min</p></body></html>"#;
        let text = extract_page_text(html);

        assert!(text.starts_with(r#"{"@type":"Recipe","name":"Tarte"}"#));
        assert!(text.contains("Tarte & crème Cuire 20 min"));
        assert!(!text.contains("track()"));
        assert!(!text.contains("color:red"));
    }

    #[test]
    fn test_page_text_is_capped() {
        let html = "é".repeat(MAX_PAGE_TEXT_CHARS + 10);
        assert_eq!(extract_page_text(&html).chars().count(), MAX_PAGE_TEXT_CHARS);
    }

    #[test]
    fn test_photo_data_uri() {
        let photo = PhotoPayload::parse("data:image/png;base64,iVBORw0K").unwrap();
        assert_eq!(photo.mime_type, "image/png");
        assert_eq!(photo.size, 6);

        assert!(PhotoPayload::parse("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(PhotoPayload::parse("data:image/png,raw").is_err());
        assert!(PhotoPayload::parse("image/png;base64,aGVsbG8=").is_err());
        assert!(PhotoPayload::parse("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_photo_size_limit() {
        let payload = STANDARD.encode(vec![0_u8; MAX_IMAGE_BYTES + 1]);
        let error = PhotoPayload::parse(&format!("data:image/jpeg;base64,{payload}")).unwrap_err();
        assert_eq!(error.code, ErrorCode::ValueOutOfRange);
    }
}
