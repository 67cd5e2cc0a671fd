// ABOUTME: Google Gemini provider used for recipe generation, import, and planning
// ABOUTME: Sends text and inline images to generateContent and can request JSON output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Gemini Provider
//!
//! [`LlmProvider`] over the Gemini `generateContent` REST endpoint.
//!
//! The API key travels in the `x-goog-api-key` header so it never appears in
//! a logged URL. System messages become the `systemInstruction`, images are
//! sent as `inlineData` parts ahead of the text of their message, and
//! [`ResponseFormat::Json`] maps to `responseMimeType: application/json`.
//!
//! ```rust,no_run
//! use recipe_planner::llm::{ChatMessage, ChatRequest, GeminiProvider, LlmProvider};
//! use recipe_planner::errors::AppError;
//!
//! # async fn example() -> Result<(), AppError> {
//! let provider = GeminiProvider::new("api-key");
//! let request = ChatRequest::new(vec![ChatMessage::user("A lemon tart for six")])
//!     .with_json_response();
//! let response = provider.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use super::{
    ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, MessageRole,
    ResponseFormat, TokenUsage,
};
use crate::errors::{AppError, ErrorCode};

const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const KNOWN_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
];

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

const SERVICE_NAME: &str = "Gemini";

// Wire format of generateContent

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationSettings>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

/// One part of a content; unknown part kinds in replies are ignored
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    candidate_count: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentReply {
    #[serde(default)]
    candidates: Vec<ReplyCandidate>,
    usage_metadata: Option<UsageCounts>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyCandidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageCounts {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl From<&ChatMessage> for Content {
    fn from(message: &ChatMessage) -> Self {
        let mut parts: Vec<Part> = message
            .images
            .iter()
            .map(|image| Part {
                text: None,
                inline_data: Some(Blob {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
            })
            .collect();
        if !message.content.is_empty() || parts.is_empty() {
            parts.push(Part::text(message.content.clone()));
        }

        let role = match message.role {
            MessageRole::Assistant => "model",
            MessageRole::System | MessageRole::User => "user",
        };
        Self {
            role: Some(role.to_owned()),
            parts,
        }
    }
}

impl From<&ChatRequest> for GenerateContentBody {
    fn from(request: &ChatRequest) -> Self {
        // Gemini takes a single system instruction; several system messages are joined
        let system_text: Vec<&str> = request
            .messages
            .iter()
            .filter(|message| message.role == MessageRole::System)
            .map(|message| message.content.as_str())
            .collect();
        let system_instruction = (!system_text.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::text(system_text.join("\n\n"))],
        });

        let json_mode = request.response_format == ResponseFormat::Json;
        let generation_config = (json_mode
            || request.temperature.is_some()
            || request.max_tokens.is_some())
        .then(|| GenerationSettings {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
            response_mime_type: json_mode.then_some("application/json"),
            candidate_count: 1,
        });

        Self {
            contents: request
                .messages
                .iter()
                .filter(|message| message.role != MessageRole::System)
                .map(Content::from)
                .collect(),
            system_instruction,
            generation_config,
        }
    }
}

impl GenerateContentReply {
    /// Text parts of the first candidate joined together, empty when there is none
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn finish_reason(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.clone())
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }
}

impl From<&UsageCounts> for TokenUsage {
    fn from(usage: &UsageCounts) -> Self {
        Self {
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        }
    }
}

/// Google Gemini LLM provider
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    default_model: String,
}

impl GeminiProvider {
    /// Create a provider for `api_key` using the default model
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Use `model` when a request names none
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Turn a non-2xx answer into the matching error
    fn status_error(status: u16, body: &str) -> AppError {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .map_or_else(|_| body.trim().to_owned(), |envelope| envelope.error.message);

        match status {
            429 => AppError::new(ErrorCode::ExternalRateLimited, quota_message(&detail)),
            500..=599 => AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("{SERVICE_NAME} is unavailable ({status}): {detail}"),
            ),
            _ => AppError::external_service(SERVICE_NAME, format!("request rejected ({status}): {detail}")),
        }
    }
}

/// User-facing text for a quota error, keeping the retry delay when Gemini gives one
fn quota_message(detail: &str) -> String {
    // Gemini phrases it as "Please retry in 6.406453963s."
    let retry_after = detail
        .split_once("retry in ")
        .and_then(|(_, rest)| rest.split_once('s'))
        .and_then(|(seconds, _)| seconds.trim().parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0);

    match retry_after {
        Some(seconds) => format!(
            "AI service quota exceeded. Please try again in {} seconds.",
            seconds.ceil() as u64
        ),
        None => "AI service quota exceeded. Please wait a moment and try again.".to_owned(),
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn available_models(&self) -> &'static [&'static str] {
        KNOWN_MODELS
    }

    #[instrument(skip_all, fields(model = tracing::field::Empty))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        tracing::Span::current().record("model", model);

        let body = GenerateContentBody::from(request);
        let response = self
            .client
            .post(format!("{ENDPOINT}/models/{model}:generateContent"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("{SERVICE_NAME} request failed: {e}"),
                )
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("{SERVICE_NAME} response could not be read: {e}"),
            )
        })?;

        if !status.is_success() {
            error!(status = status.as_u16(), "Gemini rejected the request");
            return Err(Self::status_error(status.as_u16(), &text));
        }

        let reply: GenerateContentReply = serde_json::from_str(&text).map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("unreadable response: {e}"))
        })?;

        let content = reply.text();
        if content.is_empty() {
            match reply.block_reason() {
                Some(reason) => warn!(reason, "Gemini blocked the prompt"),
                None => warn!("Gemini returned no candidate text"),
            }
        }
        debug!(chars = content.len(), "Gemini answered");

        Ok(ChatResponse {
            content,
            model: model.to_owned(),
            usage: reply.usage_metadata.as_ref().map(TokenUsage::from),
            finish_reason: reply.finish_reason(),
        })
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("default_model", &self.default_model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::InlineImage;

    #[test]
    fn test_json_mode_and_system_instruction() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("chef"),
            ChatMessage::user("tart"),
        ])
        .with_json_response();
        let body = serde_json::to_value(GenerateContentBody::from(&request)).unwrap();

        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "chef");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn test_images_precede_text() {
        let request = ChatRequest::new(vec![ChatMessage::user("read this").with_image(
            InlineImage {
                mime_type: "image/jpeg".to_owned(),
                data: "QUJD".to_owned(),
            },
        )]);
        let body = serde_json::to_value(GenerateContentBody::from(&request)).unwrap();
        let parts = &body["contents"][0]["parts"];

        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert!(parts[0].get("text").is_none());
        assert_eq!(parts[1]["text"], "read this");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_reply_text_joins_parts_and_tolerates_blocks() {
        let reply: GenerateContentReply =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(reply.text(), "");
        assert_eq!(reply.block_reason(), Some("SAFETY"));

        let reply: GenerateContentReply = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"title\":"},{"text":"\"Tarte\"}"}]},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":12,"totalTokenCount":20}}"#,
        )
        .unwrap();
        assert_eq!(reply.text(), r#"{"title":"Tarte"}"#);
        assert_eq!(reply.finish_reason().as_deref(), Some("STOP"));
        let usage = TokenUsage::from(reply.usage_metadata.as_ref().unwrap());
        assert_eq!(usage.completion_tokens, 0);
        assert_eq!(usage.total_tokens, 20);
    }

    #[test]
    fn test_status_errors() {
        let error = GeminiProvider::status_error(
            429,
            r#"{"error":{"message":"Quota exceeded. Please retry in 6.4s."}}"#,
        );
        assert_eq!(error.code, ErrorCode::ExternalRateLimited);
        assert_eq!(
            error.message,
            "AI service quota exceeded. Please try again in 7 seconds."
        );

        let error = GeminiProvider::status_error(503, "overloaded");
        assert_eq!(error.code, ErrorCode::ExternalServiceUnavailable);

        let error = GeminiProvider::status_error(400, "bad request");
        assert_eq!(error.code, ErrorCode::ExternalServiceError);
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GeminiProvider::new("secret-key");
        assert!(!format!("{provider:?}").contains("secret-key"));
    }
}
