// ABOUTME: LLM provider abstraction used by the recipe inference flows
// ABOUTME: Defines chat messages with inline images, JSON-mode requests, and the provider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # LLM Provider Interface
//!
//! The inference flows only need one thing from a model: send a short
//! conversation, possibly with a photo attached, and get text back, ideally
//! a JSON document. [`LlmProvider`] is that seam. [`GeminiProvider`] is the
//! production implementation; tests plug in a scripted one.
//!
//! ```rust,no_run
//! use recipe_planner::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::system("You are an expert chef."),
//!         ChatMessage::user("A quick vegetarian lasagna"),
//!     ])
//!     .with_json_response();
//!     let response = provider.complete(&request).await;
//! }
//! ```

mod gemini;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

bitflags::bitflags! {
    /// What a provider can do beyond plain text completion
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Accepts inline images (photo import)
        const VISION = 1;
        /// Can be constrained to answer with a JSON document
        const JSON_MODE = 1 << 1;
        /// Honors a separate system instruction
        const SYSTEM_MESSAGES = 1 << 2;
    }
}

impl LlmCapabilities {
    /// A model that only reads and writes text
    #[must_use]
    pub const fn text_only() -> Self {
        Self::SYSTEM_MESSAGES
    }

    /// A multimodal model with JSON output
    #[must_use]
    pub const fn full_featured() -> Self {
        Self::all()
    }

    /// True when photos can be sent
    #[must_use]
    pub const fn supports_vision(&self) -> bool {
        self.contains(Self::VISION)
    }

    /// True when JSON output can be requested
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instruction preamble
    System,
    /// The person asking
    User,
    /// A previous model answer
    Assistant,
}

/// Base64-encoded image sent alongside a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    /// Image MIME type (`image/jpeg`)
    pub mime_type: String,
    /// Base64 payload without the data URI prefix
    pub data: String,
}

/// One message of a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: MessageRole,
    /// Text of the message, may be empty when only images are sent
    pub content: String,
    /// Attached images, sent before the text
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<InlineImage>,
}

impl ChatMessage {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Instruction preamble
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    /// User turn
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    /// Attach an inline image
    #[must_use]
    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.images.push(image);
        self
    }
}

/// Shape of the expected answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Free text
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// One completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation, system instruction first
    pub messages: Vec<ChatMessage>,
    /// Model to use; the provider default when absent
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Output token ceiling
    pub max_tokens: Option<u32>,
    /// Expected answer shape
    pub response_format: ResponseFormat,
}

impl ChatRequest {
    /// Text request over `messages` with provider defaults
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }

    /// Pin the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the answer length
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for a JSON document
    #[must_use]
    pub const fn with_json_response(mut self) -> Self {
        self.response_format = ResponseFormat::Json;
        self
    }
}

/// Answer of a completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated text, empty when the model produced no candidate
    pub content: String,
    /// Model that answered
    pub model: String,
    /// Token accounting, when reported
    pub usage: Option<TokenUsage>,
    /// Why generation stopped, as reported by the provider
    pub finish_reason: Option<String>,
}

/// Token accounting of one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens of the prompt
    pub prompt_tokens: u32,
    /// Tokens of the answer
    pub completion_tokens: u32,
    /// Both together
    pub total_tokens: u32,
}

/// A chat model the inference flows can call
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short identifier used in logs (`gemini`)
    fn name(&self) -> &'static str;

    /// Human-readable name
    fn display_name(&self) -> &'static str;

    /// What the provider supports
    fn capabilities(&self) -> LlmCapabilities;

    /// Model used when a request names none
    fn default_model(&self) -> &str;

    /// Models known to work with this provider
    fn available_models(&self) -> &'static [&'static str];

    /// Run one completion
    ///
    /// Providers do not retry; the caller decides what a failure means.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;
}
