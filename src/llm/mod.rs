//! Opaque chat-model interface.
//!
//! The memory core only needs one operation from a language model: prompt
//! in, free text out. Query expansion is the sole consumer inside this
//! crate; the surrounding agent brings its own client.

use crate::error::{MinneError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Timeout for completion requests. Query expansion is a short call; a
/// hung request should fail fast rather than stall the whole recall.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

/// Trait for opaque language-model completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a composed prompt and return the model's free-text response.
    ///
    /// `history` is pre-formatted conversation context; `file` is an
    /// optional attachment whose content is folded into the prompt.
    async fn complete(
        &self,
        prompt: &str,
        history: Option<&str>,
        file: Option<&Path>,
    ) -> Result<String>;
}

/// OpenAI-backed chat model.
pub struct OpenAIChatModel {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    pub fn new(model: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()?;
        let client =
            async_openai::Client::with_config(OpenAIConfig::default()).with_http_client(http_client);
        Ok(Self {
            client,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    async fn complete(
        &self,
        prompt: &str,
        history: Option<&str>,
        file: Option<&Path>,
    ) -> Result<String> {
        let mut user_content = String::new();
        if let Some(history) = history {
            user_content.push_str(history);
            user_content.push_str("\n\n");
        }
        user_content.push_str(prompt);
        if let Some(path) = file {
            let attachment = std::fs::read_to_string(path)?;
            user_content.push_str("\n\n# Attached file\n");
            user_content.push_str(&attachment);
        }

        let messages: Vec<async_openai::types::ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content("You are a precise assistant.")
                .build()
                .map_err(|e| MinneError::OpenAI(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_content)
                .build()
                .map_err(|e| MinneError::OpenAI(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.3)
            .build()
            .map_err(|e| MinneError::OpenAI(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| MinneError::OpenAI(format!("completion failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| MinneError::OpenAI("empty response from model".to_string()))?
            .clone();

        debug!("Model returned {} chars", content.len());
        Ok(content)
    }
}
