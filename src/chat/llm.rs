//! Language model rendering of chat answers.
//!
//! The [`LanguageModel`] trait hides the completion API so the chat handler
//! can run with a real client, a test double, or none at all.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::{AppError, Result};

const SUGGESTION_SYSTEM_PROMPT: &str = "You are a helpful assistant for a bug tracking system. \
The user is asking for a task suggestion. You should recommend ONE specific task from the Open issues, \
prioritizing by: 1) Priority (High > Medium > Low), 2) Earliest due date.
Be enthusiastic and encouraging. Explain why this task is a good choice.
Format your response in a natural, conversational way.
If there are no Open issues, politely inform the user.";

const GENERAL_SYSTEM_PROMPT: &str = "You are a helpful assistant for a bug tracking system. \
You help users understand their issues and tasks.
Be concise, friendly, and informative.
Format your response in a natural, conversational way.
If there are no issues, politely inform the user.";

/// System prompt for the given kind of question.
#[must_use]
pub fn system_prompt(is_task_suggestion: bool) -> &'static str {
    if is_task_suggestion {
        SUGGESTION_SYSTEM_PROMPT
    } else {
        GENERAL_SYSTEM_PROMPT
    }
}

/// User prompt embedding the question, the query summary and the issue data.
#[must_use]
pub fn user_prompt(user_message: &str, query_context: &str, issues_text: &str) -> String {
    format!(
        "User asked: \"{user_message}\"\n\n{query_context}\n\n\
         Here are the relevant issues from the database:\n\n{issues_text}\n\n\
         Please provide a natural, conversational response to the user's question based on this data."
    )
}

/// A chat-completion backend.
pub trait LanguageModel: Send + Sync {
    /// Generate a reply from a system prompt and a user prompt.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Llm` if the request fails or the response has
    /// no content.
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Build a client from configuration, or `None` when disabled or no
    /// API key was loaded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Llm` if the HTTP client cannot be constructed.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let Some(ref api_key) = config.api_key else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Some(Self {
            http,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key: api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }))
    }
}

impl LanguageModel for OpenAiClient {
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        let system = system.to_owned();
        let user = user.to_owned();
        Box::pin(async move {
            let body = CompletionRequest {
                model: &self.model,
                messages: [
                    Message {
                        role: "system",
                        content: &system,
                    },
                    Message {
                        role: "user",
                        content: &user,
                    },
                ],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let response: CompletionResponse = self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| AppError::Llm("completion returned no content".into()))
        })
    }
}
