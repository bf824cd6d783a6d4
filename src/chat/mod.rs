//! Natural-language chat over the issue store.
//!
//! A message is validated, classified by the [`intent::IntentParser`],
//! answered by [`query::IssueQueryService`], and rendered either by the
//! configured [`llm::LanguageModel`] or by the plain [`format`] helpers.

pub mod format;
pub mod intent;
pub mod llm;
pub mod query;
pub mod ranker;

use std::sync::Arc;

use tracing::{info_span, warn, Instrument};

use crate::config::ChatConfig;
use crate::{AppError, Result};

use self::intent::{ChatIntent, IntentParser};
use self::llm::LanguageModel;
use self::query::IssueQueryService;

/// Everything needed to answer one chat message.
#[derive(Clone)]
pub struct ChatService {
    parser: Arc<IntentParser>,
    queries: IssueQueryService,
    llm: Option<Arc<dyn LanguageModel>>,
    config: ChatConfig,
}

impl ChatService {
    /// Assemble a chat service from its collaborators.
    #[must_use]
    pub fn new(
        parser: Arc<IntentParser>,
        queries: IssueQueryService,
        llm: Option<Arc<dyn LanguageModel>>,
        config: ChatConfig,
    ) -> Self {
        Self {
            parser,
            queries,
            llm,
            config,
        }
    }

    /// Answer a raw chat message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the message is empty after
    /// trimming or longer than the configured limit.
    pub async fn reply(&self, raw: &str) -> Result<String> {
        let message = raw.trim();
        if message.is_empty() {
            return Err(AppError::Validation("Message is required".into()));
        }
        let max = self.config.max_message_chars;
        if message.chars().count() > max {
            return Err(AppError::Validation(format!(
                "Message too long (max {max} characters)"
            )));
        }

        let intent = self.parser.parse(message);
        let span = info_span!("chat_reply", intent = ?intent);
        async move {
            let is_suggestion = intent == ChatIntent::TaskSuggestion;
            let answer = self.queries.dispatch(intent).await;

            let Some(ref llm) = self.llm else {
                return Ok(format::plain_reply(&answer, self.config.list_preview));
            };

            let issues_text = format::issues_for_llm(&answer.issues);
            let prompt = llm::user_prompt(message, &answer.context, &issues_text);
            match llm
                .complete(llm::system_prompt(is_suggestion), &prompt)
                .await
            {
                Ok(text) => Ok(text),
                Err(err) => {
                    warn!(%err, "language model failed; using plain reply");
                    Ok(format::plain_reply(&answer, self.config.list_preview))
                }
            }
        }
        .instrument(span)
        .await
    }
}
