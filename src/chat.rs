//! Chat turn handling: scripted replies, answer lookup and media.

use crate::answer::AnswerProvider;
use crate::config::{ChatConfig, ExpressionMode};
use crate::error::Result;
use crate::message::{ChatResponse, Message};
use crate::pipeline::MediaPipeline;
use crate::scripted::ScriptedReplies;
use crate::sentiment;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Turns a user message into the avatar's reply.
#[derive(Clone)]
pub struct ChatService {
    answers: Arc<dyn AnswerProvider>,
    pipeline: MediaPipeline,
    scripts: ScriptedReplies,
    speech_configured: bool,
    config: ChatConfig,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("pipeline", &self.pipeline)
            .field("speech_configured", &self.speech_configured)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatService {
    /// `speech_configured` is false when the speech backend has no
    /// credentials; with `config.key_reminder` every non-empty message then
    /// gets the reminder script.
    pub fn new(
        answers: Arc<dyn AnswerProvider>,
        pipeline: MediaPipeline,
        scripts: ScriptedReplies,
        speech_configured: bool,
        config: ChatConfig,
    ) -> Self {
        Self {
            answers,
            pipeline,
            scripts,
            speech_configured,
            config,
        }
    }

    /// Handle one chat turn.
    ///
    /// # Errors
    ///
    /// Propagates media pipeline failures. Answer backend failures are
    /// already replaced by the fallback answer.
    pub async fn handle(&self, user_message: Option<String>) -> Result<ChatResponse> {
        let Some(prompt) = user_message.filter(|m| !m.trim().is_empty()) else {
            debug!("empty message, sending intro");
            return Ok(ChatResponse {
                user_prompt: String::new(),
                ai_messages: self.scripts.intro(),
                sources: None,
            });
        };

        if self.config.key_reminder && !self.speech_configured {
            info!("speech backend has no API key, sending reminder");
            return Ok(ChatResponse {
                user_prompt: prompt,
                ai_messages: self.scripts.missing_keys(),
                sources: None,
            });
        }

        let started = Instant::now();
        let answer = self.answers.ask(&prompt).await;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            sources = ?answer.sources,
            "chat answer"
        );

        let message = self.reply_message(&answer.response);
        let ai_messages = self.pipeline.run(vec![message]).await?;

        Ok(ChatResponse {
            user_prompt: prompt,
            ai_messages,
            sources: self.config.expose_sources.then_some(answer.sources),
        })
    }

    fn reply_message(&self, response: &str) -> Message {
        match self.config.expression_mode {
            ExpressionMode::Fixed => {
                let (facial_expression, animation) = sentiment::NEUTRAL;
                Message::new(response, facial_expression, animation)
            }
            ExpressionMode::Sentiment => {
                let (facial_expression, animation) = sentiment::expression_for(response);
                let spoken = sentiment::strip_mood_tag(response)
                    .map(|(rest, _)| rest)
                    .unwrap_or(response);
                Message::new(spoken, facial_expression, animation)
            }
        }
    }
}
