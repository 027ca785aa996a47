//! Answer provider backed by an external retrieval/completion process.
//!
//! The process receives the question as its final argument and prints a
//! JSON document `{"response": "...", "sources": [...]}` on stdout. Every
//! failure mode (spawn error, non-zero exit, timeout, malformed output) is
//! recovered here and turned into [`Answer::fallback`]; callers never see an
//! error from [`AnswerProvider::ask`].

use crate::config::{AnswerConfig, ENV_LLM_API_KEY};
use crate::error::{CompanionError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Text spoken when the answer backend cannot produce a response.
pub const FALLBACK_RESPONSE: &str = "Sorry, I couldn't answer that right now.";

/// An answer and the documents it was grounded on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub response: String,
    pub sources: Vec<String>,
}

impl Answer {
    /// The fixed apology used whenever the backend fails.
    pub fn fallback() -> Self {
        Self {
            response: FALLBACK_RESPONSE.to_owned(),
            sources: Vec::new(),
        }
    }
}

/// Source of answer text for user questions.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Answer `question`. Never fails; falls back to [`Answer::fallback`].
    async fn ask(&self, question: &str) -> Answer;
}

/// Raw stdout contract. `sources` entries may be `null` when a retrieved
/// document has no source metadata.
#[derive(Debug, Deserialize)]
struct AnswerPayload {
    response: String,
    #[serde(default)]
    sources: Vec<Option<String>>,
}

/// Runs the configured program once per question.
#[derive(Debug, Clone)]
pub struct ScriptAnswerProvider {
    config: AnswerConfig,
}

impl ScriptAnswerProvider {
    pub fn new(config: AnswerConfig) -> Self {
        Self { config }
    }

    async fn run(&self, question: &str) -> Result<Answer> {
        let mut cmd = tokio::process::Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .arg(question)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        if !self.config.api_key.is_empty() {
            cmd.env(ENV_LLM_API_KEY, &self.config.api_key);
        }

        let output = if self.config.timeout_secs == 0 {
            cmd.output().await
        } else {
            tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), cmd.output())
                .await
                .map_err(|_| {
                    CompanionError::Answer(format!(
                        "answer process timed out after {}s",
                        self.config.timeout_secs
                    ))
                })?
        }
        .map_err(|e| CompanionError::Answer(format!("failed to spawn answer process: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CompanionError::Answer(format!(
                "answer process exited with {}: {}",
                output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_owned(), |c| c.to_string()),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_answer(&stdout)
    }
}

#[async_trait]
impl AnswerProvider for ScriptAnswerProvider {
    async fn ask(&self, question: &str) -> Answer {
        let started = Instant::now();
        match self.run(question).await {
            Ok(answer) => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    sources = answer.sources.len(),
                    "answer ready"
                );
                answer
            }
            Err(e) => {
                warn!(error = %e, "answer backend failed, using fallback");
                Answer::fallback()
            }
        }
    }
}

/// Parse the answer document from process stdout.
///
/// The whole output is tried first. Scripts that print diagnostics before
/// the document are handled by trying each line that opens a JSON object,
/// last one first.
pub fn parse_answer(stdout: &str) -> Result<Answer> {
    let trimmed = stdout.trim();
    if let Ok(payload) = serde_json::from_str::<AnswerPayload>(trimmed) {
        return Ok(payload.into());
    }

    let starts: Vec<usize> = trimmed
        .match_indices('\n')
        .map(|(i, _)| i + 1)
        .filter(|&i| trimmed[i..].trim_start().starts_with('{'))
        .collect();

    for start in starts.into_iter().rev() {
        let mut stream =
            serde_json::Deserializer::from_str(&trimmed[start..]).into_iter::<AnswerPayload>();
        if let Some(Ok(payload)) = stream.next() {
            debug!(offset = start, "answer document found after leading output");
            return Ok(payload.into());
        }
    }

    Err(CompanionError::Answer(
        "answer process printed no answer document".to_owned(),
    ))
}

impl From<AnswerPayload> for Answer {
    fn from(payload: AnswerPayload) -> Self {
        Self {
            response: payload.response,
            sources: payload.sources.into_iter().flatten().collect(),
        }
    }
}
