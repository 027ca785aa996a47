//! One conversation against a running companion server.

use super::{ChatLog, ClientError, PlaybackQueue, Speaker};
use crate::message::{ChatRequest, ChatResponse, Message};
use tracing::{debug, warn};

/// Logged as the AI's turn when a reply cannot be fetched.
pub const FETCH_FAILURE_TEXT: &str = "Sorry, I couldn't respond.";

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug)]
pub struct ChatSession {
    http: reqwest::Client,
    base_url: String,
    log: ChatLog,
    queue: PlaybackQueue,
    loading: bool,
}

impl ChatSession {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            log: ChatLog::new(),
            queue: PlaybackQueue::new(),
            loading: false,
        }
    }

    /// Send `text` and queue the reply.
    ///
    /// The user's turn is logged before the request goes out. On failure the
    /// log gets [`FETCH_FAILURE_TEXT`] and the queue is left as it was.
    /// Returns the number of messages queued.
    ///
    /// # Errors
    ///
    /// [`ClientError::Busy`] while a reply is loading or a message is still
    /// current; otherwise the transport or decoding failure.
    pub async fn send(&mut self, text: &str) -> Result<usize, ClientError> {
        if self.is_busy() {
            return Err(ClientError::Busy);
        }

        self.log.push(Speaker::User, text);
        self.loading = true;
        let result = self.fetch(text).await;
        self.loading = false;

        match result {
            Ok(response) => {
                let count = response.ai_messages.len();
                for message in &response.ai_messages {
                    self.log.push(Speaker::Ai, message.text.clone());
                }
                self.queue.enqueue(response.ai_messages);
                debug!(count, queued = self.queue.len(), "queued reply");
                Ok(count)
            }
            Err(e) => {
                warn!("chat request failed: {e}");
                self.log.push(Speaker::Ai, FETCH_FAILURE_TEXT);
                Err(e)
            }
        }
    }

    async fn fetch(&self, text: &str) -> Result<ChatResponse, ClientError> {
        let body = ChatRequest {
            message: Some(text.to_owned()),
        };
        let response = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Loading a reply, or a message is still playing.
    pub fn is_busy(&self) -> bool {
        self.loading || self.queue.current().is_some()
    }

    pub fn current(&self) -> Option<&Message> {
        self.queue.current()
    }

    /// The current message finished playing.
    pub fn message_played(&mut self) -> Option<Message> {
        self.queue.message_finished()
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    /// Drop every queued message.
    pub fn stop(&mut self) {
        self.queue.reset();
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }
}
