//! Avatar-side conversation state.
//!
//! The playback queue and caption timer are plain values driven by the
//! caller; [`ChatSession`] ties them to the HTTP endpoint and the chat log.

pub mod caption;
pub mod chat_log;
pub mod playback;
pub mod session;

pub use caption::{CaptionState, CaptionTimer};
pub use chat_log::{ChatLog, LogEntry, Speaker};
pub use playback::{PlaybackQueue, PlaybackState};
pub use session::{ChatSession, DEFAULT_BASE_URL, FETCH_FAILURE_TEXT};

/// Client-side failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A reply is still loading or a message is still playing.
    #[error("a reply is still loading or playing")]
    Busy,

    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected chat response: {0}")]
    Decode(String),
}
