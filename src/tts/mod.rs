//! Text-to-speech synthesis.
//!
//! The pipeline only needs two things from a speech backend: write the
//! compressed audio for a piece of text to a path, and list the voices the
//! account can use. [`ElevenLabsTts`] talks to the ElevenLabs REST API.

mod elevenlabs;

pub use elevenlabs::ElevenLabsTts;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Speech synthesis backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice_id` and write compressed audio to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request or the file cannot
    /// be written.
    async fn synthesize(&self, text: &str, voice_id: &str, out: &Path) -> Result<()>;

    /// The provider's voice list, passed through unchanged.
    async fn voices(&self) -> Result<serde_json::Value>;

    /// Whether the backend has credentials to work with.
    fn is_configured(&self) -> bool {
        true
    }
}
