//! ElevenLabs REST client.

use super::SpeechSynthesizer;
use crate::config::TtsConfig;
use crate::error::{CompanionError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Speech synthesis through the ElevenLabs text-to-speech endpoint.
pub struct ElevenLabsTts {
    config: TtsConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for ElevenLabsTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsTts")
            .field("api_url", &self.config.api_url)
            .field("voice_id", &self.config.voice_id)
            .field("model_id", &self.config.model_id)
            .field("has_api_key", &self.config.has_api_key())
            .finish()
    }
}

impl ElevenLabsTts {
    pub fn new(config: TtsConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.config.api_url.trim_end_matches('/');
        let base = base.strip_suffix("/v1").unwrap_or(base);
        format!("{base}/v1/{path}")
    }

    fn map_http_error(status: reqwest::StatusCode, body: &str) -> CompanionError {
        let message = extract_error_message(body);
        match status.as_u16() {
            401 => CompanionError::Tts(format!("authentication failed: {message}")),
            429 => CompanionError::Tts(format!("rate limited: {message}")),
            code => CompanionError::Tts(format!("HTTP {code}: {message}")),
        }
    }
}

/// Pull a readable message out of an error body.
///
/// ElevenLabs reports `{"detail": {"message": ...}}` or `{"detail": "..."}`.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            let detail = v.get("detail")?;
            detail
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| detail.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTts {
    async fn synthesize(&self, text: &str, voice_id: &str, out: &Path) -> Result<()> {
        let started = Instant::now();
        let url = self.endpoint(&format!("text-to-speech/{voice_id}"));
        let body = serde_json::json!({
            "text": text,
            "model_id": self.config.model_id,
        });

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| CompanionError::Tts(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body_text));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| CompanionError::Tts(format!("failed to read audio body: {e}")))?;
        if audio.is_empty() {
            return Err(CompanionError::Tts("provider returned empty audio".to_owned()));
        }

        tokio::fs::write(out, &audio).await?;
        debug!(path = %out.display(), bytes = audio.len(), "audio written");
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = text.chars().count(),
            "speech synthesized"
        );
        Ok(())
    }

    async fn voices(&self) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(self.endpoint("voices"))
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| CompanionError::Tts(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body_text));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| CompanionError::Tts(format!("invalid voices payload: {e}")))
    }

    fn is_configured(&self) -> bool {
        self.config.has_api_key()
    }
}
