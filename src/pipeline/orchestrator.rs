//! Sequences speech synthesis, conversion and mouth-cue extraction.

use super::artifacts::ArtifactWorkspace;
use crate::config::PipelineConfig;
use crate::error::{CompanionError, Result};
use crate::lipsync::{FormatConverter, PhonemeExtractor};
use crate::message::Message;
use crate::tts::SpeechSynthesizer;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Attaches base64 audio and a parsed lip-sync transcript to each message.
///
/// Messages are processed strictly one after another, and the three stages
/// of a message run in order. The first stage error aborts the whole batch.
#[derive(Clone)]
pub struct MediaPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    converter: Arc<dyn FormatConverter>,
    extractor: Arc<dyn PhonemeExtractor>,
    config: PipelineConfig,
    voice_id: String,
}

impl std::fmt::Debug for MediaPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaPipeline")
            .field("artifact_dir", &self.config.artifact_dir)
            .field("keep_artifacts", &self.config.keep_artifacts)
            .field("voice_id", &self.voice_id)
            .finish_non_exhaustive()
    }
}

impl MediaPipeline {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        converter: Arc<dyn FormatConverter>,
        extractor: Arc<dyn PhonemeExtractor>,
        config: PipelineConfig,
        voice_id: impl Into<String>,
    ) -> Self {
        Self {
            synthesizer,
            converter,
            extractor,
            config,
            voice_id: voice_id.into(),
        }
    }

    /// Run every message through the stages.
    ///
    /// Output has the input's length and order; each message gets its
    /// position as `index`.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure. No partially processed messages are
    /// returned.
    pub async fn run(&self, messages: Vec<Message>) -> Result<Vec<Message>> {
        if messages.is_empty() {
            return Ok(messages);
        }

        let workspace = ArtifactWorkspace::create(&self.config.artifact_dir).await?;
        let request_id = workspace.request_id();
        let started = Instant::now();

        let mut out = Vec::with_capacity(messages.len());
        let mut failure = None;
        for (index, message) in messages.into_iter().enumerate() {
            match self.process(&workspace, request_id, index, message).await {
                Ok(done) => out.push(done),
                Err(e) => {
                    warn!(%request_id, index, "media pipeline failed: {e}");
                    failure = Some(e);
                    break;
                }
            }
        }

        self.finish(workspace).await;

        match failure {
            Some(e) => Err(e),
            None => {
                info!(
                    %request_id,
                    messages = out.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "media pipeline done"
                );
                Ok(out)
            }
        }
    }

    async fn process(
        &self,
        workspace: &ArtifactWorkspace,
        request_id: Uuid,
        index: usize,
        message: Message,
    ) -> Result<Message> {
        let compressed = workspace.compressed_path(index);

        let t = Instant::now();
        self.synthesizer
            .synthesize(&message.text, &self.voice_id, &compressed)
            .await?;
        debug!(%request_id, index, elapsed_ms = t.elapsed().as_millis() as u64, "synthesized");

        let t = Instant::now();
        let wav = self.converter.convert(&compressed).await?;
        info!(%request_id, index, elapsed_ms = t.elapsed().as_millis() as u64, "conversion done");

        let t = Instant::now();
        let transcript = self.extractor.extract(&wav, &message.text).await?;
        info!(%request_id, index, elapsed_ms = t.elapsed().as_millis() as u64, "lip sync done");

        let audio = read_nonempty(compressed).await?;
        let lipsync: serde_json::Value = serde_json::from_slice(&read_nonempty(transcript).await?)
            .map_err(|e| CompanionError::LipSync(format!("invalid transcript: {e}")))?;

        let mut message = message.with_index(index);
        message.audio = Some(STANDARD.encode(audio));
        message.lipsync = Some(lipsync);
        Ok(message)
    }

    async fn finish(&self, workspace: ArtifactWorkspace) {
        if self.config.keep_artifacts {
            debug!(dir = %workspace.dir().display(), "keeping artifacts");
            return;
        }
        let dir = workspace.dir().to_path_buf();
        if let Err(e) = workspace.remove().await {
            warn!(dir = %dir.display(), "failed to remove artifacts: {e}");
        }
    }
}

async fn read_nonempty(path: PathBuf) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(&path).await?;
    if bytes.is_empty() {
        return Err(CompanionError::Pipeline(format!(
            "stage produced an empty file: {}",
            path.display()
        )));
    }
    Ok(bytes)
}
