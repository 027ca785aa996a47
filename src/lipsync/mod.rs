//! Audio conversion and mouth-cue extraction stages.
//!
//! Both stages work on files and derive their output path from their input
//! path (`message_0.mp3` → `message_0.wav` → `message_0.json`), so the
//! orchestrator only has to choose the first file name.
//!
//! Process-backed implementations ([`FfmpegConverter`], [`RhubarbExtractor`])
//! and in-process ones ([`SymphoniaConverter`], [`EstimatedLipSync`]) are
//! interchangeable behind [`FormatConverter`] / [`PhonemeExtractor`].

mod decode;
mod estimate;
mod ffmpeg;
mod rhubarb;
mod tool;

pub use decode::SymphoniaConverter;
pub use estimate::EstimatedLipSync;
pub use ffmpeg::FfmpegConverter;
pub use rhubarb::RhubarbExtractor;

use crate::config::{ConverterBackend, ExtractorBackend, LipSyncConfig, ToolsConfig};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Extension of the uncompressed audio produced by conversion.
pub const WAV_EXTENSION: &str = "wav";
/// Extension of the mouth-cue transcript.
pub const TRANSCRIPT_EXTENSION: &str = "json";

/// Compressed → uncompressed audio conversion.
#[async_trait]
pub trait FormatConverter: Send + Sync {
    /// Convert `input` and return the path of the WAV sibling, overwriting
    /// any existing file.
    async fn convert(&self, input: &Path) -> Result<PathBuf>;
}

/// WAV → timed mouth-cue transcript.
#[async_trait]
pub trait PhonemeExtractor: Send + Sync {
    /// Analyse `wav` and return the path of the JSON transcript sibling.
    ///
    /// `dialog` is the text being spoken; implementations may use it as a
    /// recognition hint or ignore it.
    async fn extract(&self, wav: &Path, dialog: &str) -> Result<PathBuf>;
}

/// Path of the WAV produced from `compressed`.
pub fn wav_path_for(compressed: &Path) -> PathBuf {
    compressed.with_extension(WAV_EXTENSION)
}

/// Path of the transcript produced from `wav`.
pub fn transcript_path_for(wav: &Path) -> PathBuf {
    wav.with_extension(TRANSCRIPT_EXTENSION)
}

fn tool_timeout(tools: &ToolsConfig) -> Option<Duration> {
    (tools.timeout_secs > 0).then(|| Duration::from_secs(tools.timeout_secs))
}

/// Build the configured converter.
pub fn converter_from_config(
    lipsync: &LipSyncConfig,
    tools: &ToolsConfig,
) -> Arc<dyn FormatConverter> {
    match lipsync.converter {
        ConverterBackend::Ffmpeg => Arc::new(FfmpegConverter::new(
            tools.ffmpeg.clone(),
            tool_timeout(tools),
        )),
        ConverterBackend::Symphonia => Arc::new(SymphoniaConverter),
    }
}

/// Build the configured extractor.
pub fn extractor_from_config(
    lipsync: &LipSyncConfig,
    tools: &ToolsConfig,
) -> Arc<dyn PhonemeExtractor> {
    match lipsync.extractor {
        ExtractorBackend::Rhubarb => Arc::new(
            RhubarbExtractor::new(tools.rhubarb.clone(), tool_timeout(tools))
                .with_recognizer(lipsync.recognizer)
                .with_dialog(lipsync.use_dialog),
        ),
        ExtractorBackend::Estimate => Arc::new(EstimatedLipSync),
    }
}
