//! Configuration types for the companion backend.
//!
//! Everything the server needs is carried by an explicit [`CompanionConfig`]
//! that is passed into the constructors of the answer provider, the speech
//! synthesizer and the media pipeline. Nothing is read from process-global
//! state after startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the completion backend API key.
pub const ENV_LLM_API_KEY: &str = "LLM_API_KEY";
/// Environment variable holding the speech backend API key.
pub const ENV_TTS_API_KEY: &str = "TTS_API_KEY";
/// Legacy name accepted for the speech backend API key.
pub const ENV_ELEVEN_LABS_API_KEY: &str = "ELEVEN_LABS_API_KEY";
/// Environment variable overriding the synthesis voice.
pub const ENV_VOICE_ID: &str = "VOICE_ID";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Answer backend process settings.
    pub answer: AnswerConfig,
    /// Text-to-speech provider settings.
    pub tts: TtsConfig,
    /// External tool locations and limits.
    pub tools: ToolsConfig,
    /// Conversion and mouth-cue backend selection.
    pub lipsync: LipSyncConfig,
    /// Artifact handling for the media pipeline.
    pub pipeline: PipelineConfig,
    /// Pre-rendered scripted replies.
    pub scripts: ScriptsConfig,
    /// Chat endpoint behaviour.
    pub chat: ChatConfig,
    /// Client caption timing.
    pub captions: CaptionConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` = auto-assign).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Answer backend configuration.
///
/// The backend is an external program that receives the user's question as
/// its last argument and prints `{"response": ..., "sources": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Program to execute (e.g. a virtualenv's python).
    pub program: PathBuf,
    /// Arguments placed before the query (e.g. the script path).
    pub args: Vec<String>,
    /// Working directory for the process (`None` = inherit).
    pub working_dir: Option<PathBuf>,
    /// Completion backend key, exported to the child as `LLM_API_KEY`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Seconds before the process is abandoned (`0` = no limit).
    pub timeout_secs: u64,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("python3"),
            args: vec!["langchain-rag-tutorial/query_data.py".to_owned()],
            working_dir: None,
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

/// Text-to-speech provider configuration (ElevenLabs-compatible REST API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Provider base URL, without the `/v1` suffix.
    pub api_url: String,
    /// Provider API key. Empty means "not configured".
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Voice used for every synthesized message.
    pub voice_id: String,
    /// Synthesis model identifier.
    pub model_id: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.elevenlabs.io".to_owned(),
            api_key: String::new(),
            voice_id: "9BWtsMINqrJLrRacOk9x".to_owned(),
            model_id: "eleven_multilingual_v2".to_owned(),
        }
    }
}

impl TtsConfig {
    /// Whether an API key has been supplied.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// External tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// `ffmpeg` executable.
    pub ffmpeg: PathBuf,
    /// `rhubarb` lip-sync executable.
    pub rhubarb: PathBuf,
    /// Seconds before a tool invocation is killed (`0` = no limit).
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            rhubarb: PathBuf::from("rhubarb"),
            timeout_secs: 120,
        }
    }
}

/// How compressed audio becomes WAV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterBackend {
    /// Spawn `ffmpeg`.
    #[default]
    Ffmpeg,
    /// Decode in-process with symphonia.
    Symphonia,
}

/// How mouth cues are produced from WAV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorBackend {
    /// Spawn Rhubarb Lip Sync.
    #[default]
    Rhubarb,
    /// Estimate cues in-process from the dialog text and audio duration.
    Estimate,
}

/// Rhubarb recognizer selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Recognizer {
    /// Language-independent, faster, less accurate.
    #[default]
    Phonetic,
    /// English speech recognition.
    PocketSphinx,
}

impl Recognizer {
    /// Value passed to rhubarb's `-r` flag.
    pub fn as_arg(self) -> &'static str {
        match self {
            Self::Phonetic => "phonetic",
            Self::PocketSphinx => "pocketSphinx",
        }
    }
}

/// Lip-sync stage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncConfig {
    pub converter: ConverterBackend,
    pub extractor: ExtractorBackend,
    pub recognizer: Recognizer,
    /// Hand the message text to rhubarb as a dialog file.
    pub use_dialog: bool,
}

/// Media pipeline artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root directory; each request gets its own sub-directory.
    pub artifact_dir: PathBuf,
    /// Keep per-request artifacts after the response is assembled.
    pub keep_artifacts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("audios"),
            keep_artifacts: false,
        }
    }
}

/// Location of the pre-rendered scripted replies (`intro_*`, `api_*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    pub dir: PathBuf,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("audios"),
        }
    }
}

/// How facial expression and animation are chosen for generated messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionMode {
    /// Always `smile` / `Talking_1`.
    #[default]
    Fixed,
    /// Derived from a keyword sentiment scan of the answer.
    Sentiment,
}

/// Chat endpoint configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub expression_mode: ExpressionMode,
    /// Include the answer's `sources` in the response body.
    pub expose_sources: bool,
    /// Answer with the API-key reminder script instead of calling the answer
    /// backend when the speech provider has no key. Off: a missing key fails
    /// at synthesis.
    pub key_reminder: bool,
}

/// Caption reveal timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Delay between successive caption lines, and the lifetime of a
    /// single-line caption.
    pub line_interval_ms: u64,
    /// Delay between line exhaustion and clearing a multi-line caption.
    pub trailing_delay_ms: u64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            line_interval_ms: 60_000,
            trailing_delay_ms: 1_000,
        }
    }
}

impl CompanionConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::CompanionError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// API keys are never written out.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut redacted = self.clone();
        redacted.answer.api_key.clear();
        redacted.tts.api_key.clear();
        let content = toml::to_string_pretty(&redacted)
            .map_err(|e| crate::error::CompanionError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/orflax/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("orflax").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("/tmp/orflax-config/config.toml"))
    }

    /// Overlay `LLM_API_KEY`, `TTS_API_KEY` (or `ELEVEN_LABS_API_KEY`) and
    /// `VOICE_ID` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Overlay values produced by `lookup`. Blank values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_LLM_API_KEY) {
            self.answer.api_key = key;
        }
        if let Some(key) = get(ENV_TTS_API_KEY).or_else(|| get(ENV_ELEVEN_LABS_API_KEY)) {
            self.tts.api_key = key;
        }
        if let Some(voice) = get(ENV_VOICE_ID) {
            self.tts.voice_id = voice;
        }
    }

    /// Check values that would otherwise fail deep inside a request.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::Config`](crate::error::CompanionError::Config)
    /// describing the first invalid field.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::CompanionError;

        if self.answer.program.as_os_str().is_empty() {
            return Err(CompanionError::Config("answer.program is empty".to_owned()));
        }
        if self.tts.api_url.trim().is_empty() {
            return Err(CompanionError::Config("tts.api_url is empty".to_owned()));
        }
        if self.tts.voice_id.trim().is_empty() {
            return Err(CompanionError::Config("tts.voice_id is empty".to_owned()));
        }
        if self.lipsync.converter == ConverterBackend::Ffmpeg
            && self.tools.ffmpeg.as_os_str().is_empty()
        {
            return Err(CompanionError::Config("tools.ffmpeg is empty".to_owned()));
        }
        if self.lipsync.extractor == ExtractorBackend::Rhubarb
            && self.tools.rhubarb.as_os_str().is_empty()
        {
            return Err(CompanionError::Config("tools.rhubarb is empty".to_owned()));
        }
        if self.captions.line_interval_ms == 0 {
            return Err(CompanionError::Config(
                "captions.line_interval_ms must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
