//! Error types for the companion backend.

/// Top-level error type for the chat and media pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CompanionError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Answer backend error (only surfaced by helpers; `ask` itself recovers).
    #[error("answer error: {0}")]
    Answer(String),

    /// Text-to-speech synthesis error.
    #[error("TTS error: {0}")]
    Tts(String),

    /// Compressed → uncompressed audio conversion error.
    #[error("conversion error: {0}")]
    Convert(String),

    /// Phoneme / mouth-cue extraction error.
    #[error("lip-sync error: {0}")]
    LipSync(String),

    /// Pipeline orchestration error (artifact read-back, assembly).
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// External command-line tool failed to run or exited unsuccessfully.
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CompanionError>;
