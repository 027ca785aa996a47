//! Wire types shared by the server and the client.
//!
//! Field and variant names follow the front-end's JSON contract
//! (`facialExpression`, `Talking_1`, `userPrompt`, ...).

use serde::{Deserialize, Serialize};

/// Avatar facial expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacialExpression {
    Smile,
    Sad,
    Angry,
    Surprised,
    FunnyFace,
    #[default]
    Default,
}

/// Avatar body animation clip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    #[serde(rename = "Talking_0")]
    Talking0,
    #[serde(rename = "Talking_1")]
    Talking1,
    #[serde(rename = "Talking_2")]
    Talking2,
    Crying,
    Laughing,
    Rumba,
    #[default]
    Idle,
    Terrified,
    Angry,
}

/// One spoken avatar message.
///
/// `audio` and `lipsync` are filled in by the media pipeline; scripted
/// replies carry pre-rendered values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Position in the outgoing batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub text: String,
    #[serde(default)]
    pub facial_expression: FacialExpression,
    #[serde(default)]
    pub animation: Animation,
    /// Base64-encoded audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Mouth-cue transcript, passed through as produced by the extractor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lipsync: Option<serde_json::Value>,
}

impl Message {
    /// A message with text, expression and animation but no media yet.
    pub fn new(
        text: impl Into<String>,
        facial_expression: FacialExpression,
        animation: Animation,
    ) -> Self {
        Self {
            index: None,
            text: text.into(),
            facial_expression,
            animation,
            audio: None,
            lipsync: None,
        }
    }

    /// Set the batch position.
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Whether both audio and lip-sync data are attached.
    pub fn has_media(&self) -> bool {
        self.audio.as_deref().is_some_and(|a| !a.is_empty()) && self.lipsync.is_some()
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// The user's message, echoed back.
    pub user_prompt: String,
    pub ai_messages: Vec<Message>,
    /// Answer citations, only present when the server exposes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}
