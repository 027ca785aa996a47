//! Pre-rendered replies that never touch the answer or speech backends.
//!
//! Each script line has a WAV and a mouth-cue JSON asset named after it
//! (`intro_0.wav`, `intro_0.json`, ...) in the scripts directory. Assets are
//! read once at startup; a missing asset leaves that line without media and
//! is logged, it never fails the server.

use crate::message::{Animation, FacialExpression, Message};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use tracing::{debug, warn};

struct ScriptLine {
    asset: &'static str,
    text: &'static str,
    facial_expression: FacialExpression,
    animation: Animation,
}

const INTRO: &[ScriptLine] = &[
    ScriptLine {
        asset: "intro_0",
        text: "Hey dear... How was your day?",
        facial_expression: FacialExpression::Smile,
        animation: Animation::Talking1,
    },
    ScriptLine {
        asset: "intro_1",
        text: "I missed you so much... Please don't go for so long!",
        facial_expression: FacialExpression::Angry,
        animation: Animation::Angry,
    },
];

const MISSING_KEYS: &[ScriptLine] = &[
    ScriptLine {
        asset: "api_0",
        text: "Please my dear, don't forget to add your API keys!",
        facial_expression: FacialExpression::Angry,
        animation: Animation::Angry,
    },
    ScriptLine {
        asset: "api_1",
        text: "You don't want to ruin Wawa Sensei with a crazy ChatGPT and ElevenLabs bill, right?",
        facial_expression: FacialExpression::Smile,
        animation: Animation::Laughing,
    },
];

/// The scripted introduction and the missing-credentials reminder.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedReplies {
    intro: Vec<Message>,
    missing_keys: Vec<Message>,
}

impl ScriptedReplies {
    /// Load both scripts' assets from `dir`.
    pub async fn load(dir: &Path) -> Self {
        Self {
            intro: load_script(dir, INTRO).await,
            missing_keys: load_script(dir, MISSING_KEYS).await,
        }
    }

    /// Greeting sent when the user message is empty.
    pub fn intro(&self) -> Vec<Message> {
        self.intro.clone()
    }

    /// Reminder sent when the speech backend has no API key.
    pub fn missing_keys(&self) -> Vec<Message> {
        self.missing_keys.clone()
    }
}

async fn load_script(dir: &Path, lines: &[ScriptLine]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let mut message =
            Message::new(line.text, line.facial_expression, line.animation).with_index(index);
        message.audio = read_audio(dir, line.asset).await;
        message.lipsync = read_transcript(dir, line.asset).await;
        messages.push(message);
    }
    messages
}

async fn read_audio(dir: &Path, asset: &str) -> Option<String> {
    let path = dir.join(format!("{asset}.wav"));
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!(path = %path.display(), bytes = bytes.len(), "loaded scripted audio");
            Some(STANDARD.encode(bytes))
        }
        Err(e) => {
            warn!(path = %path.display(), "scripted audio unavailable: {e}");
            None
        }
    }
}

async fn read_transcript(dir: &Path, asset: &str) -> Option<serde_json::Value> {
    let path = dir.join(format!("{asset}.json"));
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "scripted lip sync unavailable: {e}");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), "scripted lip sync is not valid JSON: {e}");
            None
        }
    }
}
