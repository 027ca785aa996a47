//! In-memory stage doubles shared by unit tests.

#![allow(clippy::expect_used)]

use crate::answer::{Answer, AnswerProvider};
use crate::error::{CompanionError, Result};
use crate::lipsync::{FormatConverter, PhonemeExtractor, transcript_path_for, wav_path_for};
use crate::tts::SpeechSynthesizer;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Writes `audio:<text>` as the "compressed" file and records each call.
#[derive(Debug, Clone, Default)]
pub struct FakeSynthesizer {
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeSynthesizer {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str, out: &Path) -> Result<()> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((text.to_owned(), voice_id.to_owned()));
        tokio::fs::write(out, format!("audio:{text}")).await?;
        Ok(())
    }

    async fn voices(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({"voices": [{"voice_id": "voice-1", "name": "Test"}]}))
    }
}

/// Copies the input to its WAV sibling; fails for inputs whose stem matches.
#[derive(Debug, Clone, Default)]
pub struct FakeConverter {
    fail_stem: Option<String>,
}

impl FakeConverter {
    pub fn failing_on(stem: &str) -> Self {
        Self {
            fail_stem: Some(stem.to_owned()),
        }
    }
}

#[async_trait]
impl FormatConverter for FakeConverter {
    async fn convert(&self, input: &Path) -> Result<PathBuf> {
        let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        if self.fail_stem.as_deref() == Some(stem) {
            return Err(CompanionError::Convert(format!("refusing {stem}")));
        }
        let out = wav_path_for(input);
        tokio::fs::copy(input, &out).await?;
        Ok(out)
    }
}

/// Writes a one-cue transcript that records the dialog text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeExtractor;

#[async_trait]
impl PhonemeExtractor for FakeExtractor {
    async fn extract(&self, wav: &Path, dialog: &str) -> Result<PathBuf> {
        let out = transcript_path_for(wav);
        let doc = serde_json::json!({
            "metadata": {"dialog": dialog},
            "mouthCues": [{"start": 0.0, "end": 0.5, "value": "X"}],
        });
        tokio::fs::write(&out, doc.to_string()).await?;
        Ok(out)
    }
}

/// Writes an empty transcript file.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyExtractor;

#[async_trait]
impl PhonemeExtractor for EmptyExtractor {
    async fn extract(&self, wav: &Path, _dialog: &str) -> Result<PathBuf> {
        let out = transcript_path_for(wav);
        tokio::fs::write(&out, b"").await?;
        Ok(out)
    }
}

/// Returns a fixed answer and counts questions.
#[derive(Debug, Clone)]
pub struct FixedAnswer {
    answer: Answer,
    questions: Arc<Mutex<Vec<String>>>,
}

impl FixedAnswer {
    pub fn new(response: &str, sources: &[&str]) -> Self {
        Self {
            answer: Answer {
                response: response.to_owned(),
                sources: sources.iter().map(|s| (*s).to_owned()).collect(),
            },
            questions: Arc::default(),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().expect("questions lock").clone()
    }
}

#[async_trait]
impl AnswerProvider for FixedAnswer {
    async fn ask(&self, question: &str) -> Answer {
        self.questions
            .lock()
            .expect("questions lock")
            .push(question.to_owned());
        self.answer.clone()
    }
}
