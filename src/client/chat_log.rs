//! Append-only transcript of the conversation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Ai,
}

impl Speaker {
    fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Ai => "AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub from: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    entries: Vec<LogEntry>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, from: Speaker, text: impl Into<String>) {
        self.entries.push(LogEntry {
            from,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain-text export: `You: ...` / `AI: ...` entries separated by a
    /// blank line. `None` when nothing has been said yet.
    pub fn export_text(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{}: {}", e.from.label(), e.text))
            .collect();
        Some(lines.join("\n\n"))
    }
}
