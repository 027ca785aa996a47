//! Orflax: chat backend for a talking 3D avatar.
//!
//! A chat turn is answered by an external retrieval process, spoken by a
//! text-to-speech provider, converted to WAV and analysed into timed mouth
//! shapes, then returned to the avatar as one JSON document:
//!
//! Question → Answer → TTS (mp3) → WAV → mouth cues → `{userPrompt, aiMessages}`
//!
//! # Architecture
//!
//! - **Answer**: [`answer::ScriptAnswerProvider`] runs a program per question
//! - **TTS**: [`tts::ElevenLabsTts`] behind [`tts::SpeechSynthesizer`]
//! - **Lip sync**: `ffmpeg` + `rhubarb`, or in-process symphonia decoding and
//!   text-based cue estimation, behind [`lipsync::FormatConverter`] and
//!   [`lipsync::PhonemeExtractor`]
//! - **Pipeline**: [`pipeline::MediaPipeline`] sequences the media stages
//! - **Server**: axum routes in [`server`]
//! - **Client**: playback queue, caption timer and chat session in [`client`]

pub mod answer;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod lipsync;
pub mod message;
pub mod pipeline;
pub mod scripted;
pub mod sentiment;
pub mod server;
pub mod tts;
pub mod viseme;

#[cfg(test)]
pub(crate) mod test_utils;

pub use chat::ChatService;
pub use config::CompanionConfig;
pub use error::{CompanionError, Result};
pub use message::{Animation, ChatRequest, ChatResponse, FacialExpression, Message};
pub use pipeline::MediaPipeline;
pub use server::{AppState, CompanionServer};
