//! Media pipeline: text → compressed audio → WAV → mouth cues.

pub mod artifacts;
pub mod orchestrator;

pub use artifacts::ArtifactWorkspace;
pub use orchestrator::MediaPipeline;
