//! In-process mouth-cue estimation.

use super::{PhonemeExtractor, transcript_path_for};
use crate::error::{CompanionError, Result};
use crate::viseme::text_to_mouth_cues;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes a Rhubarb-format transcript estimated from the dialog text and
/// the WAV's duration. No external binary is needed; accuracy is lower.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedLipSync;

/// Duration of a WAV file in seconds.
fn wav_duration_secs(path: &Path) -> Result<f64> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| CompanionError::LipSync(format!("cannot read {}: {e}", path.display())))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(CompanionError::LipSync("WAV has zero sample rate".to_owned()));
    }
    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

#[async_trait]
impl PhonemeExtractor for EstimatedLipSync {
    async fn extract(&self, wav: &Path, dialog: &str) -> Result<PathBuf> {
        let wav_owned = wav.to_path_buf();
        let duration = tokio::task::spawn_blocking(move || wav_duration_secs(&wav_owned))
            .await
            .map_err(|e| CompanionError::LipSync(format!("duration task failed: {e}")))??;

        let cues = text_to_mouth_cues(dialog, duration);
        let transcript = serde_json::json!({
            "metadata": {
                "soundFile": wav.display().to_string(),
                "duration": duration,
            },
            "mouthCues": cues,
        });

        let output = transcript_path_for(wav);
        tokio::fs::write(&output, serde_json::to_vec_pretty(&transcript)?).await?;
        tracing::debug!(
            path = %output.display(),
            cues = cues.len(),
            duration,
            "estimated mouth cues"
        );
        Ok(output)
    }
}
