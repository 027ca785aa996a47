//! In-process audio conversion with symphonia.

use super::{FormatConverter, wav_path_for};
use crate::error::{CompanionError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Decodes compressed audio in-process and writes 16-bit mono WAV.
///
/// Keeps the source sample rate; rhubarb resamples internally.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaConverter;

#[async_trait]
impl FormatConverter for SymphoniaConverter {
    async fn convert(&self, input: &Path) -> Result<PathBuf> {
        let output = wav_path_for(input);
        if output == input {
            return Err(CompanionError::Convert(format!(
                "input is already a WAV file: {}",
                input.display()
            )));
        }

        let input_owned = input.to_path_buf();
        let output_owned = output.clone();
        tokio::task::spawn_blocking(move || {
            let (samples, sample_rate) = decode_audio_to_mono_f32(&input_owned)?;
            write_wav_f32_mono(&output_owned, &samples, sample_rate)
        })
        .await
        .map_err(|e| CompanionError::Convert(format!("decode task failed: {e}")))??;

        Ok(output)
    }
}

fn decode_audio_to_mono_f32(path: &Path) -> Result<(Vec<f32>, u32)> {
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::DecoderOptions;
    use symphonia::core::errors::Error as SymphError;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CompanionError::Convert(format!("failed to probe audio: {e}")))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| CompanionError::Convert("no default audio track".into()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| CompanionError::Convert("unknown sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| CompanionError::Convert(format!("failed to create decoder: {e}")))?;

    let mut out: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(CompanionError::Convert(format!("audio read error: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Corrupt frames are skipped, as players do.
            Err(SymphError::DecodeError(_)) => continue,
            Err(e) => return Err(CompanionError::Convert(format!("audio decode error: {e}"))),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let frames = decoded.frames() as u64;
        let required = usize::try_from(frames)
            .unwrap_or(usize::MAX)
            .saturating_mul(channels);

        if sample_buf.as_ref().is_none_or(|b| b.capacity() < required) {
            sample_buf = Some(SampleBuffer::<f32>::new(frames, spec));
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        let data = buf.samples();
        if channels <= 1 {
            out.extend_from_slice(data);
        } else {
            out.extend(
                data.chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }
    }

    if out.is_empty() {
        return Err(CompanionError::Convert("decoded audio is empty".into()));
    }
    Ok((out, sample_rate))
}

fn write_wav_f32_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| CompanionError::Convert(format!("failed to create wav writer: {e}")))?;

    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer
            .write_sample(v)
            .map_err(|e| CompanionError::Convert(format!("failed to write wav sample: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| CompanionError::Convert(format!("failed to finalize wav: {e}")))?;
    Ok(())
}
