//! Mouth-shape mapping for lip-sync animation.
//!
//! The avatar front-end consumes Rhubarb Lip Sync's nine mouth shapes
//! (`A`–`H` plus `X` for rest). This module estimates a cue track for a
//! piece of text spread over a known audio duration, for use when the
//! Rhubarb binary is not available.

use serde::Serialize;

/// Rhubarb mouth shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MouthShape {
    /// Closed lips (P, B, M).
    A,
    /// Slightly open, clenched teeth (most consonants, EE).
    B,
    /// Open (EH, AE).
    C,
    /// Wide open (AA).
    D,
    /// Slightly rounded (AO, ER).
    E,
    /// Puckered (UW, OW, W).
    F,
    /// Teeth on lower lip (F, V).
    G,
    /// Tongue raised (L).
    H,
    /// Rest.
    X,
}

/// One entry of a Rhubarb `mouthCues` array. Times in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MouthCue {
    pub start: f64,
    pub end: f64,
    pub value: MouthShape,
}

/// Map a single character to a mouth shape and a relative duration weight.
///
/// Returns `None` for characters that do not move the mouth (spaces,
/// digits, symbols). Sentence punctuation maps to a rest pause.
fn char_to_shape(c: char) -> Option<(MouthShape, f64)> {
    // Vowels are held longer than consonants.
    const VOWEL: f64 = 1.5;
    const CONSONANT: f64 = 0.8;
    const PAUSE: f64 = 2.0;

    let shape = match c.to_ascii_lowercase() {
        'm' | 'b' | 'p' => (MouthShape::A, CONSONANT),
        'f' | 'v' => (MouthShape::G, CONSONANT),
        'l' => (MouthShape::H, CONSONANT),
        'a' => (MouthShape::D, VOWEL),
        'e' => (MouthShape::C, VOWEL),
        'i' | 'y' => (MouthShape::B, VOWEL),
        'o' | 'r' => (MouthShape::E, VOWEL),
        'u' | 'w' => (MouthShape::F, VOWEL),
        '.' | ',' | '!' | '?' | ';' | ':' | '\n' => (MouthShape::X, PAUSE),
        c if c.is_ascii_alphabetic() => (MouthShape::B, CONSONANT),
        c if c.is_alphabetic() => (MouthShape::C, 1.0),
        _ => return None,
    };
    Some(shape)
}

/// Share of the audio reserved for the closing rest cue.
const TRAILING_REST_SHARE: f64 = 0.05;

/// Estimate a contiguous cue track for `text` spoken over `duration_secs`.
///
/// Cues start at `0.0`, end at `duration_secs`, never overlap, and adjacent
/// cues always differ in shape. Times are rounded to centiseconds like
/// Rhubarb's own output.
pub fn text_to_mouth_cues(text: &str, duration_secs: f64) -> Vec<MouthCue> {
    let duration = round_cs(duration_secs.max(0.0));
    if duration <= 0.0 {
        return Vec::new();
    }

    let units: Vec<(MouthShape, f64)> = text.chars().filter_map(char_to_shape).collect();
    let total_weight: f64 = units.iter().map(|(_, w)| w).sum();
    if units.iter().all(|(s, _)| *s == MouthShape::X) || total_weight <= 0.0 {
        return vec![MouthCue {
            start: 0.0,
            end: duration,
            value: MouthShape::X,
        }];
    }

    let speech_span = duration * (1.0 - TRAILING_REST_SHARE);
    let per_weight = speech_span / total_weight;

    let mut cues: Vec<MouthCue> = Vec::new();
    let mut cursor = 0.0;
    for (shape, weight) in units {
        let end = cursor + weight * per_weight;
        push_merged(&mut cues, shape, cursor, end);
        cursor = end;
    }
    push_merged(&mut cues, MouthShape::X, cursor, duration);

    // Rounding can collapse very short cues; drop those and re-stitch.
    let mut rounded: Vec<MouthCue> = Vec::with_capacity(cues.len());
    for cue in cues {
        let start = rounded.last().map_or(0.0, |c| c.end);
        let end = round_cs(cue.end).min(duration);
        if end <= start {
            continue;
        }
        push_merged(&mut rounded, cue.value, start, end);
    }
    if let Some(last) = rounded.last_mut() {
        last.end = duration;
    }
    rounded
}

/// Append a cue, extending the previous one when the shape repeats.
fn push_merged(cues: &mut Vec<MouthCue>, value: MouthShape, start: f64, end: f64) {
    if let Some(last) = cues.last_mut()
        && last.value == value
    {
        last.end = end;
        return;
    }
    cues.push(MouthCue { start, end, value });
}

fn round_cs(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
