//! Heuristic mood classifier for avatar expression.
//!
//! Maps answer text to a [`FacialExpression`] / [`Animation`] pair. Two
//! classification layers:
//!
//! 1. **Explicit tag**: the answer backend can prefix a response with
//!    `[mood:playful]` for deterministic classification. The tag is stripped
//!    before the text is spoken.
//! 2. **Keyword heuristic**: pattern scan over the lower-cased text.
//!
//! Anything below [`CONFIDENCE_THRESHOLD`] keeps the neutral pairing
//! (`smile` / `Talking_1`).

use crate::message::{Animation, FacialExpression};

/// Result of mood classification.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodResult {
    /// One of [`KNOWN_MOODS`].
    pub mood: &'static str,
    pub facial_expression: FacialExpression,
    pub animation: Animation,
    /// Classification confidence in the range `0.0..=1.0`.
    pub confidence: f32,
}

/// Minimum confidence required to move away from the neutral pairing.
pub const CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Expression and animation used when nothing is detected.
pub const NEUTRAL: (FacialExpression, Animation) = (FacialExpression::Smile, Animation::Talking1);

// ── Keyword tables ──────────────────────────────────────────────────────

/// (mood, keywords, expression, animation)
const MOOD_TABLE: &[(&str, &[&str], FacialExpression, Animation)] = &[
    (
        "delight",
        &[
            "great",
            "wonderful",
            "exciting",
            "love",
            "fantastic",
            "amazing",
            "excellent",
            "awesome",
            "brilliant",
            "glad",
        ],
        FacialExpression::Smile,
        Animation::Talking2,
    ),
    (
        "playful",
        &[
            "haha", "fun", "joke", "silly", "laugh", "pun", "goofy", "playful", "cheeky", "lol",
        ],
        FacialExpression::FunnyFace,
        Animation::Laughing,
    ),
    (
        "sadness",
        &[
            "sorry to hear",
            "unfortunately",
            "sad",
            "miss you",
            "loss",
            "regret",
            "heartbroken",
            "lonely",
            "grief",
            "tragic",
        ],
        FacialExpression::Sad,
        Animation::Crying,
    ),
    (
        "anger",
        &[
            "angry",
            "furious",
            "unacceptable",
            "annoyed",
            "outrageous",
            "how dare",
            "frustrating",
            "ridiculous",
            "stop it",
            "mad at",
        ],
        FacialExpression::Angry,
        Animation::Angry,
    ),
    (
        "surprise",
        &[
            "wow",
            "surprising",
            "unexpected",
            "incredible",
            "no way",
            "believe it",
            "astonishing",
            "suddenly",
            "whoa",
            "really?",
        ],
        FacialExpression::Surprised,
        Animation::Talking0,
    ),
    (
        "fear",
        &[
            "scary",
            "afraid",
            "danger",
            "terrifying",
            "frightening",
            "warning",
            "panic",
            "nightmare",
            "horror",
            "be careful",
        ],
        FacialExpression::Surprised,
        Animation::Terrified,
    ),
];

/// Known moods, including `neutral`.
pub const KNOWN_MOODS: &[&str] = &[
    "neutral", "delight", "playful", "sadness", "anger", "surprise", "fear",
];

/// Classify the mood of answer text.
///
/// # Priority
///
/// 1. Explicit `[mood:X]` tag at the start of the text → confidence 1.0.
/// 2. Keyword heuristic scan → confidence proportional to match count.
/// 3. Fallback → `neutral` with confidence 0.0.
pub fn classify(text: &str) -> MoodResult {
    if let Some((_, mood)) = strip_mood_tag(text) {
        return result_for(mood, 1.0);
    }

    let lower = text.to_lowercase();

    let mut best_mood = "neutral";
    let mut best_score: usize = 0;

    for &(mood, keywords, _, _) in MOOD_TABLE {
        let score = keywords.iter().filter(|kw| lower.contains(*kw)).count();
        if score > best_score {
            best_score = score;
            best_mood = mood;
        }
    }

    // 1 hit → 0.35, 2 → 0.55, 3 → 0.70, 4+ → capped at 0.90.
    let confidence = match best_score {
        0 => 0.0,
        1 => 0.35,
        2 => 0.55,
        3 => 0.70,
        _ => (0.70 + 0.05 * (best_score as f32 - 3.0)).min(0.90),
    };

    result_for(best_mood, confidence)
}

/// Pick expression and animation for `text`, falling back to [`NEUTRAL`]
/// below the confidence threshold.
pub fn expression_for(text: &str) -> (FacialExpression, Animation) {
    let result = classify(text);
    if result.confidence >= CONFIDENCE_THRESHOLD {
        (result.facial_expression, result.animation)
    } else {
        NEUTRAL
    }
}

/// Strip an explicit `[mood:X]` tag from the start of the text, returning
/// the remaining text and the mood.
///
/// Returns `None` if no tag is found or the mood is unknown.
pub fn strip_mood_tag(text: &str) -> Option<(&str, &'static str)> {
    let trimmed = text.trim_start();
    let rest = trimmed.strip_prefix("[mood:")?;
    let end = rest.find(']')?;
    let mood = KNOWN_MOODS.iter().find(|m| **m == &rest[..end])?;
    Some((rest[end + 1..].trim_start(), *mood))
}

fn result_for(mood: &'static str, confidence: f32) -> MoodResult {
    let (facial_expression, animation) = MOOD_TABLE
        .iter()
        .find(|(m, _, _, _)| *m == mood)
        .map(|&(_, _, e, a)| (e, a))
        .unwrap_or(NEUTRAL);
    MoodResult {
        mood,
        facial_expression,
        animation,
        confidence,
    }
}
