//! Utterance classifier.
//!
//! A bag-of-keywords scorer: no stemming, no model, no state. Given one
//! speaker turn and its position in the conversation it produces the four
//! signal tags (sentiment, topics, friction, key moment). Pure function of
//! the lexicon and the input, so identical input always reproduces identical
//! output.

use crate::lexicon::Lexicon;
use crate::types::{AnalyzedUtterance, Sentiment, Utterance};

/// Base magnitude of a non-neutral score.
const SCORE_BASE: f64 = 0.5;
/// Added per matched polarity keyword occurrence.
const SCORE_STEP: f64 = 0.2;
/// Scores never leave (-0.9, 0.9) no matter how many keywords match.
const SCORE_CAP: f64 = 0.9;

/// Classify one utterance.
///
/// Sentiment: let `p` and `n` be the positive and negative occurrence
/// counts. `p > n` scores `min(0.9, 0.5 + 0.2p)`; `n > p` scores
/// `max(-0.9, -0.5 - 0.2n)`; ties are neutral at 0.0. Repeated occurrences
/// of the same keyword accumulate.
///
/// Topics: a topic matches when any of its keywords appears as a substring
/// of the lowercased text; every match is kept.
///
/// Friction: negative sentiment, or any friction-indicator phrase present
/// regardless of sentiment.
///
/// Key moment: first or last turn of the conversation, or any pivotal
/// phrase present.
///
/// Empty or whitespace-only text degrades to neutral with no tags; it is
/// not an error.
pub fn classify(
    lexicon: &Lexicon,
    utterance: &Utterance,
    position: usize,
    total_count: usize,
) -> AnalyzedUtterance {
    let lower = utterance.text.to_lowercase();
    let boundary_turn = position == 0 || position + 1 == total_count;

    if lower.trim().is_empty() {
        return AnalyzedUtterance {
            utterance: utterance.clone(),
            sentiment: Sentiment::Neutral,
            sentiment_score: 0.0,
            topics: Vec::new(),
            friction_detected: false,
            key_moment: false,
        };
    }

    let (sentiment, sentiment_score) = score_sentiment(lexicon, &lower);

    let topics: Vec<String> = lexicon
        .topics
        .iter()
        .filter(|t| t.keywords.iter().any(|k| lower.contains(k.as_str())))
        .map(|t| t.id.clone())
        .collect();

    let friction_detected =
        sentiment == Sentiment::Negative || !lexicon.matched_indicators(&lower).is_empty();

    let key_moment =
        boundary_turn || lexicon.pivotal.iter().any(|p| lower.contains(p.as_str()));

    AnalyzedUtterance {
        utterance: utterance.clone(),
        sentiment,
        sentiment_score,
        topics,
        friction_detected,
        key_moment,
    }
}

fn score_sentiment(lexicon: &Lexicon, lower: &str) -> (Sentiment, f64) {
    let p = occurrence_count(lower, &lexicon.positive);
    let n = occurrence_count(lower, &lexicon.negative);

    if p > n {
        (
            Sentiment::Positive,
            (SCORE_BASE + SCORE_STEP * p as f64).min(SCORE_CAP),
        )
    } else if n > p {
        (
            Sentiment::Negative,
            (-SCORE_BASE - SCORE_STEP * n as f64).max(-SCORE_CAP),
        )
    } else {
        (Sentiment::Neutral, 0.0)
    }
}

/// Total occurrences of every keyword in the text. Overlapping keywords and
/// repeated occurrences both count; ties resolve at the caller.
fn occurrence_count(lower: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .map(|k| lower.matches(k.as_str()).count())
        .sum()
}
