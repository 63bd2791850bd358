//! Friction point extraction.
//!
//! Turns friction-flagged utterances into [`FrictionPoint`] records: barrier
//! attribution by a fixed priority order, severity from the indicator table,
//! and the unresolved-at-hangup heuristic for trailing turns.

use crate::lexicon::Lexicon;
use crate::types::{AnalyzedUtterance, BarrierType, FrictionPoint, Severity};

/// Friction inside the final turns of a call had no room to be worked, so it
/// defaults to unresolved.
const UNRESOLVED_TAIL_TURNS: usize = 2;

/// Verbatim snippets are capped for dashboard display.
const SNIPPET_MAX_CHARS: usize = 160;

/// When several indicator categories fire on one utterance, the barrier is
/// attributed by clinical > process > insurance > affordability > access >
/// support-quality.
fn barrier_priority(barrier: BarrierType) -> u8 {
    match barrier {
        BarrierType::Clinical => 5,
        BarrierType::Process => 4,
        BarrierType::Insurance => 3,
        BarrierType::Affordability => 2,
        BarrierType::Access => 1,
        BarrierType::SupportQuality => 0,
    }
}

/// One friction point per friction-flagged utterance.
pub fn extract_friction_points(
    lexicon: &Lexicon,
    conversation_id: &str,
    messages: &[AnalyzedUtterance],
) -> Vec<FrictionPoint> {
    let total = messages.len();
    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| m.friction_detected)
        .map(|(idx, m)| {
            let lower = m.utterance.text.to_lowercase();
            let matched = lexicon.matched_indicators(&lower);

            let (barrier, severity, description) = match matched
                .iter()
                .max_by_key(|i| barrier_priority(i.barrier))
            {
                Some(top) => {
                    let barrier = top.barrier;
                    // Strongest indicator within the winning barrier grades
                    // the point.
                    let severity = matched
                        .iter()
                        .filter(|i| i.barrier == barrier)
                        .map(|i| i.severity)
                        .max()
                        .unwrap_or(top.severity);
                    let description = format!(
                        "{} barrier signaled by \"{}\"",
                        barrier.label(),
                        top.phrase
                    );
                    (barrier, severity, description)
                }
                // Sentiment-only friction: no named obstacle.
                None => (
                    BarrierType::SupportQuality,
                    Severity::Low,
                    "Negative sentiment with no named obstacle".to_string(),
                ),
            };

            let in_tail = idx + UNRESOLVED_TAIL_TURNS >= total;

            FrictionPoint {
                conversation_id: conversation_id.to_string(),
                utterance_index: idx,
                barrier,
                severity,
                description,
                snippet: truncate_snippet(&m.utterance.text),
                resolved: !in_tail,
                resolution: None,
                detected_at: m.utterance.timestamp,
                resolved_at: None,
            }
        })
        .collect()
}

/// Severity weights for the 0-100 friction score. Monotone: more points or
/// higher severities never lower the score.
const SEVERITY_WEIGHTS: &[(Severity, u32)] = &[
    (Severity::Low, 10),
    (Severity::Medium, 20),
    (Severity::High, 35),
];

fn severity_weight(severity: Severity) -> u32 {
    SEVERITY_WEIGHTS
        .iter()
        .find(|(s, _)| *s == severity)
        .map(|(_, w)| *w)
        .unwrap_or(0)
}

/// Severity-weighted sum over all friction points, capped at 100.
pub fn friction_score(points: &[FrictionPoint]) -> u8 {
    let sum: u32 = points.iter().map(|p| severity_weight(p.severity)).sum();
    sum.min(100) as u8
}

fn truncate_snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    text.chars().take(SNIPPET_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::classify::classify;
    use crate::types::{SpeakerRole, Utterance};

    fn analyzed(texts: &[&str]) -> Vec<AnalyzedUtterance> {
        let lex = Lexicon::builtin();
        let total = texts.len();
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                classify(
                    &lex,
                    &Utterance {
                        speaker: SpeakerRole::Patient,
                        speaker_label: "Patient".to_string(),
                        text: t.to_string(),
                        timestamp: Utc.with_ymd_and_hms(2026, 3, 10, 14, i as u32, 0).unwrap(),
                    },
                    i,
                    total,
                )
            })
            .collect()
    }

    #[test]
    fn test_clinical_beats_affordability_attribution() {
        let lex = Lexicon::builtin();
        let msgs = analyzed(&[
            "The side effect is bad and I can't afford the copay",
            "Okay",
            "Thanks",
            "Bye for now",
        ]);
        let points = extract_friction_points(&lex, "c1", &msgs);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].barrier, BarrierType::Clinical, "priority order wins");
    }

    #[test]
    fn test_severity_from_strongest_indicator_of_winning_barrier() {
        let lex = Lexicon::builtin();
        let msgs = analyzed(&[
            "I have severe nausea since the last dose",
            "Okay",
            "Thanks",
            "Bye for now",
        ]);
        let points = extract_friction_points(&lex, "c1", &msgs);
        assert_eq!(points[0].severity, Severity::High, "\"severe\" grades high");
    }

    #[test]
    fn test_sentiment_only_friction_is_support_quality_low() {
        let lex = Lexicon::builtin();
        let msgs = analyzed(&["This is ridiculous", "Okay", "Thanks", "Bye for now"]);
        let points = extract_friction_points(&lex, "c1", &msgs);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].barrier, BarrierType::SupportQuality);
        assert_eq!(points[0].severity, Severity::Low);
    }

    #[test]
    fn test_trailing_friction_defaults_unresolved() {
        let lex = Lexicon::builtin();
        let msgs = analyzed(&[
            "My refill was denied",
            "Let me look into that",
            "I still can't afford it",
            "I'm so frustrated",
        ]);
        let points = extract_friction_points(&lex, "c1", &msgs);
        assert_eq!(points.len(), 3);
        assert!(points[0].resolved, "early friction defaults resolved");
        assert!(!points[1].resolved, "second-to-last turn is unresolved");
        assert!(!points[2].resolved, "final turn is unresolved");
    }

    #[test]
    fn test_friction_score_monotone_in_count_and_severity() {
        fn point(severity: Severity) -> FrictionPoint {
            FrictionPoint {
                conversation_id: "c".to_string(),
                utterance_index: 0,
                barrier: BarrierType::Process,
                severity,
                description: String::new(),
                snippet: String::new(),
                resolved: true,
                resolution: None,
                detected_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
                resolved_at: None,
            }
        }

        let low = vec![point(Severity::Low)];
        let low_low = vec![point(Severity::Low), point(Severity::Low)];
        let low_high = vec![point(Severity::Low), point(Severity::High)];

        assert!(friction_score(&low_low) > friction_score(&low), "more points, higher score");
        assert!(
            friction_score(&low_high) > friction_score(&low_low),
            "higher severity, higher score"
        );

        let many: Vec<FrictionPoint> = (0..20).map(|_| point(Severity::High)).collect();
        assert_eq!(friction_score(&many), 100, "capped at 100");
    }

    #[test]
    fn test_snippet_truncation() {
        let long = "x".repeat(500);
        assert_eq!(truncate_snippet(&long).chars().count(), SNIPPET_MAX_CHARS);
        assert_eq!(truncate_snippet("short"), "short");
    }
}
