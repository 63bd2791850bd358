//! Root-cause barrier analysis.
//!
//! Groups the friction corpus by barrier type and rolls each group up into
//! occurrence, severity, resolution and timing figures, with the verbatim
//! evidence and a recommended playbook attached. Pure function of the
//! conversation sets it is handed.

use std::collections::BTreeSet;

use crate::types::{
    BarrierType, ConversationAnalytics, FrictionPoint, RootCauseAnalysis, TrendDirection,
};

/// Evidence snippets attached per barrier.
const EXAMPLE_SNIPPET_LIMIT: usize = 3;

/// Correlated topics attached per barrier.
const CORRELATED_TOPIC_LIMIT: usize = 3;

/// Playbook suggestions per barrier type.
const RECOMMENDED_ACTIONS: &[(BarrierType, &[&str])] = &[
    (
        BarrierType::Insurance,
        &[
            "Review prior-authorization turnaround with payer contacts",
            "Route denials to the appeals specialist queue",
        ],
    ),
    (
        BarrierType::Affordability,
        &[
            "Screen affected patients for copay assistance eligibility",
            "Surface financial-support options earlier in the call flow",
        ],
    ),
    (
        BarrierType::Access,
        &[
            "Check regional pharmacy stock and transfer options",
            "Offer scheduling alternatives at intake",
        ],
    ),
    (
        BarrierType::Clinical,
        &[
            "Flag recurring adverse-event language for clinical review",
            "Confirm side-effect counseling is offered on every report",
        ],
    ),
    (
        BarrierType::Process,
        &[
            "Audit handoff points where patients report waiting",
            "Tighten follow-up commitments with explicit dates",
        ],
    ),
    (
        BarrierType::SupportQuality,
        &[
            "Sample flagged calls for coaching review",
            "Revisit escalation scripts for repeated-contact patients",
        ],
    ),
];

fn recommended_actions(barrier: BarrierType) -> Vec<String> {
    RECOMMENDED_ACTIONS
        .iter()
        .find(|(b, _)| *b == barrier)
        .map(|(_, actions)| actions.iter().map(|a| a.to_string()).collect())
        .unwrap_or_default()
}

/// Roll up friction by barrier type, one record per barrier present in the
/// current set, ordered by occurrence count descending.
///
/// Without a prior period every trend direction defaults to stable; callers
/// wanting real directions must supply the previous conversations.
pub fn analyze_barriers(
    current: &[ConversationAnalytics],
    previous: Option<&[ConversationAnalytics]>,
) -> Vec<RootCauseAnalysis> {
    let points: Vec<(&ConversationAnalytics, &FrictionPoint)> = current
        .iter()
        .flat_map(|c| c.friction_points.iter().map(move |p| (c, p)))
        .collect();
    let total = points.len();
    if total == 0 {
        return Vec::new();
    }

    let mut results: Vec<RootCauseAnalysis> = BarrierType::ALL
        .iter()
        .filter_map(|&barrier| {
            let group: Vec<&(&ConversationAnalytics, &FrictionPoint)> = points
                .iter()
                .filter(|(_, p)| p.barrier == barrier)
                .collect();
            if group.is_empty() {
                return None;
            }

            let occurrences = group.len();
            let resolved = group.iter().filter(|(_, p)| p.resolved).count();

            let avg_severity = group
                .iter()
                .map(|(_, p)| p.severity.numeric() as f64)
                .sum::<f64>()
                / occurrences as f64
                / 3.0
                * 100.0;

            // Only resolved points carrying a timestamp contribute; the rest
            // are excluded from the average, not counted as zero.
            let durations: Vec<f64> = group
                .iter()
                .filter(|(_, p)| p.resolved)
                .filter_map(|(_, p)| {
                    p.resolved_at
                        .map(|r| (r - p.detected_at).num_seconds() as f64 / 3600.0)
                })
                .collect();
            let avg_hours_to_resolve = if durations.is_empty() {
                None
            } else {
                Some(durations.iter().sum::<f64>() / durations.len() as f64)
            };

            let direction = match previous {
                Some(prev) => {
                    let prev_count = prev
                        .iter()
                        .flat_map(|c| c.friction_points.iter())
                        .filter(|p| p.barrier == barrier)
                        .count();
                    if occurrences > prev_count {
                        TrendDirection::Up
                    } else if occurrences < prev_count {
                        TrendDirection::Down
                    } else {
                        TrendDirection::Stable
                    }
                }
                None => TrendDirection::Stable,
            };

            let affected_patients = group
                .iter()
                .map(|(c, _)| c.patient_id.as_str())
                .collect::<BTreeSet<_>>()
                .len();

            Some(RootCauseAnalysis {
                barrier,
                occurrences,
                pct_of_total: occurrences as f64 / total as f64 * 100.0,
                avg_severity,
                resolution_rate: resolved as f64 / occurrences as f64,
                avg_hours_to_resolve,
                direction,
                affected_patients,
                correlated_topics: correlated_topics(&group),
                example_snippets: example_snippets(&group),
                recommended_actions: recommended_actions(barrier),
            })
        })
        .collect();

    results.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    results
}

/// Most frequent topics across the conversations carrying this barrier.
fn correlated_topics(group: &[&(&ConversationAnalytics, &FrictionPoint)]) -> Vec<String> {
    let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    let mut seen_conversations = BTreeSet::new();
    for (c, _) in group {
        if seen_conversations.insert(c.conversation_id.as_str()) {
            for t in &c.topics_detected {
                *counts.entry(t.as_str()).or_insert(0) += 1;
            }
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(CORRELATED_TOPIC_LIMIT)
        .map(|(t, _)| t.to_string())
        .collect()
}

/// Up to three verbatim snippets: most severe first, most recent within the
/// same severity.
fn example_snippets(group: &[&(&ConversationAnalytics, &FrictionPoint)]) -> Vec<String> {
    let mut sorted: Vec<&FrictionPoint> = group.iter().map(|(_, p)| *p).collect();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.detected_at.cmp(&a.detected_at))
    });
    sorted
        .into_iter()
        .take(EXAMPLE_SNIPPET_LIMIT)
        .map(|p| p.snippet.clone())
        .collect()
}
