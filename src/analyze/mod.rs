//! Conversation analyzer.
//!
//! Runs the classifier over every turn, then folds the per-utterance output
//! into the conversation-level record: overall sentiment, topics, friction
//! points, and the rule-table-derived scores. A pure map/reduce; analyzing
//! the same transcript twice yields identical records.

pub mod friction;
pub mod rules;

use std::collections::HashMap;

use crate::classify::classify;
use crate::error::EngineError;
use crate::lexicon::Lexicon;
use crate::types::{
    AnalyzedUtterance, ConversationAnalytics, ConversationMeta, ResolutionStatus, ReviewMetadata,
    Sentiment, Severity, SpeakerRole, Utterance,
};

use rules::{
    apply_score_rules, derive_resolution, derive_risk_level, ConversationSignals, CHURN_BASE,
    CHURN_RULES, COMPLIANCE_BASE, COMPLIANCE_RULES, EMPATHY_BASE, EMPATHY_RULES, QUALITY_BASE,
    QUALITY_RULES,
};

/// Mean score above this buckets the conversation positive.
pub const POSITIVE_THRESHOLD: f64 = 0.2;
/// Mean score below this buckets the conversation negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.2;

/// Call driver when no topic was detected.
const DEFAULT_CALL_DRIVER: &str = "General inquiry";

/// Phrases that mark a callback request.
const CALLBACK_PHRASES: &[&str] = &["call me back", "call back", "callback", "call me tomorrow"];

/// Analyze one completed conversation.
///
/// Fails with [`EngineError::EmptyConversation`] on a zero-utterance
/// transcript; a record with undefined aggregates is worse than no record.
pub fn analyze(
    lexicon: &Lexicon,
    meta: &ConversationMeta,
    utterances: &[Utterance],
) -> Result<ConversationAnalytics, EngineError> {
    if utterances.is_empty() {
        return Err(EngineError::EmptyConversation {
            conversation_id: meta.conversation_id.clone(),
        });
    }

    let total = utterances.len();
    let messages: Vec<AnalyzedUtterance> = utterances
        .iter()
        .enumerate()
        .map(|(i, u)| classify(lexicon, u, i, total))
        .collect();

    let mean_score =
        messages.iter().map(|m| m.sentiment_score).sum::<f64>() / messages.len() as f64;
    let overall_sentiment = bucket_sentiment(mean_score);
    let first_score = messages.first().map(|m| m.sentiment_score).unwrap_or(0.0);
    let closing_score = messages.last().map(|m| m.sentiment_score).unwrap_or(0.0);
    let sentiment_shift = closing_score - first_score;

    let (topics_detected, primary_topic) = fold_topics(&messages);

    let friction_points =
        friction::extract_friction_points(lexicon, &meta.conversation_id, &messages);
    let friction_score = friction::friction_score(&friction_points);

    let signals = fold_signals(
        lexicon,
        &messages,
        &friction_points,
        mean_score,
        sentiment_shift,
        closing_score,
    );

    let (quality_score, quality_fired) =
        apply_score_rules(QUALITY_BASE, QUALITY_RULES, &signals);
    let (compliance_score, _) = apply_score_rules(COMPLIANCE_BASE, COMPLIANCE_RULES, &signals);
    let (empathy_score, _) = apply_score_rules(EMPATHY_BASE, EMPATHY_RULES, &signals);
    let (churn_risk, churn_fired) = apply_score_rules(CHURN_BASE, CHURN_RULES, &signals);
    let risk_level = derive_risk_level(&signals, churn_risk);
    let (resolution_status, deciding_rule) = derive_resolution(&signals);

    let escalated = resolution_status == ResolutionStatus::Escalated;
    let escalation_reason = escalated.then(|| escalation_reason(&friction_points, deciding_rule));

    let call_driver = primary_topic
        .as_deref()
        .and_then(|id| lexicon.topic(id))
        .map(|t| t.name.clone())
        .unwrap_or_else(|| DEFAULT_CALL_DRIVER.to_string());

    log::debug!(
        "analyzed '{}': sentiment={:?} quality={} ({:?}) churn={} ({:?}) risk={:?}",
        meta.conversation_id,
        overall_sentiment,
        quality_score,
        quality_fired,
        churn_risk,
        churn_fired,
        risk_level,
    );

    Ok(ConversationAnalytics {
        conversation_id: meta.conversation_id.clone(),
        patient_id: meta.patient_id.clone(),
        conversation_type: meta.conversation_type,
        started_at: meta.started_at,
        duration_seconds: meta.duration_seconds,
        messages,
        overall_sentiment,
        sentiment_score: mean_score,
        sentiment_shift,
        topics_detected,
        primary_topic,
        resolution_status,
        escalated,
        escalation_reason,
        quality_score,
        compliance_score,
        empathy_score,
        friction_points,
        friction_score,
        call_driver,
        outcome_achieved: signals.outcome_achieved,
        risk_level,
        churn_risk,
        review: ReviewMetadata::default(),
    })
}

pub fn bucket_sentiment(score: f64) -> Sentiment {
    if score > POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if score < NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Union of per-utterance topics in first-appearance order, plus the primary
/// topic: highest utterance-occurrence count, earliest-introduced on ties.
fn fold_topics(messages: &[AnalyzedUtterance]) -> (Vec<String>, Option<String>) {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for m in messages {
        for topic in &m.topics {
            if !counts.contains_key(topic) {
                order.push(topic.clone());
            }
            *counts.entry(topic.clone()).or_insert(0) += 1;
        }
    }

    let primary = order
        .iter()
        .max_by_key(|t| {
            // Later-introduced topics lose ties: negate the introduction
            // index so max_by_key keeps the earliest.
            let intro = order.iter().position(|o| o == *t).unwrap_or(0);
            (counts[*t], usize::MAX - intro)
        })
        .cloned();

    (order, primary)
}

fn fold_signals(
    lexicon: &Lexicon,
    messages: &[AnalyzedUtterance],
    friction_points: &[crate::types::FrictionPoint],
    mean_score: f64,
    shift: f64,
    closing_score: f64,
) -> ConversationSignals {
    let agent_turns = messages
        .iter()
        .filter(|m| {
            matches!(
                m.utterance.speaker,
                SpeakerRole::AiAgent | SpeakerRole::HumanAgent
            )
        })
        .count();
    let agent_positive = messages
        .iter()
        .filter(|m| {
            matches!(
                m.utterance.speaker,
                SpeakerRole::AiAgent | SpeakerRole::HumanAgent
            ) && m.sentiment == Sentiment::Positive
        })
        .count();

    let has_pivotal = messages.iter().any(|m| {
        let lower = m.utterance.text.to_lowercase();
        lexicon.pivotal.iter().any(|p| lower.contains(p.as_str()))
    });
    let callback_requested = messages.iter().any(|m| {
        let lower = m.utterance.text.to_lowercase();
        CALLBACK_PHRASES.iter().any(|p| lower.contains(p))
    });

    ConversationSignals {
        utterance_count: messages.len(),
        patient_turns: messages.len() - agent_turns,
        agent_turns,
        agent_positive,
        mean_score,
        shift,
        closing_score,
        key_moments: messages.iter().filter(|m| m.key_moment).count(),
        friction_total: friction_points.len(),
        friction_high: friction_points
            .iter()
            .filter(|p| p.severity == Severity::High)
            .count(),
        friction_unresolved: friction_points.iter().filter(|p| !p.resolved).count(),
        high_unresolved: friction_points
            .iter()
            .filter(|p| p.severity == Severity::High && !p.resolved)
            .count(),
        friction_clinical: friction_points
            .iter()
            .filter(|p| p.barrier == crate::types::BarrierType::Clinical)
            .count(),
        friction_affordability: friction_points
            .iter()
            .filter(|p| p.barrier == crate::types::BarrierType::Affordability)
            .count(),
        // A confirmation or offer of help landed and the call did not end on
        // a negative note.
        outcome_achieved: has_pivotal && closing_score >= 0.0,
        callback_requested,
    }
}

fn escalation_reason(
    friction_points: &[crate::types::FrictionPoint],
    deciding_rule: &'static str,
) -> String {
    friction_points
        .iter()
        .filter(|p| p.severity == Severity::High && !p.resolved)
        .map(|p| format!("{} barrier unresolved at call end", p.barrier.label()))
        .next()
        .unwrap_or_else(|| format!("Escalated by rule '{}'", deciding_rule))
}
