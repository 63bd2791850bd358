//! Corpus aggregation: the metrics snapshot and per-topic trend lines.
//!
//! Everything here is a pure fold over already-analyzed conversations plus
//! the topic table. Comparison against a prior period is explicit input, so
//! the same two sets always produce the same snapshot.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::lexicon::Lexicon;
use crate::types::{
    ConversationAnalytics, ConversationMetrics, DailyVolume, DriverCount, ResolutionStatus,
    RiskCounts, RiskLevel, Sentiment, SentimentDistribution, TopicCount, TopicTrend,
    TrendDirection,
};

use crate::analyze::bucket_sentiment;

/// Ranked list caps for the snapshot.
const TOP_TOPICS_LIMIT: usize = 5;
const TOP_DRIVERS_LIMIT: usize = 5;

/// Sparkline covers the trailing week of the current period.
const SPARKLINE_DAYS: usize = 7;

/// Average-sentiment movement below this is reported stable.
const SENTIMENT_TREND_EPSILON: f64 = 0.05;

// ---------------------------------------------------------------------------
// Metrics snapshot
// ---------------------------------------------------------------------------

/// Aggregate a complete conversation set into the corpus snapshot.
///
/// An empty current set yields the zeroed snapshot, not an error.
pub fn aggregate(
    lexicon: &Lexicon,
    current: &[ConversationAnalytics],
    previous: &[ConversationAnalytics],
) -> Result<ConversationMetrics, EngineError> {
    validate_topic_refs(lexicon, current)?;
    validate_topic_refs(lexicon, previous)?;

    if current.is_empty() {
        return Ok(ConversationMetrics {
            previous_total: previous.len(),
            ..ConversationMetrics::default()
        });
    }

    let total = current.len();
    let volume_change_pct = pct_change(total, previous.len());

    let mut daily: BTreeMap<chrono::NaiveDate, usize> = BTreeMap::new();
    for c in current {
        *daily.entry(c.call_date()).or_insert(0) += 1;
    }
    let daily_volume = daily
        .into_iter()
        .map(|(date, count)| DailyVolume { date, count })
        .collect();

    let escalated = current.iter().filter(|c| c.escalated).count();
    let resolved = current
        .iter()
        .filter(|c| c.resolution_status == ResolutionStatus::Resolved)
        .count();

    let previous_escalation_rate = (!previous.is_empty()).then(|| {
        previous.iter().filter(|c| c.escalated).count() as f64 / previous.len() as f64
    });
    let previous_avg_quality_score = (!previous.is_empty()).then(|| {
        previous.iter().map(|c| c.quality_score as f64).sum::<f64>() / previous.len() as f64
    });

    Ok(ConversationMetrics {
        total_conversations: total,
        previous_total: previous.len(),
        volume_change_pct,
        daily_volume,
        sentiment_distribution: sentiment_distribution(current),
        avg_quality_score: mean(current, |c| c.quality_score as f64),
        avg_compliance_score: mean(current, |c| c.compliance_score as f64),
        avg_empathy_score: mean(current, |c| c.empathy_score as f64),
        avg_friction_score: mean(current, |c| c.friction_score as f64),
        escalation_rate: escalated as f64 / total as f64,
        resolution_rate: resolved as f64 / total as f64,
        previous_escalation_rate,
        previous_avg_quality_score,
        risk_counts: RiskCounts {
            low: count_risk(current, RiskLevel::Low),
            medium: count_risk(current, RiskLevel::Medium),
            high: count_risk(current, RiskLevel::High),
            critical: count_risk(current, RiskLevel::Critical),
        },
        top_topics: top_topics(lexicon, current),
        top_call_drivers: top_call_drivers(current),
        partial: false,
    })
}

/// Aggregate an incomplete set. Identical to [`aggregate`] except the
/// snapshot is flagged partial so callers cannot mistake it for final.
pub fn aggregate_partial(
    lexicon: &Lexicon,
    current: &[ConversationAnalytics],
    previous: &[ConversationAnalytics],
) -> Result<ConversationMetrics, EngineError> {
    let mut metrics = aggregate(lexicon, current, previous)?;
    metrics.partial = true;
    Ok(metrics)
}

// ---------------------------------------------------------------------------
// Topic trends
// ---------------------------------------------------------------------------

/// One trend line per topic in the table.
///
/// The sparkline anchors on the latest call date in the current period, so
/// the computation never reads the wall clock. An empty current period
/// yields an empty list.
pub fn topic_trends(
    lexicon: &Lexicon,
    current: &[ConversationAnalytics],
    previous: &[ConversationAnalytics],
    config: &EngineConfig,
) -> Result<Vec<TopicTrend>, EngineError> {
    validate_topic_refs(lexicon, current)?;
    validate_topic_refs(lexicon, previous)?;

    let anchor = match current.iter().map(|c| c.call_date()).max() {
        Some(d) => d,
        None => return Ok(Vec::new()),
    };

    let trends = lexicon
        .topics
        .iter()
        .map(|topic| {
            let mentioning: Vec<&ConversationAnalytics> = current
                .iter()
                .filter(|c| c.mentions_topic(&topic.id))
                .collect();
            let prev_mentions = previous
                .iter()
                .filter(|c| c.mentions_topic(&topic.id))
                .count();

            let (change_pct, direction) = period_change(
                mentioning.len(),
                prev_mentions,
                config.trend_stable_band_pct,
            );

            let avg_sentiment_score = if mentioning.is_empty() {
                0.0
            } else {
                mentioning.iter().map(|c| c.sentiment_score).sum::<f64>()
                    / mentioning.len() as f64
            };
            let prev_avg = {
                let prev: Vec<f64> = previous
                    .iter()
                    .filter(|c| c.mentions_topic(&topic.id))
                    .map(|c| c.sentiment_score)
                    .collect();
                if prev.is_empty() {
                    0.0
                } else {
                    prev.iter().sum::<f64>() / prev.len() as f64
                }
            };
            let sentiment_direction = if avg_sentiment_score - prev_avg > SENTIMENT_TREND_EPSILON {
                TrendDirection::Up
            } else if prev_avg - avg_sentiment_score > SENTIMENT_TREND_EPSILON {
                TrendDirection::Down
            } else {
                TrendDirection::Stable
            };

            let sparkline = (0..SPARKLINE_DAYS)
                .map(|i| {
                    let day = anchor - Duration::days((SPARKLINE_DAYS - 1 - i) as i64);
                    mentioning.iter().filter(|c| c.call_date() == day).count() as u32
                })
                .collect();

            TopicTrend {
                topic_id: topic.id.clone(),
                topic_name: topic.name.clone(),
                current_mentions: mentioning.len(),
                previous_mentions: prev_mentions,
                change_pct,
                direction,
                avg_sentiment_score,
                sentiment: bucket_sentiment(avg_sentiment_score),
                sentiment_direction,
                conversation_count: mentioning.len(),
                sparkline,
            }
        })
        .collect();

    Ok(trends)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Percentage change vs. a prior count. A zero prior period is "new"
/// (`None`) when anything happened at all, never a division error.
fn pct_change(current: usize, previous: usize) -> Option<f64> {
    if previous == 0 {
        return if current > 0 { None } else { Some(0.0) };
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}

/// Percentage change plus direction against the stable band.
fn period_change(
    current: usize,
    previous: usize,
    stable_band_pct: f64,
) -> (Option<f64>, TrendDirection) {
    match pct_change(current, previous) {
        None => (None, TrendDirection::Up),
        Some(pct) => {
            let direction = if pct > stable_band_pct {
                TrendDirection::Up
            } else if pct < -stable_band_pct {
                TrendDirection::Down
            } else {
                TrendDirection::Stable
            };
            (Some(pct), direction)
        }
    }
}

fn validate_topic_refs(
    lexicon: &Lexicon,
    conversations: &[ConversationAnalytics],
) -> Result<(), EngineError> {
    for c in conversations {
        lexicon.validate_topic_refs(c.topics_detected.iter().map(String::as_str))?;
    }
    Ok(())
}

fn sentiment_distribution(conversations: &[ConversationAnalytics]) -> SentimentDistribution {
    let count = |s: Sentiment| {
        conversations
            .iter()
            .filter(|c| c.overall_sentiment == s)
            .count()
    };
    let positive = count(Sentiment::Positive);
    let neutral = count(Sentiment::Neutral);
    let negative = count(Sentiment::Negative);
    let total = conversations.len().max(1) as f64;
    SentimentDistribution {
        positive,
        neutral,
        negative,
        positive_pct: positive as f64 / total * 100.0,
        neutral_pct: neutral as f64 / total * 100.0,
        negative_pct: negative as f64 / total * 100.0,
    }
}

fn mean(conversations: &[ConversationAnalytics], f: impl Fn(&ConversationAnalytics) -> f64) -> f64 {
    if conversations.is_empty() {
        return 0.0;
    }
    conversations.iter().map(f).sum::<f64>() / conversations.len() as f64
}

fn count_risk(conversations: &[ConversationAnalytics], level: RiskLevel) -> usize {
    conversations
        .iter()
        .filter(|c| c.risk_level == level)
        .count()
}

fn top_topics(lexicon: &Lexicon, conversations: &[ConversationAnalytics]) -> Vec<TopicCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for c in conversations {
        for t in &c.topics_detected {
            *counts.entry(t.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<TopicCount> = counts
        .into_iter()
        .map(|(id, count)| TopicCount {
            topic_id: id.to_string(),
            topic_name: lexicon
                .topic(id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| id.to_string()),
            count,
        })
        .collect();
    // BTreeMap iteration gives the id-ordered tie-break for free.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_TOPICS_LIMIT);
    ranked
}

fn top_call_drivers(conversations: &[ConversationAnalytics]) -> Vec<DriverCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for c in conversations {
        *counts.entry(c.call_driver.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<DriverCount> = counts
        .into_iter()
        .map(|(driver, count)| DriverCount {
            driver: driver.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_DRIVERS_LIMIT);
    ranked
}
