//! Spotlight generation.
//!
//! Scans aggregator output for threshold breaches and emits ranked,
//! human-readable insights. Each rule is its own function and fires
//! independently; ranking happens once at the end. Spotlight ids derive from
//! the rule subject and detection date, so regeneration over the same inputs
//! reproduces the same ids.

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::types::{
    ConversationMetrics, RootCauseAnalysis, Spotlight, SpotlightKind, SpotlightSeverity,
    TopicTrend, TrendDirection,
};

/// Generate every spotlight whose rule fires, ranked by severity
/// (critical > warning > positive > info) then affected-conversation count.
pub fn generate_spotlights(
    metrics: &ConversationMetrics,
    trends: &[TopicTrend],
    root_causes: &[RootCauseAnalysis],
    as_of: NaiveDate,
    config: &EngineConfig,
) -> Vec<Spotlight> {
    let mut spotlights: Vec<Spotlight> = Vec::new();

    for trend in trends {
        if let Some(s) = emerging_issue(trend, as_of, config) {
            spotlights.push(s);
        }
        if let Some(s) = positive_trend(trend, as_of) {
            spotlights.push(s);
        }
    }
    for rc in root_causes {
        if let Some(s) = risk_alert(rc, as_of, config) {
            spotlights.push(s);
        }
    }
    if let Some(s) = operational_win(metrics, as_of) {
        spotlights.push(s);
    }

    spotlights.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then(b.affected_conversations.cmp(&a.affected_conversations))
    });

    log::debug!("generated {} spotlight(s) as of {}", spotlights.len(), as_of);
    spotlights
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Topic mentions spiking period over period. Brand-new topics (no prior
/// mentions, so no percentage) fire once they clear the volume floor.
pub fn emerging_issue(
    trend: &TopicTrend,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> Option<Spotlight> {
    if trend.direction != TrendDirection::Up {
        return None;
    }

    let (severity, title, description) = match trend.change_pct {
        Some(pct) if pct >= config.critical_spike_pct => (
            SpotlightSeverity::Critical,
            format!("{} mentions up {:.0}%", trend.topic_name, pct),
            format!(
                "{} came up in {} conversation(s), up {:.0}% vs. the prior period.",
                trend.topic_name, trend.current_mentions, pct
            ),
        ),
        Some(pct) if pct >= config.spike_threshold_pct => (
            SpotlightSeverity::Warning,
            format!("{} mentions up {:.0}%", trend.topic_name, pct),
            format!(
                "{} came up in {} conversation(s), up {:.0}% vs. the prior period.",
                trend.topic_name, trend.current_mentions, pct
            ),
        ),
        None if trend.current_mentions >= config.min_barrier_volume => (
            SpotlightSeverity::Warning,
            format!("{} is new this period", trend.topic_name),
            format!(
                "{} surfaced in {} conversation(s) with no prior-period mentions.",
                trend.topic_name, trend.current_mentions
            ),
        ),
        _ => return None,
    };

    Some(Spotlight {
        id: spotlight_id("emerging-issue", &trend.topic_id, as_of),
        kind: SpotlightKind::EmergingIssue,
        title,
        description,
        metric: trend.change_pct,
        severity,
        detected_on: as_of,
        time_frame: "vs. prior period".to_string(),
        affected_conversations: trend.current_mentions,
        topic_id: Some(trend.topic_id.clone()),
        recommended_action: None,
        dismissed: false,
    })
}

/// Mention count and average sentiment both rising.
pub fn positive_trend(trend: &TopicTrend, as_of: NaiveDate) -> Option<Spotlight> {
    if trend.current_mentions <= trend.previous_mentions
        || trend.sentiment_direction != TrendDirection::Up
    {
        return None;
    }

    Some(Spotlight {
        id: spotlight_id("positive-trend", &trend.topic_id, as_of),
        kind: SpotlightKind::PositiveTrend,
        title: format!("{} conversations trending positive", trend.topic_name),
        description: format!(
            "Mentions of {} grew with improving sentiment ({:.2} average score).",
            trend.topic_name, trend.avg_sentiment_score
        ),
        metric: Some(trend.avg_sentiment_score),
        severity: SpotlightSeverity::Positive,
        detected_on: as_of,
        time_frame: "vs. prior period".to_string(),
        affected_conversations: trend.current_mentions,
        topic_id: Some(trend.topic_id.clone()),
        recommended_action: None,
        dismissed: false,
    })
}

/// A barrier resolving below the configured floor at meaningful volume.
pub fn risk_alert(
    rc: &RootCauseAnalysis,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> Option<Spotlight> {
    if rc.resolution_rate >= config.resolution_rate_floor
        || rc.occurrences < config.min_barrier_volume
    {
        return None;
    }

    Some(Spotlight {
        id: spotlight_id("risk-alert", &barrier_slug(rc), as_of),
        kind: SpotlightKind::RiskAlert,
        title: format!("{} barriers resolving below target", rc.barrier.label()),
        description: format!(
            "{} of {} {} friction point(s) resolved ({:.0}%), below the {:.0}% floor.",
            (rc.resolution_rate * rc.occurrences as f64).round() as usize,
            rc.occurrences,
            rc.barrier.label().to_lowercase(),
            rc.resolution_rate * 100.0,
            config.resolution_rate_floor * 100.0
        ),
        metric: Some(rc.resolution_rate * 100.0),
        severity: SpotlightSeverity::Critical,
        detected_on: as_of,
        time_frame: "current period".to_string(),
        affected_conversations: rc.occurrences,
        topic_id: None,
        recommended_action: rc.recommended_actions.first().cloned(),
        dismissed: false,
    })
}

/// Escalation rate down while average quality climbed.
pub fn operational_win(metrics: &ConversationMetrics, as_of: NaiveDate) -> Option<Spotlight> {
    let prev_escalation = metrics.previous_escalation_rate?;
    let prev_quality = metrics.previous_avg_quality_score?;
    if metrics.escalation_rate >= prev_escalation
        || metrics.avg_quality_score <= prev_quality
    {
        return None;
    }

    let delta_points = (prev_escalation - metrics.escalation_rate) * 100.0;
    Some(Spotlight {
        id: spotlight_id("operational-win", "corpus", as_of),
        kind: SpotlightKind::OperationalWin,
        title: "Escalations down, quality up".to_string(),
        description: format!(
            "Escalation rate fell {:.1} point(s) while average quality rose from {:.0} to {:.0}.",
            delta_points, prev_quality, metrics.avg_quality_score
        ),
        metric: Some(delta_points),
        severity: SpotlightSeverity::Positive,
        detected_on: as_of,
        time_frame: "vs. prior period".to_string(),
        affected_conversations: metrics.total_conversations,
        topic_id: None,
        recommended_action: None,
        dismissed: false,
    })
}

fn spotlight_id(kind: &str, subject: &str, as_of: NaiveDate) -> String {
    format!("spot-{}-{}-{}", kind, subject, as_of.format("%Y%m%d"))
}

fn barrier_slug(rc: &RootCauseAnalysis) -> String {
    rc.barrier.label().to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BarrierType, Sentiment};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn trend(id: &str, current: usize, previous: usize, change: Option<f64>) -> TopicTrend {
        TopicTrend {
            topic_id: id.to_string(),
            topic_name: id.to_string(),
            current_mentions: current,
            previous_mentions: previous,
            change_pct: change,
            direction: match change {
                None if current > 0 => TrendDirection::Up,
                Some(pct) if pct > 5.0 => TrendDirection::Up,
                Some(pct) if pct < -5.0 => TrendDirection::Down,
                _ => TrendDirection::Stable,
            },
            avg_sentiment_score: 0.0,
            sentiment: Sentiment::Neutral,
            sentiment_direction: TrendDirection::Stable,
            conversation_count: current,
            sparkline: vec![0; 7],
        }
    }

    fn root_cause(barrier: BarrierType, occurrences: usize, rate: f64) -> RootCauseAnalysis {
        RootCauseAnalysis {
            barrier,
            occurrences,
            pct_of_total: 50.0,
            avg_severity: 60.0,
            resolution_rate: rate,
            avg_hours_to_resolve: None,
            direction: TrendDirection::Stable,
            affected_patients: occurrences,
            correlated_topics: vec![],
            example_snippets: vec![],
            recommended_actions: vec!["Do the thing".to_string()],
        }
    }

    #[test]
    fn test_emerging_issue_thresholds() {
        let cfg = EngineConfig::default();
        assert!(emerging_issue(&trend("t", 10, 8, Some(25.0)), as_of(), &cfg).is_none());

        let s = emerging_issue(&trend("t", 14, 10, Some(40.0)), as_of(), &cfg).unwrap();
        assert_eq!(s.severity, SpotlightSeverity::Warning);
        assert_eq!(s.kind, SpotlightKind::EmergingIssue);

        let s = emerging_issue(&trend("t", 18, 10, Some(80.0)), as_of(), &cfg).unwrap();
        assert_eq!(s.severity, SpotlightSeverity::Critical);
    }

    #[test]
    fn test_emerging_issue_new_topic_needs_volume() {
        let cfg = EngineConfig::default();
        assert!(
            emerging_issue(&trend("t", 2, 0, None), as_of(), &cfg).is_none(),
            "below the volume floor"
        );
        let s = emerging_issue(&trend("t", 5, 0, None), as_of(), &cfg).unwrap();
        assert_eq!(s.severity, SpotlightSeverity::Warning);
        assert_eq!(s.metric, None);
    }

    #[test]
    fn test_positive_trend_requires_both_rises() {
        let mut t = trend("t", 12, 10, Some(20.0));
        assert!(positive_trend(&t, as_of()).is_none(), "sentiment not rising");

        t.sentiment_direction = TrendDirection::Up;
        let s = positive_trend(&t, as_of()).unwrap();
        assert_eq!(s.severity, SpotlightSeverity::Positive);

        t.current_mentions = 9;
        assert!(positive_trend(&t, as_of()).is_none(), "mentions not rising");
    }

    #[test]
    fn test_risk_alert_floors() {
        let cfg = EngineConfig::default();
        let s = risk_alert(&root_cause(BarrierType::Insurance, 8, 0.4), as_of(), &cfg).unwrap();
        assert_eq!(s.severity, SpotlightSeverity::Critical);
        assert_eq!(s.recommended_action.as_deref(), Some("Do the thing"));

        assert!(
            risk_alert(&root_cause(BarrierType::Insurance, 3, 0.4), as_of(), &cfg).is_none(),
            "below minimum volume"
        );
        assert!(
            risk_alert(&root_cause(BarrierType::Insurance, 8, 0.7), as_of(), &cfg).is_none(),
            "rate above floor"
        );
    }

    #[test]
    fn test_operational_win() {
        let metrics = ConversationMetrics {
            total_conversations: 40,
            escalation_rate: 0.05,
            avg_quality_score: 82.0,
            previous_escalation_rate: Some(0.12),
            previous_avg_quality_score: Some(76.0),
            ..ConversationMetrics::default()
        };
        let s = operational_win(&metrics, as_of()).unwrap();
        assert_eq!(s.kind, SpotlightKind::OperationalWin);
        assert_eq!(s.affected_conversations, 40);

        let no_prior = ConversationMetrics::default();
        assert!(operational_win(&no_prior, as_of()).is_none());
    }

    #[test]
    fn test_ranking_severity_then_volume() {
        let cfg = EngineConfig::default();
        let trends = vec![trend("spiking", 14, 10, Some(40.0))];
        let causes = vec![
            root_cause(BarrierType::Insurance, 8, 0.4),
            root_cause(BarrierType::Process, 20, 0.3),
        ];
        let metrics = ConversationMetrics {
            total_conversations: 40,
            escalation_rate: 0.05,
            avg_quality_score: 82.0,
            previous_escalation_rate: Some(0.12),
            previous_avg_quality_score: Some(76.0),
            ..ConversationMetrics::default()
        };
        let spots = generate_spotlights(&metrics, &trends, &causes, as_of(), &cfg);

        assert_eq!(spots.len(), 4);
        assert_eq!(spots[0].severity, SpotlightSeverity::Critical);
        assert_eq!(
            spots[0].affected_conversations, 20,
            "bigger critical ranks first"
        );
        assert_eq!(spots[1].severity, SpotlightSeverity::Critical);
        assert_eq!(spots[2].severity, SpotlightSeverity::Warning);
        assert_eq!(spots[3].severity, SpotlightSeverity::Positive);
        assert!(spots.iter().all(|s| !s.dismissed));
    }

    #[test]
    fn test_deterministic_ids() {
        let cfg = EngineConfig::default();
        let t = trend("side-effects", 14, 10, Some(40.0));
        let a = emerging_issue(&t, as_of(), &cfg).unwrap();
        let b = emerging_issue(&t, as_of(), &cfg).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "spot-emerging-issue-side-effects-20260310");
    }
}
