//! Shared type model for conversation analytics.
//!
//! These records are the engine's entire external surface: transcripts come
//! in as [`Utterance`] sequences plus [`ConversationMeta`], analytics go out
//! as [`ConversationAnalytics`] and the derived corpus records. Everything
//! serializes camelCase (structs) / kebab-case (enums) to match the shape
//! the dashboards consume.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Transcript input
// =============================================================================

/// Who produced a speaker turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeakerRole {
    AiAgent,
    Patient,
    HumanAgent,
}

/// One speaker turn of a transcript. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub speaker: SpeakerRole,
    /// Display label from the transcription layer ("Maya (AI)", "Patient").
    pub speaker_label: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Program context a call was placed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversationType {
    Inbound,
    OutboundEnrollment,
    AdherenceCheckin,
    RefillReminder,
    SideEffectMonitoring,
}

/// Conversation metadata supplied by the call-capture collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMeta {
    pub conversation_id: String,
    pub patient_id: String,
    pub conversation_type: ConversationType,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: u32,
}

// =============================================================================
// Per-utterance analysis
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// An utterance plus its derived signal tags. Append-only: produced once by
/// the classifier, never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedUtterance {
    pub utterance: Utterance,
    pub sentiment: Sentiment,
    /// Continuous score in [-1.0, 1.0]; sign always agrees with `sentiment`.
    pub sentiment_score: f64,
    /// Ids of every matched topic, in topic-table order.
    pub topics: Vec<String>,
    pub friction_detected: bool,
    pub key_moment: bool,
}

// =============================================================================
// Topics
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopicCategory {
    Clinical,
    Operational,
    Access,
    Experience,
    Compliance,
}

/// A named concept matched via keywords. Configuration data: created and
/// edited by the admin workflow, read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub category: TopicCategory,
    pub keywords: Vec<String>,
    pub built_in: bool,
    /// Mention count above which the topic is surfaced for alerting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<u32>,
    /// Playbooks this topic is tracked under.
    #[serde(default)]
    pub playbooks: Vec<String>,
}

// =============================================================================
// Friction
// =============================================================================

/// Category of obstacle behind a friction point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarrierType {
    Insurance,
    Affordability,
    Access,
    Clinical,
    Process,
    SupportQuality,
}

impl BarrierType {
    pub const ALL: [BarrierType; 6] = [
        BarrierType::Insurance,
        BarrierType::Affordability,
        BarrierType::Access,
        BarrierType::Clinical,
        BarrierType::Process,
        BarrierType::SupportQuality,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BarrierType::Insurance => "Insurance",
            BarrierType::Affordability => "Affordability",
            BarrierType::Access => "Access",
            BarrierType::Clinical => "Clinical",
            BarrierType::Process => "Process",
            BarrierType::SupportQuality => "Support quality",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Numeric scale used for averaging: low=1, medium=2, high=3.
    pub fn numeric(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

/// A detected obstacle within one conversation.
///
/// Created by the conversation analyzer; `resolved`, `resolution` and
/// `resolved_at` may later be updated by the external reviewer workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrictionPoint {
    pub conversation_id: String,
    /// Index of the utterance where the obstacle was detected.
    pub utterance_index: usize,
    pub barrier: BarrierType,
    pub severity: Severity,
    pub description: String,
    /// Verbatim snippet from the triggering utterance.
    pub snippet: String,
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub detected_at: DateTime<Utc>,
    /// Set by the reviewer workflow when the obstacle is closed out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Conversation-level analytics
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStatus {
    Resolved,
    Escalated,
    CallbackRequested,
    Unresolved,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Reviewer-owned fields. The engine initializes them empty and never
/// writes them again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMetadata {
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Post-call survey score (0-100), when the patient completed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csat: Option<u8>,
}

/// The central per-conversation aggregate. Created once per completed
/// conversation; read-only afterward except for `review`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAnalytics {
    pub conversation_id: String,
    pub patient_id: String,
    pub conversation_type: ConversationType,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub messages: Vec<AnalyzedUtterance>,
    pub overall_sentiment: Sentiment,
    /// Mean of the per-utterance scores.
    pub sentiment_score: f64,
    /// Last-utterance score minus first-utterance score; a large positive
    /// shift means the call recovered.
    pub sentiment_shift: f64,
    /// Union of per-utterance topic sets, in first-appearance order.
    pub topics_detected: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_topic: Option<String>,
    pub resolution_status: ResolutionStatus,
    pub escalated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,
    pub quality_score: u8,
    pub compliance_score: u8,
    pub empathy_score: u8,
    pub friction_points: Vec<FrictionPoint>,
    /// 0-100; grows with the count and severity of friction points.
    pub friction_score: u8,
    pub call_driver: String,
    pub outcome_achieved: bool,
    pub risk_level: RiskLevel,
    /// 0-100 estimate of program disengagement likelihood.
    pub churn_risk: u8,
    #[serde(default)]
    pub review: ReviewMetadata,
}

impl ConversationAnalytics {
    /// Calendar day the call started, used for daily grouping.
    pub fn call_date(&self) -> NaiveDate {
        self.started_at.date_naive()
    }

    pub fn mentions_topic(&self, topic_id: &str) -> bool {
        self.topics_detected.iter().any(|t| t == topic_id)
    }
}

// =============================================================================
// Corpus-level records
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Mention trend for one topic over a comparison window. Ephemeral:
/// recomputed on demand, never persisted as source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicTrend {
    pub topic_id: String,
    pub topic_name: String,
    pub current_mentions: usize,
    pub previous_mentions: usize,
    /// Percentage change vs. the prior period. `None` means the topic is new
    /// this period (zero prior mentions), not a numeric change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
    pub direction: TrendDirection,
    /// Mean conversation sentiment score across mentioning conversations.
    pub avg_sentiment_score: f64,
    pub sentiment: Sentiment,
    pub sentiment_direction: TrendDirection,
    pub conversation_count: usize,
    /// Daily mention counts for the trailing week, oldest first.
    pub sparkline: Vec<u32>,
}

/// Root-cause rollup for one barrier type. Pure function of the friction
/// corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootCauseAnalysis {
    pub barrier: BarrierType,
    pub occurrences: usize,
    pub pct_of_total: f64,
    /// Mean severity on the 1..3 scale, expressed 0-100.
    pub avg_severity: f64,
    pub resolution_rate: f64,
    /// Mean detected-to-resolved span. Only resolved points carrying a
    /// resolution timestamp contribute; `None` when no point does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_hours_to_resolve: Option<f64>,
    pub direction: TrendDirection,
    pub affected_patients: usize,
    pub correlated_topics: Vec<String>,
    pub example_snippets: Vec<String>,
    pub recommended_actions: Vec<String>,
}

// =============================================================================
// Spotlights
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpotlightKind {
    EmergingIssue,
    PositiveTrend,
    RiskAlert,
    OperationalWin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpotlightSeverity {
    Info,
    Warning,
    Critical,
    Positive,
}

impl SpotlightSeverity {
    /// Ranking weight: critical > warning > positive > info.
    pub fn rank(&self) -> u8 {
        match self {
            SpotlightSeverity::Critical => 3,
            SpotlightSeverity::Warning => 2,
            SpotlightSeverity::Positive => 1,
            SpotlightSeverity::Info => 0,
        }
    }
}

/// An auto-generated insight. `dismissed` is the only field the reviewer
/// interface may mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spotlight {
    /// Deterministic: derived from kind, subject and detection date, so
    /// identical inputs regenerate identical ids.
    pub id: String,
    pub kind: SpotlightKind,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<f64>,
    pub severity: SpotlightSeverity,
    pub detected_on: NaiveDate,
    pub time_frame: String,
    pub affected_conversations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
    #[serde(default)]
    pub dismissed: bool,
}

// =============================================================================
// Metrics snapshot
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCount {
    pub topic_id: String,
    pub topic_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverCount {
    pub driver: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

/// Top-level corpus snapshot: a pure function of the current conversation
/// set plus the topic table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetrics {
    pub total_conversations: usize,
    pub previous_total: usize,
    /// Volume change vs. the prior period; `None` when the prior period is
    /// empty ("new", not a division error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_change_pct: Option<f64>,
    pub daily_volume: Vec<DailyVolume>,
    pub sentiment_distribution: SentimentDistribution,
    pub avg_quality_score: f64,
    pub avg_compliance_score: f64,
    pub avg_empathy_score: f64,
    pub avg_friction_score: f64,
    pub escalation_rate: f64,
    pub resolution_rate: f64,
    /// Prior-period comparators; `None` when no prior period was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_escalation_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_avg_quality_score: Option<f64>,
    pub risk_counts: RiskCounts,
    pub top_topics: Vec<TopicCount>,
    pub top_call_drivers: Vec<DriverCount>,
    /// True when the snapshot was computed over an incomplete batch. Callers
    /// must not treat a partial snapshot as final.
    #[serde(default)]
    pub partial: bool,
}
