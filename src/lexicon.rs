//! Lexicon store: the keyword tables everything else classifies against.
//!
//! Sentiment polarity, friction indicators, pivotal phrases and the topic
//! table are configuration data. A `Lexicon` is built once at the start of a
//! batch (snapshot semantics) and passed read-only through every layer, so
//! topic edits made mid-batch never bleed into in-flight analysis and tests
//! can inject synthetic tables.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{BarrierType, Severity, Topic, TopicCategory};

/// A friction-indicator phrase with its barrier attribution and the severity
/// its strength implies. This table is where severity grading lives; the
/// analyzer reads it rather than branching on phrases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrictionIndicator {
    pub phrase: String,
    pub barrier: BarrierType,
    pub severity: Severity,
}

/// Immutable keyword tables for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub friction: Vec<FrictionIndicator>,
    pub pivotal: Vec<String>,
    pub topics: Vec<Topic>,
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

const POSITIVE_WORDS: &[&str] = &[
    "thank",
    "thanks",
    "great",
    "amazing",
    "wonderful",
    "perfect",
    "awesome",
    "excellent",
    "fantastic",
    "appreciate",
    "helpful",
    "relieved",
    "feeling better",
    "works well",
    "glad",
];

const NEGATIVE_WORDS: &[&str] = &[
    "frustrated",
    "frustrating",
    "angry",
    "upset",
    "terrible",
    "awful",
    "horrible",
    "worst",
    "annoyed",
    "disappointed",
    "confusing",
    "worried",
    "stressed",
    "unacceptable",
    "ridiculous",
    "pain",
    "hurts",
    "giving up",
];

/// Indicator strength drives severity: explicit hardship or safety language
/// grades high, named obstacles medium, incidental mentions low.
const FRICTION_INDICATORS: &[(&str, BarrierType, Severity)] = &[
    // Insurance
    ("denied", BarrierType::Insurance, Severity::High),
    ("denial", BarrierType::Insurance, Severity::High),
    ("not covered", BarrierType::Insurance, Severity::High),
    ("prior authorization", BarrierType::Insurance, Severity::Medium),
    ("prior auth", BarrierType::Insurance, Severity::Medium),
    ("appeal", BarrierType::Insurance, Severity::Medium),
    // Affordability
    ("can't afford", BarrierType::Affordability, Severity::High),
    ("cannot afford", BarrierType::Affordability, Severity::High),
    ("too expensive", BarrierType::Affordability, Severity::High),
    ("struggling to pay", BarrierType::Affordability, Severity::High),
    ("expensive", BarrierType::Affordability, Severity::Medium),
    ("out of pocket", BarrierType::Affordability, Severity::Medium),
    // Access
    ("out of stock", BarrierType::Access, Severity::Medium),
    ("backorder", BarrierType::Access, Severity::Medium),
    ("no appointment", BarrierType::Access, Severity::Medium),
    ("waitlist", BarrierType::Access, Severity::Low),
    ("transportation", BarrierType::Access, Severity::Low),
    // Clinical
    ("severe", BarrierType::Clinical, Severity::High),
    ("unbearable", BarrierType::Clinical, Severity::High),
    ("emergency", BarrierType::Clinical, Severity::High),
    ("side effect", BarrierType::Clinical, Severity::Medium),
    ("nausea", BarrierType::Clinical, Severity::Medium),
    ("dizzy", BarrierType::Clinical, Severity::Medium),
    ("rash", BarrierType::Clinical, Severity::Medium),
    ("redness", BarrierType::Clinical, Severity::Low),
    ("injection site", BarrierType::Clinical, Severity::Low),
    // Process
    ("still waiting", BarrierType::Process, Severity::Medium),
    ("no one called", BarrierType::Process, Severity::Medium),
    ("on hold", BarrierType::Process, Severity::Medium),
    ("transferred", BarrierType::Process, Severity::Low),
    ("paperwork", BarrierType::Process, Severity::Low),
    // Support quality
    ("nobody listens", BarrierType::SupportQuality, Severity::High),
    ("give up", BarrierType::SupportQuality, Severity::High),
    ("no one has helped", BarrierType::SupportQuality, Severity::Medium),
    ("unhelpful", BarrierType::SupportQuality, Severity::Medium),
];

/// Confirmations, approvals and offers of help that mark a pivotal turn.
const PIVOTAL_PHRASES: &[&str] = &[
    "i can help",
    "let me help",
    "i'll take care of",
    "we've approved",
    "has been approved",
    "you're all set",
    "confirmed",
    "i've scheduled",
    "i've submitted",
    "good news",
];

fn builtin_topics() -> Vec<Topic> {
    fn topic(
        id: &str,
        name: &str,
        category: TopicCategory,
        keywords: &[&str],
        alert_threshold: Option<u32>,
        playbooks: &[&str],
    ) -> Topic {
        Topic {
            id: id.to_string(),
            name: name.to_string(),
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            built_in: true,
            alert_threshold,
            playbooks: playbooks.iter().map(|p| p.to_string()).collect(),
        }
    }

    vec![
        topic(
            "side-effects",
            "Side Effects",
            TopicCategory::Clinical,
            &[
                "side effect",
                "reaction",
                "nausea",
                "dizzy",
                "redness",
                "injection site",
                "rash",
                "headache",
            ],
            Some(20),
            &["safety-monitoring"],
        ),
        topic(
            "adherence",
            "Adherence",
            TopicCategory::Clinical,
            &["missed a dose", "missed dose", "forgot to take", "stopped taking", "skipped"],
            Some(15),
            &["adherence"],
        ),
        topic(
            "refill",
            "Refills",
            TopicCategory::Operational,
            &["refill", "prescription", "pharmacy", "pick up"],
            None,
            &["adherence"],
        ),
        topic(
            "scheduling",
            "Scheduling",
            TopicCategory::Operational,
            &["appointment", "schedule", "reschedule", "availability"],
            None,
            &[],
        ),
        topic(
            "enrollment",
            "Enrollment",
            TopicCategory::Operational,
            &["enroll", "sign up", "welcome kit", "onboard"],
            None,
            &[],
        ),
        topic(
            "insurance-coverage",
            "Insurance Coverage",
            TopicCategory::Access,
            &["insurance", "coverage", "covered", "prior authorization", "denied", "claim"],
            Some(30),
            &["access-barriers"],
        ),
        topic(
            "affordability",
            "Affordability",
            TopicCategory::Access,
            &["afford", "cost", "expensive", "copay", "out of pocket", "price"],
            Some(25),
            &["access-barriers"],
        ),
        topic(
            "support-experience",
            "Support Experience",
            TopicCategory::Experience,
            &["frustrated", "unhelpful", "wait time", "on hold"],
            None,
            &[],
        ),
        topic(
            "privacy-consent",
            "Privacy & Consent",
            TopicCategory::Compliance,
            &["consent", "privacy", "personal information", "hipaa"],
            None,
            &[],
        ),
    ]
}

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

impl Lexicon {
    /// The shipped patient-support lexicon.
    pub fn builtin() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().map(|w| w.to_string()).collect(),
            negative: NEGATIVE_WORDS.iter().map(|w| w.to_string()).collect(),
            friction: FRICTION_INDICATORS
                .iter()
                .map(|&(phrase, barrier, severity)| FrictionIndicator {
                    phrase: phrase.to_string(),
                    barrier,
                    severity,
                })
                .collect(),
            pivotal: PIVOTAL_PHRASES.iter().map(|p| p.to_string()).collect(),
            topics: builtin_topics(),
        }
    }

    /// A lexicon with every table supplied by the caller. Test fixtures and
    /// admin-configured deployments come through here.
    pub fn new(
        positive: Vec<String>,
        negative: Vec<String>,
        friction: Vec<FrictionIndicator>,
        pivotal: Vec<String>,
        topics: Vec<Topic>,
    ) -> Self {
        Self {
            positive,
            negative,
            friction,
            pivotal,
            topics,
        }
    }

    /// Append user-defined topics after the built-ins. Duplicate ids replace
    /// the earlier definition.
    pub fn with_topics(mut self, extra: Vec<Topic>) -> Self {
        for t in extra {
            if let Some(existing) = self.topics.iter_mut().find(|e| e.id == t.id) {
                *existing = t;
            } else {
                self.topics.push(t);
            }
        }
        self
    }

    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// Reject any topic id absent from the table.
    pub fn validate_topic_refs<'a, I>(&self, ids: I) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in ids {
            if self.topic(id).is_none() {
                return Err(EngineError::UnknownTopicReference {
                    topic_id: id.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Every friction indicator whose phrase appears in the lowercased text.
    pub fn matched_indicators(&self, lower_text: &str) -> Vec<&FrictionIndicator> {
        self.friction
            .iter()
            .filter(|ind| lower_text.contains(ind.phrase.as_str()))
            .collect()
    }
}
