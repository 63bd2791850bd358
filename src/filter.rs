//! Query/filter layer over analyzed conversations.
//!
//! A `FilterSpec` is a conjunction of dimensions; within a set-valued
//! dimension membership is a disjunction, and an absent dimension matches
//! everything. Validation happens up front: inverted ranges and unknown
//! topic ids are rejected before a single conversation is touched. Filtering
//! is deterministic and preserves input order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::lexicon::Lexicon;
use crate::types::{
    ConversationAnalytics, ConversationType, ResolutionStatus, RiskLevel, Sentiment,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sentiments: Vec<Sentiment>,
    pub topics: Vec<String>,
    pub conversation_types: Vec<ConversationType>,
    pub resolution_statuses: Vec<ResolutionStatus>,
    pub risk_levels: Vec<RiskLevel>,
    pub csat_min: Option<u8>,
    pub csat_max: Option<u8>,
    pub duration_min_seconds: Option<u32>,
    pub duration_max_seconds: Option<u32>,
    pub friction_detected: Option<bool>,
    /// Case-insensitive substring search over utterance text.
    pub search: Option<String>,
}

impl FilterSpec {
    /// Reject inverted ranges and unknown topic references.
    pub fn validate(&self, lexicon: &Lexicon) -> Result<(), EngineError> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(EngineError::InconsistentFilterRange { field: "date" });
            }
        }
        if let (Some(min), Some(max)) = (self.csat_min, self.csat_max) {
            if min > max {
                return Err(EngineError::InconsistentFilterRange { field: "csat" });
            }
        }
        if let (Some(min), Some(max)) = (self.duration_min_seconds, self.duration_max_seconds) {
            if min > max {
                return Err(EngineError::InconsistentFilterRange { field: "duration" });
            }
        }
        lexicon.validate_topic_refs(self.topics.iter().map(String::as_str))
    }

    fn matches(&self, c: &ConversationAnalytics) -> bool {
        let date = c.call_date();
        if let Some(from) = self.date_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if date > to {
                return false;
            }
        }
        if !self.sentiments.is_empty() && !self.sentiments.contains(&c.overall_sentiment) {
            return false;
        }
        if !self.topics.is_empty() && !self.topics.iter().any(|t| c.mentions_topic(t)) {
            return false;
        }
        if !self.conversation_types.is_empty()
            && !self.conversation_types.contains(&c.conversation_type)
        {
            return false;
        }
        if !self.resolution_statuses.is_empty()
            && !self.resolution_statuses.contains(&c.resolution_status)
        {
            return false;
        }
        if !self.risk_levels.is_empty() && !self.risk_levels.contains(&c.risk_level) {
            return false;
        }
        // A csat bound only matches conversations that carry a survey score.
        if self.csat_min.is_some() || self.csat_max.is_some() {
            match c.review.csat {
                Some(csat) => {
                    if self.csat_min.is_some_and(|min| csat < min)
                        || self.csat_max.is_some_and(|max| csat > max)
                    {
                        return false;
                    }
                }
                None => return false,
            }
        }
        if self
            .duration_min_seconds
            .is_some_and(|min| c.duration_seconds < min)
            || self
                .duration_max_seconds
                .is_some_and(|max| c.duration_seconds > max)
        {
            return false;
        }
        if let Some(expected) = self.friction_detected {
            if c.friction_points.is_empty() == expected {
                return false;
            }
        }
        if let Some(ref needle) = self.search {
            let needle = needle.to_lowercase();
            if !needle.is_empty()
                && !c
                    .messages
                    .iter()
                    .any(|m| m.utterance.text.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

/// Apply a validated filter, preserving input order.
pub fn filter_conversations(
    lexicon: &Lexicon,
    conversations: &[ConversationAnalytics],
    spec: &FilterSpec,
) -> Result<Vec<ConversationAnalytics>, EngineError> {
    spec.validate(lexicon)?;
    Ok(conversations
        .iter()
        .filter(|c| spec.matches(c))
        .cloned()
        .collect())
}
