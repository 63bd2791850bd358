//! Engine error taxonomy.
//!
//! Per-conversation failures during a batch are collected into the batch
//! outcome rather than aborting the run; see `batch::BatchOutcome`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A conversation with zero utterances has no meaningful aggregates.
    #[error("conversation '{conversation_id}' has no utterances")]
    EmptyConversation { conversation_id: String },

    /// A filter or aggregation referenced a topic id that is not in the
    /// supplied topic table.
    #[error("unknown topic reference: '{topic_id}'")]
    UnknownTopicReference { topic_id: String },

    /// A range filter with inverted bounds is rejected before filtering.
    #[error("inconsistent {field} range: min exceeds max")]
    InconsistentFilterRange { field: &'static str },
}

impl EngineError {
    /// True for errors scoped to a single conversation. Batch processing
    /// records these per conversation and keeps going.
    pub fn is_per_conversation(&self) -> bool {
        matches!(self, EngineError::EmptyConversation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = EngineError::EmptyConversation {
            conversation_id: "conv-1".to_string(),
        };
        assert_eq!(e.to_string(), "conversation 'conv-1' has no utterances");

        let e = EngineError::UnknownTopicReference {
            topic_id: "topic-x".to_string(),
        };
        assert!(e.to_string().contains("topic-x"));

        let e = EngineError::InconsistentFilterRange { field: "duration" };
        assert!(e.to_string().contains("duration"));
    }

    #[test]
    fn test_per_conversation_classification() {
        assert!(EngineError::EmptyConversation {
            conversation_id: "c".to_string()
        }
        .is_per_conversation());
        assert!(!EngineError::UnknownTopicReference {
            topic_id: "t".to_string()
        }
        .is_per_conversation());
    }
}
