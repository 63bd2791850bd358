//! Batch analysis with partial-success reporting.
//!
//! One bad transcript never sinks the run: per-conversation failures are
//! collected next to the successfully analyzed records and reported
//! together. The lexicon passed in is the snapshot for the whole batch.

use serde::{Deserialize, Serialize};

use crate::analyze::analyze;
use crate::error::EngineError;
use crate::lexicon::Lexicon;
use crate::types::{ConversationAnalytics, ConversationMeta, Utterance};

/// One transcript plus its call metadata, as delivered by the capture layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptInput {
    pub meta: ConversationMeta,
    pub utterances: Vec<Utterance>,
}

/// A conversation the batch could not analyze.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub conversation_id: String,
    pub error: EngineError,
}

/// Partial-success batch result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub analyzed: Vec<ConversationAnalytics>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Analyze every transcript, collecting failures instead of aborting.
///
/// Output order follows input order. Each conversation depends only on its
/// own utterances and the read-only lexicon, so callers may also fan the
/// inputs out across threads and concatenate; this sequential form is the
/// reference behavior.
pub fn analyze_batch(lexicon: &Lexicon, inputs: &[TranscriptInput]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for input in inputs {
        match analyze(lexicon, &input.meta, &input.utterances) {
            Ok(record) => outcome.analyzed.push(record),
            Err(error) => {
                log::warn!(
                    "skipping conversation '{}': {}",
                    input.meta.conversation_id,
                    error
                );
                outcome.failures.push(BatchFailure {
                    conversation_id: input.meta.conversation_id.clone(),
                    error,
                });
            }
        }
    }

    log::info!(
        "batch analyzed {} conversation(s), {} failure(s)",
        outcome.analyzed.len(),
        outcome.failures.len()
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::types::{ConversationType, SpeakerRole};

    fn input(id: &str, texts: &[&str]) -> TranscriptInput {
        TranscriptInput {
            meta: ConversationMeta {
                conversation_id: id.to_string(),
                patient_id: format!("patient-{}", id),
                conversation_type: ConversationType::Inbound,
                started_at: Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap(),
                duration_seconds: 300,
            },
            utterances: texts
                .iter()
                .enumerate()
                .map(|(i, t)| Utterance {
                    speaker: if i % 2 == 0 {
                        SpeakerRole::Patient
                    } else {
                        SpeakerRole::AiAgent
                    },
                    speaker_label: "x".to_string(),
                    text: t.to_string(),
                    timestamp: Utc.with_ymd_and_hms(2026, 3, 10, 9, i as u32, 0).unwrap(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_conversation_collected_not_fatal() {
        let _ = env_logger::builder().is_test(true).try_init();
        let lex = Lexicon::builtin();
        let inputs = vec![
            input("good-1", &["I need a refill", "I can help, you're all set", "Thanks"]),
            input("bad", &[]),
            input("good-2", &["Hello", "Hi"]),
        ];
        let outcome = analyze_batch(&lex, &inputs);

        assert_eq!(outcome.analyzed.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.failures[0].conversation_id, "bad");
        assert!(matches!(
            outcome.failures[0].error,
            EngineError::EmptyConversation { .. }
        ));
        assert!(
            outcome.analyzed.iter().all(|c| c.conversation_id != "bad"),
            "failed conversation never appears among successes"
        );
    }

    #[test]
    fn test_output_preserves_input_order() {
        let lex = Lexicon::builtin();
        let inputs = vec![input("a", &["Hi"]), input("b", &["Hi"]), input("c", &["Hi"])];
        let outcome = analyze_batch(&lex, &inputs);
        let ids: Vec<&str> = outcome
            .analyzed
            .iter()
            .map(|c| c.conversation_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(outcome.is_complete());
    }
}
