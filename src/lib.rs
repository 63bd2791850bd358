//! Conversation intelligence for patient-support call programs.
//!
//! The pipeline turns completed transcripts into structured analytics:
//! per-utterance signal tags, per-conversation composite scores,
//! corpus-level trends, root-cause barrier rollups and auto-generated
//! spotlights. Every layer is a pure function over immutable input plus a
//! read-only [`lexicon::Lexicon`] snapshot, so conversations can be analyzed
//! concurrently and any computation replayed bit-for-bit.

pub mod aggregate;
pub mod analyze;
pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod lexicon;
pub mod root_cause;
pub mod spotlight;
pub mod types;

pub use aggregate::{aggregate, aggregate_partial, topic_trends};
pub use analyze::analyze;
pub use batch::{analyze_batch, BatchFailure, BatchOutcome, TranscriptInput};
pub use classify::classify;
pub use config::EngineConfig;
pub use error::EngineError;
pub use filter::{filter_conversations, FilterSpec};
pub use lexicon::{FrictionIndicator, Lexicon};
pub use root_cause::analyze_barriers;
pub use spotlight::generate_spotlights;
pub use types::{
    AnalyzedUtterance, BarrierType, ConversationAnalytics, ConversationMeta, ConversationMetrics,
    ConversationType, FrictionPoint, ResolutionStatus, RiskLevel, RootCauseAnalysis, Sentiment,
    Severity, SpeakerRole, Spotlight, SpotlightKind, SpotlightSeverity, Topic, TopicCategory,
    TopicTrend, TrendDirection, Utterance,
};
