//! Scoring and derivation rule tables.
//!
//! Quality, compliance, empathy and churn are base-plus-adjustment scores;
//! risk level and resolution status are decision tables. Every rule is a
//! named `(condition, outcome)` entry so it can be audited and unit-tested
//! on its own, and changed without touching control flow.

use crate::types::{ResolutionStatus, RiskLevel};

/// The fold of per-utterance classifier output the rule tables read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationSignals {
    pub utterance_count: usize,
    pub patient_turns: usize,
    pub agent_turns: usize,
    /// Agent turns classified positive.
    pub agent_positive: usize,
    pub mean_score: f64,
    /// Last-turn score minus first-turn score.
    pub shift: f64,
    /// Score of the final utterance.
    pub closing_score: f64,
    pub key_moments: usize,
    pub friction_total: usize,
    pub friction_high: usize,
    pub friction_unresolved: usize,
    /// High-severity points left unresolved at hangup.
    pub high_unresolved: usize,
    pub friction_clinical: usize,
    pub friction_affordability: usize,
    pub outcome_achieved: bool,
    pub callback_requested: bool,
}

// ---------------------------------------------------------------------------
// Score adjustment tables
// ---------------------------------------------------------------------------

/// A named score adjustment: `delta` applies when `applies` holds.
pub struct ScoreRule {
    pub name: &'static str,
    pub applies: fn(&ConversationSignals) -> bool,
    pub delta: i32,
}

/// A call recovered when sentiment climbed by at least this much.
pub const RECOVERY_SHIFT: f64 = 0.4;
/// A call deteriorated when sentiment fell by at least this much.
pub const DETERIORATION_SHIFT: f64 = -0.4;

pub const QUALITY_BASE: i32 = 70;
pub const QUALITY_RULES: &[ScoreRule] = &[
    ScoreRule {
        name: "outcome-achieved",
        applies: |s| s.outcome_achieved,
        delta: 12,
    },
    ScoreRule {
        name: "positive-close",
        applies: |s| s.closing_score > 0.0,
        delta: 8,
    },
    ScoreRule {
        name: "recovered-call",
        applies: |s| s.shift >= RECOVERY_SHIFT,
        delta: 8,
    },
    ScoreRule {
        name: "negative-close",
        applies: |s| s.closing_score < 0.0,
        delta: -10,
    },
    ScoreRule {
        name: "unresolved-friction",
        applies: |s| s.friction_unresolved > 0,
        delta: -15,
    },
    ScoreRule {
        name: "heavy-friction-load",
        applies: |s| s.friction_total >= 3,
        delta: -10,
    },
];

pub const COMPLIANCE_BASE: i32 = 85;
pub const COMPLIANCE_RULES: &[ScoreRule] = &[
    ScoreRule {
        name: "adverse-event-worked-to-confirmation",
        applies: |s| s.friction_clinical > 0 && s.outcome_achieved,
        delta: 10,
    },
    ScoreRule {
        name: "adverse-event-left-open",
        applies: |s| s.friction_clinical > 0 && !s.outcome_achieved,
        delta: -15,
    },
    ScoreRule {
        name: "callback-honored",
        applies: |s| s.callback_requested && s.outcome_achieved,
        delta: 5,
    },
    ScoreRule {
        name: "callback-dropped",
        applies: |s| s.callback_requested && !s.outcome_achieved,
        delta: -10,
    },
];

pub const EMPATHY_BASE: i32 = 60;
pub const EMPATHY_RULES: &[ScoreRule] = &[
    ScoreRule {
        name: "agent-positive-language",
        applies: |s| s.agent_positive > 0,
        delta: 15,
    },
    ScoreRule {
        name: "agent-positive-majority",
        applies: |s| s.agent_turns > 0 && s.agent_positive * 2 >= s.agent_turns,
        delta: 10,
    },
    ScoreRule {
        name: "patient-ends-positive",
        applies: |s| s.closing_score > 0.0,
        delta: 10,
    },
    ScoreRule {
        name: "distress-unacknowledged",
        applies: |s| s.friction_unresolved > 0 && s.agent_positive == 0,
        delta: -20,
    },
    ScoreRule {
        name: "no-agent-participation",
        applies: |s| s.agent_turns == 0,
        delta: -10,
    },
];

pub const CHURN_BASE: i32 = 20;
pub const CHURN_RULES: &[ScoreRule] = &[
    ScoreRule {
        name: "negative-overall",
        applies: |s| s.mean_score < -0.2,
        delta: 25,
    },
    ScoreRule {
        name: "deteriorating-call",
        applies: |s| s.shift <= DETERIORATION_SHIFT,
        delta: 15,
    },
    ScoreRule {
        name: "high-friction-unresolved",
        applies: |s| s.high_unresolved > 0,
        delta: 25,
    },
    ScoreRule {
        name: "affordability-barrier",
        applies: |s| s.friction_affordability > 0,
        delta: 10,
    },
    ScoreRule {
        name: "recovered-call",
        applies: |s| s.shift >= RECOVERY_SHIFT,
        delta: -10,
    },
    ScoreRule {
        name: "outcome-achieved",
        applies: |s| s.outcome_achieved,
        delta: -10,
    },
];

/// Apply a score table: base plus the delta of every rule that holds,
/// clamped to 0..=100. Returns the score and the fired rule names.
pub fn apply_score_rules(
    base: i32,
    rules: &[ScoreRule],
    signals: &ConversationSignals,
) -> (u8, Vec<&'static str>) {
    let mut score = base;
    let mut fired = Vec::new();
    for rule in rules {
        if (rule.applies)(signals) {
            score += rule.delta;
            fired.push(rule.name);
        }
    }
    (score.clamp(0, 100) as u8, fired)
}

// ---------------------------------------------------------------------------
// Risk level table
// ---------------------------------------------------------------------------

/// Churn risk at or above this forces critical risk.
pub const CHURN_CRITICAL_FLOOR: u8 = 75;

/// A risk floor: the level holds when `applies` does. The final level is the
/// highest floor that fires (low when none does).
pub struct RiskRule {
    pub name: &'static str,
    pub applies: fn(&ConversationSignals, u8) -> bool,
    pub at_least: RiskLevel,
}

pub const RISK_RULES: &[RiskRule] = &[
    RiskRule {
        name: "churn-critical",
        applies: |_, churn| churn >= CHURN_CRITICAL_FLOOR,
        at_least: RiskLevel::Critical,
    },
    RiskRule {
        name: "high-friction-open-at-hangup",
        applies: |s, _| s.high_unresolved > 0 && !s.outcome_achieved,
        at_least: RiskLevel::High,
    },
    RiskRule {
        name: "high-severity-friction",
        applies: |s, _| s.friction_high > 0,
        at_least: RiskLevel::Medium,
    },
    RiskRule {
        name: "unresolved-friction",
        applies: |s, _| s.friction_unresolved > 0,
        at_least: RiskLevel::Medium,
    },
    RiskRule {
        name: "negative-overall",
        applies: |s, _| s.mean_score < -0.2,
        at_least: RiskLevel::Medium,
    },
];

pub fn derive_risk_level(signals: &ConversationSignals, churn_risk: u8) -> RiskLevel {
    RISK_RULES
        .iter()
        .filter(|r| (r.applies)(signals, churn_risk))
        .map(|r| r.at_least)
        .max()
        .unwrap_or(RiskLevel::Low)
}

// ---------------------------------------------------------------------------
// Resolution status table
// ---------------------------------------------------------------------------

/// Ordered decision table; the first matching row decides the status.
pub struct ResolutionRule {
    pub name: &'static str,
    pub applies: fn(&ConversationSignals) -> bool,
    pub status: ResolutionStatus,
}

pub const RESOLUTION_RULES: &[ResolutionRule] = &[
    // High-severity friction still open at hangup escalates unless the
    // outcome flag indicates the call landed anyway.
    ResolutionRule {
        name: "forced-escalation",
        applies: |s| s.high_unresolved > 0 && !s.outcome_achieved,
        status: ResolutionStatus::Escalated,
    },
    ResolutionRule {
        name: "callback-requested",
        applies: |s| s.callback_requested && !s.outcome_achieved,
        status: ResolutionStatus::CallbackRequested,
    },
    ResolutionRule {
        name: "outcome-achieved",
        applies: |s| s.outcome_achieved,
        status: ResolutionStatus::Resolved,
    },
    ResolutionRule {
        name: "clean-positive-close",
        applies: |s| s.friction_unresolved == 0 && s.closing_score > 0.0,
        status: ResolutionStatus::Resolved,
    },
];

/// Status plus the deciding rule name (feeds the escalation reason).
pub fn derive_resolution(signals: &ConversationSignals) -> (ResolutionStatus, &'static str) {
    RESOLUTION_RULES
        .iter()
        .find(|r| (r.applies)(signals))
        .map(|r| (r.status, r.name))
        .unwrap_or((ResolutionStatus::Unresolved, "default-unresolved"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> ConversationSignals {
        ConversationSignals {
            utterance_count: 6,
            patient_turns: 3,
            agent_turns: 3,
            agent_positive: 1,
            mean_score: 0.1,
            shift: 0.0,
            closing_score: 0.2,
            key_moments: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_score_rules_clamps() {
        let mut s = signals();
        s.friction_unresolved = 5;
        s.friction_total = 9;
        s.closing_score = -0.9;
        s.mean_score = -0.9;
        let (score, fired) = apply_score_rules(10, QUALITY_RULES, &s);
        assert_eq!(score, 0, "never below zero");
        assert!(fired.contains(&"unresolved-friction"));

        let mut s = signals();
        s.outcome_achieved = true;
        s.shift = 0.8;
        let (score, _) = apply_score_rules(95, QUALITY_RULES, &s);
        assert_eq!(score, 100, "never above 100");
    }

    #[test]
    fn test_quality_rewards_recovery() {
        let mut s = signals();
        s.shift = 0.5;
        let (with_recovery, fired) = apply_score_rules(QUALITY_BASE, QUALITY_RULES, &s);
        assert!(fired.contains(&"recovered-call"));

        s.shift = 0.0;
        let (without, _) = apply_score_rules(QUALITY_BASE, QUALITY_RULES, &s);
        assert!(with_recovery > without);
    }

    #[test]
    fn test_compliance_penalizes_open_adverse_event() {
        let mut s = signals();
        s.friction_clinical = 1;
        s.outcome_achieved = false;
        let (open, fired) = apply_score_rules(COMPLIANCE_BASE, COMPLIANCE_RULES, &s);
        assert!(fired.contains(&"adverse-event-left-open"));

        s.outcome_achieved = true;
        let (worked, _) = apply_score_rules(COMPLIANCE_BASE, COMPLIANCE_RULES, &s);
        assert!(worked > open);
    }

    #[test]
    fn test_empathy_distress_unacknowledged() {
        let mut s = signals();
        s.friction_unresolved = 1;
        s.agent_positive = 0;
        let (_, fired) = apply_score_rules(EMPATHY_BASE, EMPATHY_RULES, &s);
        assert!(fired.contains(&"distress-unacknowledged"));
    }

    #[test]
    fn test_churn_factors_stack() {
        let mut s = signals();
        s.mean_score = -0.5;
        s.shift = -0.6;
        s.high_unresolved = 1;
        s.friction_affordability = 1;
        let (churn, fired) = apply_score_rules(CHURN_BASE, CHURN_RULES, &s);
        assert_eq!(fired.len(), 4);
        assert_eq!(churn, 95);
    }

    #[test]
    fn test_risk_floor_high_unresolved() {
        let mut s = signals();
        s.high_unresolved = 1;
        s.friction_high = 1;
        s.friction_unresolved = 1;
        assert_eq!(derive_risk_level(&s, 0), RiskLevel::High);

        // The outcome flag softens the floor to medium.
        s.outcome_achieved = true;
        assert_eq!(derive_risk_level(&s, 0), RiskLevel::Medium);
    }

    #[test]
    fn test_risk_churn_forces_critical() {
        let s = signals();
        assert_eq!(derive_risk_level(&s, CHURN_CRITICAL_FLOOR), RiskLevel::Critical);
        assert_eq!(derive_risk_level(&s, CHURN_CRITICAL_FLOOR - 1), RiskLevel::Low);
    }

    #[test]
    fn test_resolution_order_escalation_first() {
        let mut s = signals();
        s.high_unresolved = 1;
        s.callback_requested = true;
        let (status, rule) = derive_resolution(&s);
        assert_eq!(status, ResolutionStatus::Escalated);
        assert_eq!(rule, "forced-escalation");
    }

    #[test]
    fn test_resolution_callback() {
        let mut s = signals();
        s.callback_requested = true;
        s.closing_score = 0.5;
        let (status, _) = derive_resolution(&s);
        assert_eq!(status, ResolutionStatus::CallbackRequested);
    }

    #[test]
    fn test_resolution_outcome_overrides_callback() {
        let mut s = signals();
        s.callback_requested = true;
        s.outcome_achieved = true;
        let (status, _) = derive_resolution(&s);
        assert_eq!(status, ResolutionStatus::Resolved);
    }

    #[test]
    fn test_resolution_default_unresolved() {
        let mut s = signals();
        s.closing_score = 0.0;
        let (status, rule) = derive_resolution(&s);
        assert_eq!(status, ResolutionStatus::Unresolved);
        assert_eq!(rule, "default-unresolved");
    }
}
