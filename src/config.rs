//! Engine thresholds.
//!
//! Every tunable the trend and insight layers read lives here, with the
//! shipped defaults encoded as serde default functions so a partial JSON
//! config deserializes into a complete one.

use serde::{Deserialize, Serialize};

/// Thresholds for trend classification and spotlight rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Band (in percentage points) within which a period-over-period change
    /// counts as stable rather than up/down.
    #[serde(default = "default_trend_stable_band_pct")]
    pub trend_stable_band_pct: f64,
    /// Topic mention growth that makes an emerging-issue spotlight fire.
    #[serde(default = "default_spike_threshold_pct")]
    pub spike_threshold_pct: f64,
    /// Growth at which an emerging issue escalates from warning to critical.
    #[serde(default = "default_critical_spike_pct")]
    pub critical_spike_pct: f64,
    /// Barrier resolution rate below which a risk-alert spotlight fires.
    #[serde(default = "default_resolution_rate_floor")]
    pub resolution_rate_floor: f64,
    /// Minimum barrier occurrences before a risk alert is worth surfacing.
    #[serde(default = "default_min_barrier_volume")]
    pub min_barrier_volume: usize,
}

fn default_trend_stable_band_pct() -> f64 {
    5.0
}

fn default_spike_threshold_pct() -> f64 {
    40.0
}

fn default_critical_spike_pct() -> f64 {
    80.0
}

fn default_resolution_rate_floor() -> f64 {
    0.60
}

fn default_min_barrier_volume() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_stable_band_pct: default_trend_stable_band_pct(),
            spike_threshold_pct: default_spike_threshold_pct(),
            critical_spike_pct: default_critical_spike_pct(),
            resolution_rate_floor: default_resolution_rate_floor(),
            min_barrier_volume: default_min_barrier_volume(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.trend_stable_band_pct, 5.0);
        assert_eq!(cfg.spike_threshold_pct, 40.0);
        assert_eq!(cfg.critical_spike_pct, 80.0);
        assert_eq!(cfg.resolution_rate_floor, 0.60);
        assert_eq!(cfg.min_barrier_volume, 5);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"spikeThresholdPct": 25.0}"#).unwrap();
        assert_eq!(cfg.spike_threshold_pct, 25.0);
        assert_eq!(cfg.resolution_rate_floor, 0.60, "untouched fields keep defaults");
    }
}
