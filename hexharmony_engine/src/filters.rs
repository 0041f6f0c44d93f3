// User-facing heatmap filters.
//
// `HeatmapFilters` bundles the three things the legend panel controls:
// - which prime-limit buckets may color a cell,
// - which of the three blend factors take part (consonance, clarity, tuning),
// - the critical-bandwidth scale fed to the roughness model.
//
// Limits are grouped into the seven legend buckets by `limit_bucket`: 0–2 are
// "octave" (bucket 1), the primes 3..=13 are their own bucket, and anything
// above 13 shares bucket 17 (">13"). Filtering happens on the bucket, so a
// 19-limit match is toggled by the same switch as a 17-limit one.
//
// Changing `bandwidth_scale` invalidates the LUT. Limit and factor toggles
// only require a heatmap recompute.
//
// See also: `heatmap.rs` which applies these, `color.rs` for the legend
// swatches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The legend buckets, in display order.
pub const LIMIT_BUCKETS: [u64; 7] = [1, 3, 5, 7, 11, 13, 17];

/// Map a prime limit to its legend bucket.
pub fn limit_bucket(limit: u64) -> u64 {
    match limit {
        0..=2 => 1,
        3..=13 => limit,
        _ => 17,
    }
}

/// One of the three blend inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Factor {
    Consonance,
    Clarity,
    Tuning,
}

impl Factor {
    pub const ALL: [Factor; 3] = [Factor::Consonance, Factor::Clarity, Factor::Tuning];
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Factor::Consonance => "consonance",
            Factor::Clarity => "clarity",
            Factor::Tuning => "tuning",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorToggles {
    pub consonance: bool,
    pub clarity: bool,
    pub tuning: bool,
}

impl Default for FactorToggles {
    fn default() -> Self {
        Self {
            consonance: true,
            clarity: true,
            tuning: true,
        }
    }
}

impl FactorToggles {
    pub fn is_enabled(&self, factor: Factor) -> bool {
        match factor {
            Factor::Consonance => self.consonance,
            Factor::Clarity => self.clarity,
            Factor::Tuning => self.tuning,
        }
    }

    /// Returns whether the toggle changed.
    pub fn set(&mut self, factor: Factor, enabled: bool) -> bool {
        let slot = match factor {
            Factor::Consonance => &mut self.consonance,
            Factor::Clarity => &mut self.clarity,
            Factor::Tuning => &mut self.tuning,
        };
        let changed = *slot != enabled;
        *slot = enabled;
        changed
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatmapFilters {
    /// Enabled legend buckets (see `limit_bucket`).
    pub limits: BTreeSet<u64>,
    pub factors: FactorToggles,
    pub bandwidth_scale: f64,
}

impl Default for HeatmapFilters {
    fn default() -> Self {
        Self::with_bandwidth(1.0)
    }
}

impl HeatmapFilters {
    /// Everything enabled, with the given bandwidth scale.
    pub fn with_bandwidth(bandwidth_scale: f64) -> Self {
        Self {
            limits: LIMIT_BUCKETS.into_iter().collect(),
            factors: FactorToggles::default(),
            bandwidth_scale,
        }
    }

    /// Whether a match of this prime limit may color a cell.
    pub fn limit_enabled(&self, limit: u64) -> bool {
        self.limits.contains(&limit_bucket(limit))
    }

    /// Enable or disable the bucket containing `limit`. Returns whether the
    /// set changed.
    pub fn set_limit(&mut self, limit: u64, enabled: bool) -> bool {
        let bucket = limit_bucket(limit);
        if enabled {
            self.limits.insert(bucket)
        } else {
            self.limits.remove(&bucket)
        }
    }

    pub fn factor_enabled(&self, factor: Factor) -> bool {
        self.factors.is_enabled(factor)
    }

    pub fn set_factor(&mut self, factor: Factor, enabled: bool) -> bool {
        self.factors.set(factor, enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets() {
        assert_eq!(limit_bucket(0), 1);
        assert_eq!(limit_bucket(1), 1);
        assert_eq!(limit_bucket(2), 1);
        assert_eq!(limit_bucket(7), 7);
        assert_eq!(limit_bucket(13), 13);
        assert_eq!(limit_bucket(17), 17);
        assert_eq!(limit_bucket(19), 17);
        assert_eq!(limit_bucket(1009), 17);
    }

    #[test]
    fn defaults_enable_everything() {
        let filters = HeatmapFilters::default();
        for limit in [1, 2, 3, 5, 7, 11, 13, 17, 19, 23] {
            assert!(filters.limit_enabled(limit), "{limit}");
        }
        for factor in Factor::ALL {
            assert!(filters.factor_enabled(factor));
        }
        assert_eq!(filters.bandwidth_scale, 1.0);
    }

    #[test]
    fn high_limits_share_a_switch() {
        let mut filters = HeatmapFilters::default();
        assert!(filters.set_limit(19, false));
        assert!(!filters.limit_enabled(17));
        assert!(!filters.limit_enabled(23));
        assert!(filters.limit_enabled(13));
        // Already off.
        assert!(!filters.set_limit(17, false));
        assert!(filters.set_limit(17, true));
        assert!(filters.limit_enabled(19));
    }

    #[test]
    fn factor_toggles_report_changes() {
        let mut filters = HeatmapFilters::default();
        assert!(filters.set_factor(Factor::Clarity, false));
        assert!(!filters.set_factor(Factor::Clarity, false));
        assert!(!filters.factor_enabled(Factor::Clarity));
        assert!(filters.factor_enabled(Factor::Tuning));
        assert_eq!(Factor::Tuning.to_string(), "tuning");
    }
}
