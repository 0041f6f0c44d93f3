// Harmonic lookup table: per-step roughness and best just ratio.
//
// One table covers `lut_octaves * edo` step differences for a single
// (tuning, complexity weight, bandwidth scale) triple. Entry `k` holds
//
// - the roughness of two tones `k` steps apart, and
// - the best rational match for that interval folded into [1, 2), with its
//   prime limit and palette color, when the approximator accepted one.
//
// Any change to the three build parameters replaces the table wholesale:
// `rebuild` recomputes every entry (O(edo * partials^2)), never patches one.
// Entries are `Copy` and handed out by value, so a heatmap pass can never
// observe a half-built table.
//
// Lookups take `|steps|` and saturate at the last entry when the difference
// exceeds the table span. Harmonic relevance decays with distance, so the
// saturated answer stands in for anything further away.
//
// With the `parallel` feature the entries are computed with rayon; the
// call still blocks until the whole table exists.
//
// See also: `heatmap.rs` (the consumer), `rational.rs`, `roughness.rs`.

use crate::color::{LimitPalette, Rgb};
use crate::config::EngineConfig;
use crate::number_theory::ratio_prime_limit;
use crate::rational::{RationalMatch, best_rational_with};
use crate::roughness::roughness_with;
use crate::tuning::TuningConfig;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An accepted just ratio for one table entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonicMatch {
    pub numerator: u64,
    pub denominator: u64,
    /// Largest prime factor of either term.
    pub limit: u64,
    /// `log2(n * d)`.
    pub complexity: f64,
    /// Signed cents from the fraction to the tempered interval.
    pub error_cents: f64,
    pub color: Rgb,
}

impl HarmonicMatch {
    fn from_rational(m: &RationalMatch, palette: &LimitPalette) -> Self {
        let limit = ratio_prime_limit(m.numerator, m.denominator);
        Self {
            numerator: m.numerator,
            denominator: m.denominator,
            limit,
            complexity: m.complexity,
            error_cents: m.error_cents,
            color: palette.color_for(limit),
        }
    }

    /// `"n/d"`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }
}

/// One row of the table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LutEntry {
    pub roughness: f64,
    /// `None` when no acceptable simple ratio exists for this interval.
    pub harmonic: Option<HarmonicMatch>,
    /// Complexity reported when `harmonic` is `None`.
    unmatched_complexity: f64,
}

impl LutEntry {
    /// Prime limit of the match, or 0 when unmatched.
    pub fn limit(&self) -> u64 {
        self.harmonic.map_or(0, |h| h.limit)
    }

    /// Complexity of the match, or the large sentinel when unmatched.
    pub fn complexity(&self) -> f64 {
        self.harmonic.map_or(self.unmatched_complexity, |h| h.complexity)
    }

    pub fn label(&self) -> Option<String> {
        self.harmonic.map(|h| h.label())
    }

    pub fn color(&self) -> Option<Rgb> {
        self.harmonic.map(|h| h.color)
    }

    pub fn is_matched(&self) -> bool {
        self.harmonic.is_some()
    }
}

/// The precomputed table for one tuning/weight/bandwidth triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonicLut {
    edo: u32,
    complexity_weight: f64,
    bandwidth_scale: f64,
    entries: Vec<LutEntry>,
    unmatched_complexity: f64,
}

impl HarmonicLut {
    /// Build a fresh table.
    pub fn build(
        tuning: &TuningConfig,
        complexity_weight: f64,
        bandwidth_scale: f64,
        config: &EngineConfig,
    ) -> Self {
        let started = Instant::now();
        let edo = tuning.edo_divisions.max(1);
        let span = (edo as usize) * config.lut_octaves.max(1) as usize;

        let make = |steps: usize| -> LutEntry {
            build_entry(steps, edo, complexity_weight, bandwidth_scale, config)
        };

        #[cfg(feature = "parallel")]
        let entries: Vec<LutEntry> = (0..span).into_par_iter().map(make).collect();
        #[cfg(not(feature = "parallel"))]
        let entries: Vec<LutEntry> = (0..span).map(make).collect();

        tracing::debug!(
            edo,
            complexity_weight,
            bandwidth_scale,
            entries = entries.len(),
            matched = entries.iter().filter(|e| e.is_matched()).count(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "harmonic LUT built"
        );

        Self {
            edo,
            complexity_weight,
            bandwidth_scale,
            entries,
            unmatched_complexity: config.unmatched_complexity,
        }
    }

    /// Replace every entry for new build parameters.
    pub fn rebuild(
        &mut self,
        tuning: &TuningConfig,
        complexity_weight: f64,
        bandwidth_scale: f64,
        config: &EngineConfig,
    ) {
        *self = Self::build(tuning, complexity_weight, bandwidth_scale, config);
    }

    /// Whether this table was built for exactly these parameters.
    pub fn is_built_for(&self, tuning: &TuningConfig, complexity_weight: f64, bandwidth_scale: f64) -> bool {
        self.edo == tuning.edo_divisions.max(1)
            && self.complexity_weight == complexity_weight
            && self.bandwidth_scale == bandwidth_scale
    }

    /// Entry for a step difference. Sign is ignored; differences past the
    /// table span saturate at the last entry.
    pub fn lookup(&self, steps_diff: i64) -> LutEntry {
        let Some(last) = self.entries.len().checked_sub(1) else {
            return LutEntry {
                roughness: 0.0,
                harmonic: None,
                unmatched_complexity: self.unmatched_complexity,
            };
        };
        let index = usize::try_from(steps_diff.unsigned_abs()).map_or(last, |i| i.min(last));
        self.entries[index]
    }

    pub fn edo(&self) -> u32 {
        self.edo
    }

    pub fn complexity_weight(&self) -> f64 {
        self.complexity_weight
    }

    pub fn bandwidth_scale(&self) -> f64 {
        self.bandwidth_scale
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LutEntry] {
        &self.entries
    }
}

/// Fold a ratio into [1, 2) by halving; anything below 1 becomes 1.
pub fn normalize_to_octave(ratio: f64) -> f64 {
    let mut r = ratio;
    while r >= 2.0 {
        r /= 2.0;
    }
    if r < 1.0 { 1.0 } else { r }
}

fn build_entry(
    steps: usize,
    edo: u32,
    complexity_weight: f64,
    bandwidth_scale: f64,
    config: &EngineConfig,
) -> LutEntry {
    let ratio = (steps as f64 / edo as f64).exp2();
    let roughness = roughness_with(ratio, bandwidth_scale, &config.roughness);
    let rational = best_rational_with(
        normalize_to_octave(ratio),
        complexity_weight,
        &config.approximator,
    );
    let harmonic = rational
        .matched
        .then(|| HarmonicMatch::from_rational(&rational, &config.palette));
    LutEntry {
        roughness,
        harmonic,
        unmatched_complexity: config.unmatched_complexity,
    }
}
