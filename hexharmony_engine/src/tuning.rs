// Tuning geometry: hex-lattice coordinates → EDO pitch steps.
//
// A `TuningConfig` describes one equal division of the octave plus the
// isomorphic layout that places it on the hex grid: one unit along the q axis
// adds `q_step` EDO steps, one unit along r adds `r_step`. The white-key set
// marks a diatonic-like reference subset of note indices, used by renderers
// for the idle (no heatmap) key coloring.
//
// Named preset constructors cover the reference systems (12, 19, 31, 53 and
// 72 EDO), each with a layout whose q axis is roughly a whole tone and whose
// r axis is roughly a semitone.
//
// Everything here is pure and total for all integer inputs.
//
// See also: `lattice.rs` which stores the derived per-cell values,
// `config.rs` which holds the preset table.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An EDO tuning and its hex-lattice step mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Display name, e.g. "31 TET".
    pub name: String,
    /// Steps per octave.
    pub edo_divisions: u32,
    /// Pitch steps per unit move along q.
    pub q_step: i64,
    /// Pitch steps per unit move along r.
    pub r_step: i64,
    /// Note indices in `[0, edo_divisions)` treated as "white keys".
    pub white_keys: BTreeSet<u32>,
}

impl TuningConfig {
    pub fn new(
        name: impl Into<String>,
        edo_divisions: u32,
        q_step: i64,
        r_step: i64,
        white_keys: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            name: name.into(),
            edo_divisions,
            q_step,
            r_step,
            white_keys: white_keys.into_iter().collect(),
        }
    }

    /// 12-tone equal temperament.
    pub fn edo_12() -> Self {
        Self::new("12 TET", 12, 2, 1, [0, 2, 4, 5, 7, 9, 11])
    }

    /// 19-EDO: meantone-like, with distinct sharps and flats.
    pub fn edo_19() -> Self {
        Self::new("19 TET", 19, 3, 2, [0, 3, 6, 8, 11, 14, 17])
    }

    /// 31-EDO: quarter-comma meantone approximation.
    pub fn edo_31() -> Self {
        Self::new("31 TET", 31, 5, 3, [0, 5, 10, 13, 18, 23, 28])
    }

    /// 53-EDO: near-Pythagorean fifths and good 5-limit thirds.
    pub fn edo_53() -> Self {
        Self::new("53 TET", 53, 9, 4, [0, 9, 18, 22, 31, 40, 49])
    }

    /// 72-EDO: twelfth-tones, good through the 11-limit.
    pub fn edo_72() -> Self {
        Self::new("72 TET", 72, 12, 5, [0, 12, 24, 30, 42, 54, 66])
    }

    /// Linear pitch step of the cell at `(q, r)`. Signed; wraps on overflow
    /// so absurd step sizes still give a well-defined note index.
    pub fn pitch_step(&self, q: i32, r: i32) -> i64 {
        i64::from(q)
            .wrapping_mul(self.q_step)
            .wrapping_add(i64::from(r).wrapping_mul(self.r_step))
    }

    /// Pitch step folded into `[0, edo_divisions)`.
    pub fn note_index(&self, pitch_step: i64) -> u32 {
        let edo = self.edo_divisions.max(1) as i64;
        pitch_step.rem_euclid(edo) as u32
    }

    pub fn is_white_key(&self, note_index: u32) -> bool {
        self.white_keys.contains(&note_index)
    }

    /// Frequency ratio of `steps` EDO steps: `2^(steps / edo)`.
    pub fn step_ratio(&self, steps: i64) -> f64 {
        (steps as f64 / self.edo_divisions.max(1) as f64).exp2()
    }

    /// Size of `steps` EDO steps in cents.
    pub fn step_cents(&self, steps: i64) -> f64 {
        1200.0 * steps as f64 / self.edo_divisions.max(1) as f64
    }

    /// Frequency of a pitch step relative to `base_hz` at step 0.
    pub fn frequency(&self, pitch_step: i64, base_hz: f64) -> f64 {
        base_hz * self.step_ratio(pitch_step)
    }

    /// Reject tunings with no steps or white keys outside the octave.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |reason: String| ConfigError::InvalidTuning {
            name: self.name.clone(),
            edo: self.edo_divisions,
            reason,
        };
        if self.edo_divisions == 0 {
            return Err(invalid("EDO must have at least one step".into()));
        }
        if let Some(&bad) = self.white_keys.iter().find(|&&k| k >= self.edo_divisions) {
            return Err(invalid(format!("white key {bad} is outside the octave")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_step_is_linear() {
        let t = TuningConfig::edo_12();
        assert_eq!(t.pitch_step(0, 0), 0);
        assert_eq!(t.pitch_step(1, 0), 2);
        assert_eq!(t.pitch_step(0, 1), 1);
        assert_eq!(t.pitch_step(3, 1), 7);
        assert_eq!(t.pitch_step(-4, -3), -11);
    }

    #[test]
    fn note_index_wraps_negative_steps() {
        let t = TuningConfig::edo_12();
        assert_eq!(t.note_index(-1), 11);
        assert_eq!(t.note_index(-12), 0);
        assert_eq!(t.note_index(-13), 11);
        assert_eq!(t.note_index(25), 1);
        for step in -100..100 {
            assert!(t.note_index(step) < 12);
        }
    }

    #[test]
    fn note_index_for_large_coordinates() {
        let t = TuningConfig::edo_72();
        let step = t.pitch_step(i32::MAX, i32::MIN);
        assert!(t.note_index(step) < 72);
    }

    #[test]
    fn oversized_steps_wrap_instead_of_overflowing() {
        let t = TuningConfig::new("wide", 12, i64::MAX / 4, 1, [0]);
        t.validate().unwrap();
        for (q, r) in [(5, -3), (-10, 10), (i32::MAX, i32::MAX)] {
            let step = t.pitch_step(q, r);
            assert!(t.note_index(step) < 12);
        }
        assert_eq!(t.pitch_step(0, 7), 7);
    }

    #[test]
    fn white_keys_of_12_edo() {
        let t = TuningConfig::edo_12();
        let whites: Vec<u32> = (0..12).filter(|&n| t.is_white_key(n)).collect();
        assert_eq!(whites, vec![0, 2, 4, 5, 7, 9, 11]);
    }

    #[test]
    fn frequency_doubles_per_octave() {
        let t = TuningConfig::edo_31();
        let base = 261.63;
        assert!((t.frequency(31, base) - 2.0 * base).abs() < 1e-9);
        assert!((t.frequency(-31, base) - base / 2.0).abs() < 1e-9);
        assert!((t.step_cents(18) - 696.774).abs() < 1e-3);
    }

    #[test]
    fn presets_validate() {
        for t in [
            TuningConfig::edo_12(),
            TuningConfig::edo_19(),
            TuningConfig::edo_31(),
            TuningConfig::edo_53(),
            TuningConfig::edo_72(),
        ] {
            t.validate().unwrap();
        }
    }

    #[test]
    fn rejects_zero_edo_and_stray_white_keys() {
        assert!(TuningConfig::new("empty", 0, 1, 1, []).validate().is_err());
        assert!(TuningConfig::new("stray", 5, 1, 1, [0, 5]).validate().is_err());
    }
}
