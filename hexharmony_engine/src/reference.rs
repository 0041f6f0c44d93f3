// Just-intonation reference data for the linear (one-octave) view.
//
// `reference_intervals` lists every reduced fraction inside the octave up to a
// denominator bound and prime limit, plus the octave itself, ordered by size.
// Renderers draw these as a background ruler.
//
// `interval_projections` places the sounding notes on that ruler: each active
// step is measured from the first one (absolute difference, folded into one
// octave), snapped to its best rational at a light complexity weight, and
// reported with the signed tempered-minus-just error.
//
// See also: `rational.rs` for the approximator, `color.rs` for the palette.

use crate::color::{LimitPalette, Rgb};
use crate::config::ApproximatorParams;
use crate::number_theory::{gcd, ratio_prime_limit};
use crate::rational::{best_rational_with, ratio_to_cents};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_LIMIT: u64 = 13;
pub const DEFAULT_MAX_DENOMINATOR: u64 = 32;
/// Complexity weight used when snapping projections.
pub const PROJECTION_COMPLEXITY_WEIGHT: f64 = 2.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceInterval {
    pub numerator: u64,
    pub denominator: u64,
    pub cents: f64,
    pub limit: u64,
    pub color: Rgb,
}

impl ReferenceInterval {
    fn new(numerator: u64, denominator: u64, palette: &LimitPalette) -> Self {
        let limit = ratio_prime_limit(numerator, denominator);
        Self {
            numerator,
            denominator,
            cents: ratio_to_cents(numerator as f64 / denominator as f64),
            limit,
            color: palette.color_for(limit),
        }
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }
}

/// Reduced `n/d` with `d <= max_denominator` and `d <= n < 2d` whose prime
/// limit is at most `max_limit`, plus `2/1`, ascending by cents.
pub fn reference_intervals(
    max_limit: u64,
    max_denominator: u64,
    palette: &LimitPalette,
) -> Vec<ReferenceInterval> {
    let mut intervals: Vec<ReferenceInterval> = (1..=max_denominator)
        .flat_map(|d| (d..2 * d).map(move |n| (n, d)))
        .filter(|&(n, d)| gcd(n, d) == 1 && ratio_prime_limit(n, d) <= max_limit)
        .map(|(n, d)| ReferenceInterval::new(n, d, palette))
        .collect();
    let mut octave = ReferenceInterval::new(2, 1, palette);
    // The octave reads as an "identity" interval alongside the unison.
    octave.limit = 1;
    octave.color = palette.color_for(1);
    intervals.push(octave);
    intervals.sort_by(|a, b| a.cents.total_cmp(&b.cents));
    intervals
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRatio {
    pub numerator: u64,
    pub denominator: u64,
    pub just_cents: f64,
    /// `edo_cents - just_cents`.
    pub error_cents: f64,
    pub limit: u64,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntervalProjection {
    pub pitch_step: i64,
    /// Distance from the first active step, folded into one octave.
    pub edo_cents: f64,
    /// `None` when no acceptable ratio was found.
    pub ratio: Option<ProjectedRatio>,
}

/// Project each active step onto the one-octave just ruler, relative to the
/// first active step.
pub fn interval_projections(
    active_steps: &[i64],
    edo: u32,
    approximator: &ApproximatorParams,
    palette: &LimitPalette,
) -> Vec<IntervalProjection> {
    let Some(&root) = active_steps.first() else {
        return Vec::new();
    };
    let edo = edo.max(1);
    active_steps
        .iter()
        .map(|&step| {
            let diff = step.abs_diff(root) % u64::from(edo);
            let edo_cents = diff as f64 / edo as f64 * 1200.0;
            let ratio = (edo_cents / 1200.0).exp2();
            let target = if ratio < 1.001 { 1.0 } else { ratio };
            let m = best_rational_with(target, PROJECTION_COMPLEXITY_WEIGHT, approximator);
            let ratio = m.matched.then(|| {
                let just_cents = m.cents();
                let limit = m.prime_limit();
                ProjectedRatio {
                    numerator: m.numerator,
                    denominator: m.denominator,
                    just_cents,
                    error_cents: edo_cents - just_cents,
                    limit,
                    color: palette.color_for(limit),
                }
            });
            IntervalProjection {
                pitch_step: step,
                edo_cents,
                ratio,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(intervals: &[ReferenceInterval]) -> Vec<String> {
        intervals.iter().map(|i| i.label()).collect()
    }

    #[test]
    fn five_limit_ruler() {
        let intervals = reference_intervals(5, 4, &LimitPalette::default());
        assert_eq!(labels(&intervals), ["1/1", "5/4", "4/3", "3/2", "5/3", "2/1"]);
        assert!(intervals.windows(2).all(|w| w[0].cents < w[1].cents));
        assert_eq!(intervals.last().unwrap().limit, 1);
        assert_eq!(intervals.last().unwrap().cents, 1200.0);
    }

    #[test]
    fn ruler_respects_limit_and_reduction() {
        let intervals = reference_intervals(13, 32, &LimitPalette::default());
        for i in &intervals[..intervals.len() - 1] {
            assert_eq!(gcd(i.numerator, i.denominator), 1);
            assert!(i.limit <= 13);
            assert!(i.cents >= 0.0 && i.cents < 1200.0);
        }
        assert!(labels(&intervals).contains(&"7/4".to_string()));
        assert!(!labels(&intervals).contains(&"17/16".to_string()));
    }

    #[test]
    fn projections_in_twelve_edo() {
        let p = interval_projections(
            &[0, 7, 4, 12],
            12,
            &ApproximatorParams::default(),
            &LimitPalette::default(),
        );
        assert_eq!(p.len(), 4);

        let root = p[0].ratio.as_ref().unwrap();
        assert_eq!((root.numerator, root.denominator), (1, 1));

        let fifth = p[1].ratio.as_ref().unwrap();
        assert_eq!((fifth.numerator, fifth.denominator), (3, 2));
        assert!((fifth.error_cents + 1.955).abs() < 0.01);

        let third = p[2].ratio.as_ref().unwrap();
        assert_eq!((third.numerator, third.denominator), (5, 4));
        assert_eq!(third.limit, 5);

        // Octave folds to zero.
        assert_eq!(p[3].edo_cents, 0.0);
    }

    #[test]
    fn projections_measure_from_the_first_step() {
        let p = interval_projections(
            &[7, 0],
            12,
            &ApproximatorParams::default(),
            &LimitPalette::default(),
        );
        assert_eq!(p[0].edo_cents, 0.0);
        assert!((p[1].edo_cents - 700.0).abs() < 1e-9);
        assert!(interval_projections(&[], 12, &ApproximatorParams::default(), &LimitPalette::default()).is_empty());
    }
}
