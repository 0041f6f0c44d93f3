// Just-intonation ratio search by continued fractions.
//
// Given a frequency ratio (normally pre-normalized into [1, 2)), expand it as
// a continued fraction and collect the convergents `n/d` as candidates. Each
// candidate is scored as
//
//   cost = |error_cents| + complexity_weight * log2(n * d) + limit_penalty
//
// and the cheapest one wins; it counts as a match when the cost falls under
// `base_threshold + threshold_per_weight * complexity_weight`. A low weight
// accepts complex but precise ratios, a high weight prefers simple ratios
// even when they are further off.
//
// Expansion stops when the next denominator would exceed `max_denominator`,
// when a convergent lands within `convergence_cents` of the target, or when
// the remainder stops being finite (the target is itself a convergent).
// Convergents with `n * d` at or above `noise_ceiling` are generated but never
// kept as candidates.
//
// See also: `config.rs` for `ApproximatorParams`, `lut.rs` which runs this
// once per table entry, `reference.rs` for the linear-view projections.

use crate::config::ApproximatorParams;
use crate::number_theory::ratio_prime_limit;
use serde::{Deserialize, Serialize};

/// Cents from a ratio: `1200 * log2(ratio)`.
pub fn ratio_to_cents(ratio: f64) -> f64 {
    1200.0 * ratio.log2()
}

/// Ratio from cents: `2^(cents / 1200)`.
pub fn cents_to_ratio(cents: f64) -> f64 {
    (cents / 1200.0).exp2()
}

/// Result of approximating a real ratio by a simple fraction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RationalMatch {
    pub numerator: u64,
    pub denominator: u64,
    /// Signed deviation `1200 * log2(target / (n/d))`. Positive means the
    /// target is sharp of the fraction.
    pub error_cents: f64,
    /// `log2(n * d)`.
    pub complexity: f64,
    /// Whether the winning candidate's cost beat the acceptance threshold.
    pub matched: bool,
}

impl RationalMatch {
    /// Largest prime factor appearing in either term.
    pub fn prime_limit(&self) -> u64 {
        ratio_prime_limit(self.numerator, self.denominator)
    }

    /// Size of the fraction itself in cents.
    pub fn cents(&self) -> f64 {
        ratio_to_cents(self.numerator as f64 / self.denominator as f64)
    }

    /// `"n/d"`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }

    /// The inert result for targets that produced no usable convergent.
    fn unmatched_unison(target: f64) -> Self {
        let error_cents = if target.is_finite() && target > 0.0 {
            ratio_to_cents(target)
        } else {
            0.0
        };
        RationalMatch {
            numerator: 1,
            denominator: 1,
            error_cents,
            complexity: 0.0,
            matched: false,
        }
    }
}

/// A convergent kept for selection, with its precomputed cost.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    numerator: u64,
    denominator: u64,
    error_cents: f64,
    complexity: f64,
    cost: f64,
}

/// Successive continued-fraction convergents of `target`, with the stopping
/// rules above. Yields `(n, d, signed_error_cents)`.
fn convergents(target: f64, params: &ApproximatorParams) -> Vec<(u64, u64, f64)> {
    let mut out = Vec::new();
    // (n_{i-2}, d_{i-2}) and (n_{i-1}, d_{i-1}).
    let (mut n0, mut d0, mut n1, mut d1) = (0u64, 1u64, 1u64, 0u64);
    let mut x = target;

    loop {
        let floor = x.floor();
        if !floor.is_finite() || floor < 0.0 || floor > u64::MAX as f64 {
            break;
        }
        let a = floor as u64;
        let Some(n2) = a.checked_mul(n1).and_then(|v| v.checked_add(n0)) else {
            break;
        };
        let Some(d2) = a.checked_mul(d1).and_then(|v| v.checked_add(d0)) else {
            break;
        };
        if d2 > params.max_denominator || d2 == 0 {
            break;
        }

        let error_cents = ratio_to_cents(target / (n2 as f64 / d2 as f64));
        out.push((n2, d2, error_cents));
        if error_cents.abs() < params.convergence_cents {
            break;
        }

        (n0, d0, n1, d1) = (n1, d1, n2, d2);
        x = 1.0 / (x - floor);
        if !x.is_finite() {
            break;
        }
    }
    out
}

/// Find the best simple fraction for `target` under the given complexity
/// weight and denominator bound.
///
/// `target` must be finite and positive; anything else (or a target whose
/// first convergent already exceeds the noise ceiling) yields an unmatched
/// `1/1` rather than failing.
pub fn best_rational(
    target: f64,
    complexity_weight: f64,
    max_denominator: u64,
) -> RationalMatch {
    let params = ApproximatorParams {
        max_denominator,
        ..ApproximatorParams::default()
    };
    best_rational_with(target, complexity_weight, &params)
}

/// `best_rational` with every threshold taken from `params`.
pub fn best_rational_with(
    target: f64,
    complexity_weight: f64,
    params: &ApproximatorParams,
) -> RationalMatch {
    if !target.is_finite() || target <= 0.0 {
        return RationalMatch::unmatched_unison(target);
    }

    // First-seen wins ties: only a strictly lower cost replaces the best.
    let best = convergents(target, params)
        .into_iter()
        .filter(|&(n, d, _)| n > 0 && (n as f64) * (d as f64) < params.noise_ceiling)
        .map(|(n, d, error_cents)| {
            let complexity = ((n as f64) * (d as f64)).log2();
            let limit_penalty = if ratio_prime_limit(n, d) > params.high_limit_threshold {
                params.high_limit_penalty
            } else {
                0.0
            };
            Candidate {
                numerator: n,
                denominator: d,
                error_cents,
                complexity,
                cost: error_cents.abs() + complexity_weight * complexity + limit_penalty,
            }
        })
        .fold(None::<Candidate>, |best, cand| match best {
            Some(b) if b.cost <= cand.cost => Some(b),
            _ => Some(cand),
        });

    let Some(best) = best else {
        return RationalMatch::unmatched_unison(target);
    };

    let threshold = params.base_threshold + params.threshold_per_weight * complexity_weight;
    RationalMatch {
        numerator: best.numerator,
        denominator: best.denominator,
        error_cents: best.error_cents,
        complexity: best.complexity,
        matched: best.cost < threshold,
    }
}
