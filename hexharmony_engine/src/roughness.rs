// Sensory roughness between two harmonic tones (Plomp–Levelt style).
//
// Both tones carry `partials` harmonics with amplitudes `i^-rolloff`. For
// every pair of partials we measure their separation against a critical
// bandwidth that grows with the lower partial's frequency, and add the
// dissonance curve
//
//   (a_i * a_j)^exp * (e^(-s1 x) - e^(-s2 x)),   x = df / cbw
//
// clamped at zero. The sum over all pairs is squared to give the score.
//
// `bandwidth_scale` multiplies the critical bandwidth: below 1 the overlap
// region narrows (sharper roughness peaks), above 1 it widens.
//
// Pure and deterministic. The lower tone is fixed at the reference
// fundamental so the score depends only on the ratio.
//
// See also: `lut.rs` which tabulates this per EDO step, `config.rs` for
// `RoughnessParams`.

use crate::config::RoughnessParams;

/// Roughness of two tones at `ratio`, using the default model constants.
pub fn roughness(ratio: f64, bandwidth_scale: f64) -> f64 {
    roughness_with(ratio, bandwidth_scale, &RoughnessParams::default())
}

/// Roughness with explicit model constants.
///
/// Non-finite or non-positive inputs score 0.
pub fn roughness_with(ratio: f64, bandwidth_scale: f64, params: &RoughnessParams) -> f64 {
    if !(ratio.is_finite() && ratio > 0.0 && bandwidth_scale.is_finite() && bandwidth_scale > 0.0)
    {
        return 0.0;
    }

    let f1 = params.reference_hz;
    let f2 = f1 * ratio;
    let amplitudes: Vec<f64> = (1..=params.partials)
        .map(|i| (i as f64).powf(-params.amplitude_rolloff))
        .collect();

    let mut total = 0.0;
    for (i, &a1) in amplitudes.iter().enumerate() {
        let p1 = f1 * (i + 1) as f64;
        for (j, &a2) in amplitudes.iter().enumerate() {
            let p2 = f2 * (j + 1) as f64;
            let df = (p1 - p2).abs();
            let cbw = params.bandwidth_coefficient
                * bandwidth_scale
                * (p1.min(p2) + params.bandwidth_offset_hz);
            let x = df / cbw;
            let amplitude = (a1 * a2).powf(params.amplitude_exponent);
            let d = amplitude * ((-params.s1 * x).exp() - (-params.s2 * x).exp());
            total += d.max(0.0);
        }
    }
    total * total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn semitone() -> f64 {
        2f64.powf(1.0 / 12.0)
    }

    #[test]
    fn unison_is_smoother_than_any_interval() {
        let unison = roughness(1.0, 1.0);
        for ratio in [1.5, semitone(), 1.25, 2f64.powf(6.0 / 12.0), 1.125] {
            assert!(
                unison < roughness(ratio, 1.0),
                "unison {unison} vs {ratio}: {}",
                roughness(ratio, 1.0)
            );
        }
    }

    #[test]
    fn semitone_is_rougher_than_fifth() {
        assert!(roughness(semitone(), 1.0) > roughness(1.5, 1.0));
    }

    #[test]
    fn non_negative_and_finite() {
        for step in 0..48 {
            let ratio = 2f64.powf(step as f64 / 12.0);
            for scale in [0.25, 0.5, 1.0, 2.0] {
                let r = roughness(ratio, scale);
                assert!(r.is_finite() && r >= 0.0, "{ratio} @ {scale}: {r}");
            }
        }
    }

    #[test]
    fn deterministic() {
        assert_eq!(roughness(1.37, 0.8), roughness(1.37, 0.8));
    }

    #[test]
    fn bandwidth_scale_changes_the_curve() {
        let narrow = roughness(1.5, 0.5);
        let wide = roughness(1.5, 2.0);
        assert!(narrow != wide);
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        assert_eq!(roughness(0.0, 1.0), 0.0);
        assert_eq!(roughness(f64::NAN, 1.0), 0.0);
        assert_eq!(roughness(1.5, 0.0), 0.0);
    }
}
