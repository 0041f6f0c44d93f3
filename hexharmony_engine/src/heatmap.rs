// Heatmap: blend LUT lookups into one color and label per lattice cell.
//
// For every inactive cell (the "target") and every sounding cell (a
// "source"), look up `lut.lookup(target.step - source.step)`. Across all
// sources:
// - roughness is summed,
// - the matched entry with the lowest complexity is the best match (the
//   first source in lattice order wins ties).
//
// Three factors in [0, 1] come out of that:
//
//   consonance = 1 / (1 + roughness * consonance_scale / gain)
//   clarity    = e^(-clarity_decay * best.complexity)         (1 if no match)
//   tuning     = clamp(1 - |best.error| / tolerance, 0, 1)     (1 if no match)
//
// and are blended in the log domain with weights zeroed for disabled factors:
//
//   strength = exp(Σ w_f * ln(f + ε))
//
// so any factor near zero drags the whole product down. With every factor
// disabled the exponent is 0 and strength is exactly 1.
//
// Color: a best match whose limit bucket is enabled fades from the base
// color toward its palette color by `strength`. Otherwise, with consonance
// enabled, the cell fades toward the noise gray by `1 - consonance`.
// Otherwise it stays at the base color. The label depends only on the best
// match, never on the filters.
//
// Active cells, and every cell while nothing is sounding, get no visual.
// A recompute is a full pass, `O(cells * active)`, with no incremental path;
// it always reads the LUT as already rebuilt by the caller.
//
// See also: `lut.rs`, `filters.rs`, `engine.rs` which sequences
// LUT rebuild → recompute.

use crate::color::Rgb;
use crate::config::BlendParams;
use crate::filters::{Factor, HeatmapFilters};
use crate::lattice::{AxialCoord, Lattice};
use crate::lut::{HarmonicLut, HarmonicMatch};
use serde::{Deserialize, Serialize};

/// Cached per-cell output consumed by renderers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellVisual {
    pub color: Rgb,
    /// `"n/d (Err: e¢)"` for a matched best ratio.
    pub label: Option<String>,
}

/// Everything computed for one target cell.
#[derive(Clone, Debug, PartialEq)]
pub struct HarmonicReading {
    pub total_roughness: f64,
    pub best: Option<HarmonicMatch>,
    pub consonance: f64,
    pub clarity: f64,
    pub tuning_accuracy: f64,
    pub strength: f64,
    pub color: Rgb,
    pub label: Option<String>,
}

impl HarmonicReading {
    pub fn visual(&self) -> CellVisual {
        CellVisual {
            color: self.color,
            label: self.label.clone(),
        }
    }
}

/// Counts from one recompute pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecomputeSummary {
    pub cells: usize,
    pub active: usize,
    /// Inactive cells that received a best-match label.
    pub labelled: usize,
}

/// `"n/d (Err: e¢)"`, error to one decimal.
pub fn match_label(best: &HarmonicMatch) -> String {
    format!("{} (Err: {:.1}¢)", best.label(), best.error_cents)
}

/// Evaluate one target pitch step against the sounding steps.
///
/// `gain` must be positive; the engine keeps it at or above `min_gain`.
pub fn evaluate_target(
    target_step: i64,
    source_steps: &[i64],
    gain: f64,
    filters: &HeatmapFilters,
    lut: &HarmonicLut,
    blend: &BlendParams,
) -> HarmonicReading {
    let (total_roughness, best) = source_steps.iter().fold(
        (0.0, None::<HarmonicMatch>),
        |(roughness, best), &source| {
            let entry = lut.lookup(target_step.saturating_sub(source));
            let best = match (best, entry.harmonic) {
                (Some(b), Some(h)) if h.complexity < b.complexity => Some(h),
                (None, h) => h,
                (b, _) => b,
            };
            (roughness + entry.roughness, best)
        },
    );

    let consonance = 1.0 / (1.0 + total_roughness * (blend.consonance_scale / gain));
    let clarity = best.map_or(1.0, |b| (-blend.clarity_decay * b.complexity).exp());
    let tuning_accuracy = best.map_or(1.0, |b| {
        (1.0 - b.error_cents.abs() / blend.tuning_tolerance_cents).clamp(0.0, 1.0)
    });

    let weight = |factor: Factor, w: f64| if filters.factor_enabled(factor) { w } else { 0.0 };
    let exponent = weight(Factor::Clarity, blend.clarity_weight) * (clarity + blend.epsilon).ln()
        + weight(Factor::Consonance, blend.consonance_weight) * (consonance + blend.epsilon).ln()
        + weight(Factor::Tuning, blend.tuning_weight) * (tuning_accuracy + blend.epsilon).ln();
    let strength = exponent.exp();

    let color = match best {
        Some(b) if filters.limit_enabled(b.limit) => blend.base_color.lerp(b.color, strength),
        _ if filters.factor_enabled(Factor::Consonance) => {
            blend.base_color.lerp(blend.noise_color, 1.0 - consonance)
        }
        _ => blend.base_color,
    };

    HarmonicReading {
        total_roughness,
        best,
        consonance,
        clarity,
        tuning_accuracy,
        strength,
        color,
        label: best.as_ref().map(match_label),
    }
}

/// Recompute and cache the visual of every cell.
pub fn recompute(
    lattice: &mut Lattice,
    is_active: impl Fn(AxialCoord) -> bool,
    gain: f64,
    filters: &HeatmapFilters,
    lut: &HarmonicLut,
    blend: &BlendParams,
) -> RecomputeSummary {
    let sources: Vec<i64> = lattice
        .cells()
        .iter()
        .filter(|c| is_active(c.coord))
        .map(|c| c.pitch_step)
        .collect();

    let mut summary = RecomputeSummary {
        cells: lattice.len(),
        active: sources.len(),
        labelled: 0,
    };

    for cell in lattice.cells_mut() {
        if sources.is_empty() || is_active(cell.coord) {
            cell.set_visual(None);
            continue;
        }
        let reading = evaluate_target(cell.pitch_step, &sources, gain, filters, lut, blend);
        if reading.label.is_some() {
            summary.labelled += 1;
        }
        cell.set_visual(Some(reading.visual()));
    }

    tracing::debug!(
        cells = summary.cells,
        active = summary.active,
        labelled = summary.labelled,
        "heatmap recomputed"
    );
    summary
}
