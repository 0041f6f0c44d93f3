// Data-driven engine configuration.
//
// All tunable parameters live in `EngineConfig`, which can be loaded from
// JSON and swapped at runtime. The analysis code never hard-codes the
// thresholds or palettes below; it reads them from here, so tests can inject
// alternative configurations.
//
// Parameters are grouped into sub-structs by consumer:
// - `ApproximatorParams`: continued-fraction search thresholds (`rational.rs`).
// - `RoughnessParams`:    partial-series dissonance model (`roughness.rs`).
// - `BlendParams`:        heatmap factor weights and shaping (`heatmap.rs`).
// - `PlaybackParams`:     strum/arpeggio timing and panning (`playback.rs`).
// - `LimitPalette`:       prime limit colors (`color.rs`).
// Tuning presets are keyed by EDO size and built by the named constructors
// in `tuning.rs`.
//
// See also: `engine.rs` which owns the active config, `error.rs` for
// `ConfigError`.

use crate::color::{LimitPalette, Rgb};
use crate::error::{ConfigError, ConfigResult};
use crate::tuning::TuningConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Parameter groups
// ---------------------------------------------------------------------------

/// Thresholds for the continued-fraction ratio search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApproximatorParams {
    /// Stop expanding once a convergent's denominator would exceed this.
    pub max_denominator: u64,
    /// Convergents with `n * d` at or above this are never candidates.
    pub noise_ceiling: f64,
    /// Stop expanding once a convergent is this close (cents).
    pub convergence_cents: f64,
    /// Candidates whose prime limit exceeds this pay `high_limit_penalty`.
    pub high_limit_threshold: u64,
    pub high_limit_penalty: f64,
    /// A match is accepted when `cost < base_threshold + threshold_per_weight * weight`.
    pub base_threshold: f64,
    pub threshold_per_weight: f64,
}

impl Default for ApproximatorParams {
    fn default() -> Self {
        Self {
            max_denominator: 2000,
            noise_ceiling: 50_000.0,
            convergence_cents: 0.001,
            high_limit_threshold: 19,
            high_limit_penalty: 15.0,
            base_threshold: 40.0,
            threshold_per_weight: 10.0,
        }
    }
}

/// Constants of the Plomp–Levelt style roughness integral.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoughnessParams {
    /// Fundamental of the lower tone (Hz). Middle C.
    pub reference_hz: f64,
    /// Partials per tone.
    pub partials: u32,
    /// Partial `i` has amplitude `i^-amplitude_rolloff`.
    pub amplitude_rolloff: f64,
    /// Pair weight is `(a_i * a_j)^amplitude_exponent`.
    pub amplitude_exponent: f64,
    /// Critical bandwidth `bandwidth_coefficient * scale * (f_min + bandwidth_offset_hz)`.
    pub bandwidth_coefficient: f64,
    pub bandwidth_offset_hz: f64,
    /// Curve exponents: `e^(-s1 x) - e^(-s2 x)`.
    pub s1: f64,
    pub s2: f64,
}

impl Default for RoughnessParams {
    fn default() -> Self {
        Self {
            reference_hz: 261.63,
            partials: 10,
            amplitude_rolloff: 1.1,
            amplitude_exponent: 0.1,
            bandwidth_coefficient: 0.24,
            bandwidth_offset_hz: 25.0,
            s1: 3.5,
            s2: 5.75,
        }
    }
}

/// Weights and shaping constants for the heatmap's log-domain blend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlendParams {
    pub consonance_weight: f64,
    pub clarity_weight: f64,
    pub tuning_weight: f64,
    /// Guard added inside every `ln`.
    pub epsilon: f64,
    /// `clarity = e^(-clarity_decay * complexity)`.
    pub clarity_decay: f64,
    /// `tuning = 1 - |error| / tuning_tolerance_cents`, clamped.
    pub tuning_tolerance_cents: f64,
    /// `consonance = 1 / (1 + roughness * consonance_scale / gain)`.
    pub consonance_scale: f64,
    /// Target color of the noise fallback fade.
    pub noise_color: Rgb,
    /// Starting color of every fade.
    pub base_color: Rgb,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            consonance_weight: 0.55,
            clarity_weight: 0.30,
            tuning_weight: 0.15,
            epsilon: 1e-6,
            clarity_decay: 0.15,
            tuning_tolerance_cents: 20.0,
            consonance_scale: 6.0,
            noise_color: Rgb::new(60, 60, 60),
            base_color: Rgb::BLACK,
        }
    }
}

/// Timing for the trigger schedules handed to the audio side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackParams {
    /// Offset between successive chord notes (strum), seconds.
    pub strum_interval_secs: f64,
    /// Offset between arpeggio notes, seconds.
    pub arpeggio_step_secs: f64,
    /// Frequencies mapped to the hard left/right of the pan curve.
    pub pan_low_hz: f64,
    pub pan_high_hz: f64,
    /// Pan is clamped to `[-pan_limit, pan_limit]`.
    pub pan_limit: f64,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        Self {
            strum_interval_secs: 0.03,
            arpeggio_step_secs: 0.25,
            pan_low_hz: 65.0,
            pan_high_hz: 1000.0,
            pan_limit: 0.9,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Frequency of pitch step 0 (Hz).
    pub base_frequency_hz: f64,
    /// Preset selected at construction.
    pub default_edo: u32,
    /// Radius of the generated hex region.
    pub lattice_radius: u32,
    /// Largest radius `lattice_radius` or a radius command may ask for.
    pub max_lattice_radius: u32,
    /// Number of chord slots (slot ids run `1..=chord_slots`).
    pub chord_slots: u8,
    /// Octaves covered by the harmonic lookup table.
    pub lut_octaves: u32,
    /// Complexity reported for LUT entries without a rational match.
    pub unmatched_complexity: f64,
    /// Initial complexity weight (UI range roughly 1–20).
    pub default_complexity_weight: f64,
    /// Initial heatmap gain (sensitivity / 10).
    pub default_gain: f64,
    /// Gain never drops below this.
    pub min_gain: f64,
    /// Initial critical-bandwidth scale.
    pub default_bandwidth_scale: f64,
    /// Idle key colors when the heatmap has nothing to show.
    pub white_key_color: Rgb,
    pub black_key_color: Rgb,
    /// Tuning presets keyed by EDO size.
    pub presets: BTreeMap<u32, TuningConfig>,
    pub palette: LimitPalette,
    pub approximator: ApproximatorParams,
    pub roughness: RoughnessParams,
    pub blend: BlendParams,
    pub playback: PlaybackParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let presets = [
            TuningConfig::edo_12(),
            TuningConfig::edo_19(),
            TuningConfig::edo_31(),
            TuningConfig::edo_53(),
            TuningConfig::edo_72(),
        ]
        .into_iter()
        .map(|t| (t.edo_divisions, t))
        .collect();

        Self {
            base_frequency_hz: 261.63,
            default_edo: 12,
            lattice_radius: 10,
            max_lattice_radius: 64,
            chord_slots: 10,
            lut_octaves: 4,
            unmatched_complexity: 10.0,
            default_complexity_weight: 10.0,
            default_gain: 8.0,
            min_gain: 0.1,
            default_bandwidth_scale: 1.0,
            white_key_color: Rgb::new(100, 100, 120),
            black_key_color: Rgb::new(50, 50, 60),
            presets,
            palette: LimitPalette::default(),
            approximator: ApproximatorParams::default(),
            roughness: RoughnessParams::default(),
            blend: BlendParams::default(),
            playback: PlaybackParams::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The preset for an EDO size, if configured.
    pub fn preset(&self, edo: u32) -> Option<&TuningConfig> {
        self.presets.get(&edo)
    }

    /// The preset selected at construction.
    pub fn default_tuning(&self) -> ConfigResult<&TuningConfig> {
        self.preset(self.default_edo).ok_or_else(|| {
            ConfigError::Invalid(format!("no preset for default EDO {}", self.default_edo))
        })
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.base_frequency_hz.is_finite() && self.base_frequency_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "base frequency must be positive, got {}",
                self.base_frequency_hz
            )));
        }
        if self.lattice_radius == 0 {
            return Err(ConfigError::Invalid("lattice radius must be at least 1".into()));
        }
        if i32::try_from(self.max_lattice_radius).is_err() {
            return Err(ConfigError::Invalid(format!(
                "max lattice radius {} does not fit a hex coordinate",
                self.max_lattice_radius
            )));
        }
        if self.lattice_radius > self.max_lattice_radius {
            return Err(ConfigError::Invalid(format!(
                "lattice radius {} exceeds the maximum {}",
                self.lattice_radius, self.max_lattice_radius
            )));
        }
        if !(self.default_complexity_weight.is_finite() && self.default_complexity_weight >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "complexity weight must be finite and non-negative, got {}",
                self.default_complexity_weight
            )));
        }
        if !(self.default_bandwidth_scale.is_finite() && self.default_bandwidth_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "bandwidth scale must be positive, got {}",
                self.default_bandwidth_scale
            )));
        }
        if !(self.min_gain.is_finite() && self.min_gain > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "minimum gain must be positive, got {}",
                self.min_gain
            )));
        }
        if !self.default_gain.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "gain must be finite, got {}",
                self.default_gain
            )));
        }
        if self.chord_slots == 0 {
            return Err(ConfigError::Invalid("at least one chord slot is required".into()));
        }
        if self.lut_octaves == 0 {
            return Err(ConfigError::Invalid("LUT must span at least one octave".into()));
        }
        if self.roughness.partials == 0 {
            return Err(ConfigError::Invalid("roughness model needs partials".into()));
        }
        for (&edo, tuning) in &self.presets {
            tuning.validate()?;
            if edo != tuning.edo_divisions {
                return Err(ConfigError::InvalidTuning {
                    name: tuning.name.clone(),
                    edo: tuning.edo_divisions,
                    reason: format!("listed under preset key {edo}"),
                });
            }
        }
        self.default_tuning()?;
        Ok(())
    }
}
