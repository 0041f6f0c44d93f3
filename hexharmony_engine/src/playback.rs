// Trigger schedules for the audio side.
//
// The engine does not synthesize anything. It hands the audio layer a list of
// `NoteTrigger`s (frequency, start offset, stereo position) and the audio
// layer plays them. Two schedules exist:
// - `chord`: every sounding frequency in the given order, strummed by
//   `strum_interval_secs` per note.
// - `arpeggio`: sorted ascending, one note per `arpeggio_step_secs`, with a
//   loop period of `n * arpeggio_step_secs`.
//
// Pan spreads pitches left to right on a log-frequency axis between
// `pan_low_hz` and `pan_high_hz`, clamped to `±pan_limit`.
//
// See also: `engine.rs` (`active_frequencies`), `hexharmony_midi` which emits a
// single trigger per note-on.

use crate::config::PlaybackParams;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteTrigger {
    pub frequency_hz: f64,
    /// Start time relative to "now".
    pub offset_secs: f64,
    /// -1 (left) .. 1 (right).
    pub pan: f64,
}

impl NoteTrigger {
    /// An immediate trigger.
    pub fn now(frequency_hz: f64, params: &PlaybackParams) -> Self {
        Self {
            frequency_hz,
            offset_secs: 0.0,
            pan: stereo_pan(frequency_hz, params),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArpeggioPlan {
    pub triggers: Vec<NoteTrigger>,
    /// Time until the pattern should repeat.
    pub period_secs: f64,
}

/// Stereo position for a frequency.
pub fn stereo_pan(hz: f64, params: &PlaybackParams) -> f64 {
    if hz.is_nan() {
        return 0.0;
    }
    let low = params.pan_low_hz.log2();
    let high = params.pan_high_hz.log2();
    let position = (hz.log2() - low) / (high - low) * 2.0 - 1.0;
    if position.is_nan() {
        return 0.0;
    }
    position.clamp(-params.pan_limit, params.pan_limit)
}

/// Strummed chord in input order.
pub fn chord(frequencies: &[f64], params: &PlaybackParams) -> Vec<NoteTrigger> {
    frequencies
        .iter()
        .enumerate()
        .map(|(i, &hz)| NoteTrigger {
            frequency_hz: hz,
            offset_secs: i as f64 * params.strum_interval_secs,
            pan: stereo_pan(hz, params),
        })
        .collect()
}

/// Ascending arpeggio.
pub fn arpeggio(frequencies: &[f64], params: &PlaybackParams) -> ArpeggioPlan {
    let mut sorted = frequencies.to_vec();
    sorted.sort_by(f64::total_cmp);
    let triggers = sorted
        .iter()
        .enumerate()
        .map(|(i, &hz)| NoteTrigger {
            frequency_hz: hz,
            offset_secs: i as f64 * params.arpeggio_step_secs,
            pan: stereo_pan(hz, params),
        })
        .collect();
    ArpeggioPlan {
        triggers,
        period_secs: sorted.len() as f64 * params.arpeggio_step_secs,
    }
}
