// Commands that mutate engine state.
//
// All outside mutation goes through `EngineCommand`: pointer clicks, MIDI
// note on/off, slider and legend changes, slot keys, and config reloads.
// `HarmonicEngine::apply` runs each command's whole recompute chain before
// returning, so callers never see a half-updated engine.
//
// Commands that name an unknown preset, a cell outside the lattice, an
// invalid slot, or a non-finite slider value are ignored with a warning. They
// produce no events.
//
// See also: `engine.rs` for the dispatch, `event.rs` for the outputs.

use crate::chord_bank::SlotId;
use crate::config::EngineConfig;
use crate::filters::Factor;
use crate::lattice::AxialCoord;
use crate::tuning::TuningConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineCommand {
    /// Switch to a configured preset by EDO size.
    SetTuningPreset { edo: u32 },
    /// Switch to an arbitrary tuning.
    SetTuning { tuning: TuningConfig },
    /// Regenerate the lattice at a new radius. Active cells outside it are
    /// dropped from every slot.
    SetRadius { radius: u32 },
    SetComplexityWeight { weight: f64 },
    /// Heatmap sensitivity; clamped to the configured minimum.
    SetGain { gain: f64 },
    /// Critical-bandwidth scale for the roughness model.
    SetBandwidth { scale: f64 },
    /// Enable or disable the legend bucket containing `limit`.
    SetLimitFilter { limit: u64, enabled: bool },
    SetFactor { factor: Factor, enabled: bool },
    /// Flip a cell in the current slot.
    ToggleCell { coord: AxialCoord },
    SetCellActive { coord: AxialCoord, active: bool },
    SetSlot { slot: SlotId },
    /// Silence every cell in the current slot.
    ClearSlot,
    /// Silence every slot.
    ClearAllSlots,
    /// Swap in a new configuration and reinitialize from its defaults.
    ReplaceConfig { config: Box<EngineConfig> },
}
