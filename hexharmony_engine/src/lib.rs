// hexharmony_engine — harmonic analysis core for a hex microtonal keyboard.
//
// Maps a hexagonal note lattice onto an equal division of the octave,
// approximates every interval by a just ratio, scores sensory roughness, and
// blends both into a per-cell color and label. It has no audio, MIDI or
// rendering dependencies and can be tested, benchmarked and run headless.
//
// Module overview:
// - `engine.rs`:        HarmonicEngine — state owner, command dispatch, recompute chain.
// - `command.rs`:       EngineCommand — all engine mutations.
// - `event.rs`:         EngineEvent, StepResult, listener registry.
// - `config.rs`:        EngineConfig — every tunable constant, JSON-loadable.
// - `error.rs`:         ConfigError.
// - `number_theory.rs`: gcd and prime limits.
// - `rational.rs`:      Continued-fraction just-ratio search.
// - `roughness.rs`:     Partial-series roughness model.
// - `tuning.rs`:        TuningConfig — EDO presets and lattice step mapping.
// - `lattice.rs`:       Axial coordinates, lattice cells, pixel layout.
// - `lut.rs`:           HarmonicLut — per-step roughness + ratio table.
// - `filters.rs`:       Heatmap limit/factor filters and legend buckets.
// - `heatmap.rs`:       Per-cell blend of LUT lookups into color + label.
// - `chord_bank.rs`:    Multi-slot sounding sets.
// - `color.rs`:         Rgb and the prime-limit palette.
// - `playback.rs`:      Chord/arpeggio trigger schedules and stereo pan.
// - `reference.rs`:     Just-interval ruler and active-note projections.
//
// The companion crates wrap this library: `hexharmony_midi` maps MIDI input
// onto engine commands, `hexharmony_cli` inspects tables and heatmaps from
// the command line.
//
// **Critical constraint: synchronous recompute.** Every mutation runs its
// derived chain (retune → LUT rebuild → heatmap) to completion before
// returning. A LUT rebuild always finishes before the heatmap reads it.
// Ordered collections are `BTreeMap`/`BTreeSet` so output order is stable.

pub mod chord_bank;
pub mod color;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod filters;
pub mod heatmap;
pub mod lattice;
pub mod lut;
pub mod number_theory;
pub mod playback;
pub mod rational;
pub mod reference;
pub mod roughness;
pub mod tuning;

pub use command::EngineCommand;
pub use config::EngineConfig;
pub use engine::HarmonicEngine;
pub use error::{ConfigError, ConfigResult};
pub use event::{EngineEvent, StepResult};
