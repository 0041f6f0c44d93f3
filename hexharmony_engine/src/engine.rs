// The engine facade: single owner of all keyboard state.
//
// `HarmonicEngine` holds the active tuning, the lattice (with cached cell
// visuals), the harmonic LUT, the chord bank, the heatmap filters and the
// scalar controls (complexity weight, gain). Outside code mutates it only
// through `apply(EngineCommand)` and reads it through the query methods.
//
// Each command marks what it invalidated, then `refresh` runs the derived
// chain in a fixed order before `apply` returns:
//
//   lattice retune / regenerate → LUT rebuild → heatmap recompute
//
// The LUT is rebuilt only when its (EDO, weight, bandwidth) triple actually
// changed; a recompute always sees the finished table. Nothing is deferred.
// Listeners receive the step's events after the chain completes.
//
// Invalid commands (unknown preset, cell outside the lattice, out-of-range
// slot, non-finite slider values, configs that fail validation) are logged
// with `tracing::warn!` and leave the engine untouched.
//
// See also: `command.rs`, `event.rs`, `heatmap.rs`, `lut.rs`,
// `chord_bank.rs`, `lattice.rs`.

use crate::chord_bank::{ChordBank, SlotId};
use crate::color::Rgb;
use crate::command::EngineCommand;
use crate::config::EngineConfig;
use crate::error::ConfigResult;
use crate::event::{EngineEvent, ListenerId, ListenerRegistry, StepResult};
use crate::filters::HeatmapFilters;
use crate::heatmap::{self, CellVisual, HarmonicReading};
use crate::lattice::{AxialCoord, Lattice, LatticeCell};
use crate::lut::HarmonicLut;
use crate::playback::{self, ArpeggioPlan, NoteTrigger};
use crate::reference::{self, IntervalProjection};
use crate::tuning::TuningConfig;
use serde::{Deserialize, Serialize};

/// What a command invalidated.
#[derive(Clone, Copy, Debug, Default)]
struct Dirty {
    lut: bool,
    heatmap: bool,
}

impl Dirty {
    const NONE: Dirty = Dirty {
        lut: false,
        heatmap: false,
    };
    const HEATMAP: Dirty = Dirty {
        lut: false,
        heatmap: true,
    };
    const ALL: Dirty = Dirty {
        lut: true,
        heatmap: true,
    };
}

/// Serializable view of one cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub coord: AxialCoord,
    pub pitch_step: i64,
    pub note_index: u32,
    pub frequency_hz: f64,
    pub white_key: bool,
    pub active: bool,
    pub visual: Option<CellVisual>,
}

/// Serializable view of the whole engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub tuning: String,
    pub edo: u32,
    pub radius: u32,
    pub complexity_weight: f64,
    pub gain: f64,
    pub filters: HeatmapFilters,
    pub current_slot: SlotId,
    pub cells: Vec<CellSnapshot>,
}

#[derive(Debug)]
pub struct HarmonicEngine {
    config: EngineConfig,
    tuning: TuningConfig,
    lattice: Lattice,
    lut: HarmonicLut,
    chords: ChordBank,
    filters: HeatmapFilters,
    complexity_weight: f64,
    gain: f64,
    listeners: ListenerRegistry,
}

impl HarmonicEngine {
    /// Build an engine from a validated config, starting on its default
    /// preset with nothing sounding.
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        let tuning = config.default_tuning()?.clone();
        let filters = HeatmapFilters::with_bandwidth(config.default_bandwidth_scale);
        let complexity_weight = config.default_complexity_weight;
        let lattice = Lattice::generate(config.lattice_radius, &tuning, config.base_frequency_hz);
        let lut = HarmonicLut::build(&tuning, complexity_weight, filters.bandwidth_scale, &config);
        let chords = ChordBank::new(config.chord_slots);
        let gain = config.default_gain.max(config.min_gain);
        tracing::info!(
            tuning = %tuning.name,
            radius = config.lattice_radius,
            cells = lattice.len(),
            "harmonic engine initialized"
        );
        Ok(Self {
            config,
            tuning,
            lattice,
            lut,
            chords,
            filters,
            complexity_weight,
            gain,
            listeners: ListenerRegistry::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply one command and run its recompute chain to completion.
    pub fn apply(&mut self, command: EngineCommand) -> StepResult {
        let mut events = Vec::new();
        let dirty = self.apply_command(command, &mut events);
        self.refresh(dirty, &mut events);
        self.listeners.dispatch(&events);
        StepResult { events }
    }

    /// Apply several commands in order, concatenating their events.
    pub fn apply_all(&mut self, commands: impl IntoIterator<Item = EngineCommand>) -> StepResult {
        let mut events = Vec::new();
        for command in commands {
            events.extend(self.apply(command).events);
        }
        StepResult { events }
    }

    fn apply_command(&mut self, command: EngineCommand, events: &mut Vec<EngineEvent>) -> Dirty {
        match command {
            EngineCommand::SetTuningPreset { edo } => match self.config.preset(edo).cloned() {
                Some(preset) => self.set_tuning(preset, events),
                None => {
                    tracing::warn!(edo, "ignoring unknown tuning preset");
                    Dirty::NONE
                }
            },
            EngineCommand::SetTuning { tuning } => {
                if let Err(err) = tuning.validate() {
                    tracing::warn!(%err, "ignoring invalid tuning");
                    return Dirty::NONE;
                }
                self.set_tuning(tuning, events)
            }
            EngineCommand::SetRadius { radius } => {
                if radius == 0 || radius > self.config.max_lattice_radius {
                    tracing::warn!(
                        radius,
                        max = self.config.max_lattice_radius,
                        "ignoring out-of-range lattice radius"
                    );
                    return Dirty::NONE;
                }
                if radius == self.lattice.radius() {
                    return Dirty::NONE;
                }
                self.lattice = Lattice::generate(radius, &self.tuning, self.config.base_frequency_hz);
                let lattice = &self.lattice;
                self.chords.retain(|coord| lattice.contains(coord));
                events.push(EngineEvent::LatticeRegenerated {
                    radius,
                    cells: self.lattice.len(),
                });
                Dirty::HEATMAP
            }
            EngineCommand::SetComplexityWeight { weight } => {
                if !(weight.is_finite() && weight >= 0.0) {
                    tracing::warn!(weight, "ignoring invalid complexity weight");
                    return Dirty::NONE;
                }
                if weight == self.complexity_weight {
                    return Dirty::NONE;
                }
                self.complexity_weight = weight;
                Dirty::ALL
            }
            EngineCommand::SetGain { gain } => {
                if !gain.is_finite() {
                    tracing::warn!(gain, "ignoring non-finite gain");
                    return Dirty::NONE;
                }
                let gain = gain.max(self.config.min_gain);
                if gain == self.gain {
                    return Dirty::NONE;
                }
                self.gain = gain;
                Dirty::HEATMAP
            }
            EngineCommand::SetBandwidth { scale } => {
                if !(scale.is_finite() && scale > 0.0) {
                    tracing::warn!(scale, "ignoring invalid bandwidth scale");
                    return Dirty::NONE;
                }
                if scale == self.filters.bandwidth_scale {
                    return Dirty::NONE;
                }
                self.filters.bandwidth_scale = scale;
                Dirty::ALL
            }
            EngineCommand::SetLimitFilter { limit, enabled } => {
                if self.filters.set_limit(limit, enabled) {
                    Dirty::HEATMAP
                } else {
                    Dirty::NONE
                }
            }
            EngineCommand::SetFactor { factor, enabled } => {
                if self.filters.set_factor(factor, enabled) {
                    Dirty::HEATMAP
                } else {
                    Dirty::NONE
                }
            }
            EngineCommand::ToggleCell { coord } => {
                if !self.lattice.contains(coord) {
                    tracing::warn!(%coord, "ignoring toggle outside the lattice");
                    return Dirty::NONE;
                }
                let active = self.chords.toggle(coord);
                events.push(EngineEvent::CellToggled { coord, active });
                Dirty::HEATMAP
            }
            EngineCommand::SetCellActive { coord, active } => {
                if !self.lattice.contains(coord) {
                    tracing::warn!(%coord, "ignoring activation outside the lattice");
                    return Dirty::NONE;
                }
                if !self.chords.set_active(coord, active) {
                    return Dirty::NONE;
                }
                events.push(EngineEvent::CellToggled { coord, active });
                Dirty::HEATMAP
            }
            EngineCommand::SetSlot { slot } => {
                if !self.chords.is_valid_slot(slot) {
                    tracing::warn!(slot = slot.0, "ignoring out-of-range chord slot");
                    return Dirty::NONE;
                }
                if !self.chords.set_slot(slot) {
                    return Dirty::NONE;
                }
                events.push(EngineEvent::SlotChanged { slot });
                Dirty::HEATMAP
            }
            EngineCommand::ClearSlot => {
                if self.chords.clear_current_slot() > 0 {
                    Dirty::HEATMAP
                } else {
                    Dirty::NONE
                }
            }
            EngineCommand::ClearAllSlots => {
                if self.chords.clear_all() > 0 {
                    Dirty::HEATMAP
                } else {
                    Dirty::NONE
                }
            }
            EngineCommand::ReplaceConfig { config } => self.replace_config(*config, events),
        }
    }

    fn set_tuning(&mut self, tuning: TuningConfig, events: &mut Vec<EngineEvent>) -> Dirty {
        if tuning == self.tuning {
            return Dirty::NONE;
        }
        tracing::info!(tuning = %tuning.name, edo = tuning.edo_divisions, "tuning changed");
        self.lattice.retune(&tuning, self.config.base_frequency_hz);
        events.push(EngineEvent::TuningChanged {
            edo: tuning.edo_divisions,
            name: tuning.name.clone(),
        });
        self.tuning = tuning;
        Dirty::ALL
    }

    fn replace_config(&mut self, config: EngineConfig, events: &mut Vec<EngineEvent>) -> Dirty {
        let tuning = match config.validate().and_then(|()| config.default_tuning().cloned()) {
            Ok(tuning) => tuning,
            Err(err) => {
                tracing::warn!(%err, "ignoring invalid config");
                return Dirty::NONE;
            }
        };
        tracing::info!(tuning = %tuning.name, radius = config.lattice_radius, "config replaced");

        self.lattice = Lattice::generate(config.lattice_radius, &tuning, config.base_frequency_hz);
        self.chords = ChordBank::new(config.chord_slots);
        self.filters = HeatmapFilters::with_bandwidth(config.default_bandwidth_scale);
        self.complexity_weight = config.default_complexity_weight;
        self.gain = config.default_gain.max(config.min_gain);
        events.push(EngineEvent::TuningChanged {
            edo: tuning.edo_divisions,
            name: tuning.name.clone(),
        });
        events.push(EngineEvent::LatticeRegenerated {
            radius: config.lattice_radius,
            cells: self.lattice.len(),
        });
        self.tuning = tuning;
        self.config = config;
        // Palette and model constants may differ even for the same triple.
        self.rebuild_lut(events);
        Dirty::HEATMAP
    }

    /// Run the invalidated part of the chain: LUT first, then the heatmap.
    fn refresh(&mut self, dirty: Dirty, events: &mut Vec<EngineEvent>) {
        if dirty.lut
            && !self
                .lut
                .is_built_for(&self.tuning, self.complexity_weight, self.filters.bandwidth_scale)
        {
            self.rebuild_lut(events);
        }
        if dirty.heatmap {
            let chords = &self.chords;
            let summary = heatmap::recompute(
                &mut self.lattice,
                |coord| chords.is_active_now(coord),
                self.gain,
                &self.filters,
                &self.lut,
                &self.config.blend,
            );
            events.push(EngineEvent::RecomputeCompleted {
                active: summary.active,
                labelled: summary.labelled,
            });
        }
    }

    fn rebuild_lut(&mut self, events: &mut Vec<EngineEvent>) {
        self.lut.rebuild(
            &self.tuning,
            self.complexity_weight,
            self.filters.bandwidth_scale,
            &self.config,
        );
        events.push(EngineEvent::LutRebuilt {
            edo: self.lut.edo(),
            complexity_weight: self.complexity_weight,
            bandwidth_scale: self.filters.bandwidth_scale,
            entries: self.lut.len(),
        });
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    /// Register a callback for every future event.
    pub fn subscribe(&mut self, callback: impl FnMut(&EngineEvent) + Send + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tuning(&self) -> &TuningConfig {
        &self.tuning
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn lut(&self) -> &HarmonicLut {
        &self.lut
    }

    pub fn chords(&self) -> &ChordBank {
        &self.chords
    }

    pub fn filters(&self) -> &HeatmapFilters {
        &self.filters
    }

    pub fn complexity_weight(&self) -> f64 {
        self.complexity_weight
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn is_active(&self, coord: AxialCoord) -> bool {
        self.chords.is_active_now(coord)
    }

    /// Cached heatmap output for a cell.
    pub fn cell_visual(&self, coord: AxialCoord) -> Option<&CellVisual> {
        self.lattice.cell(coord).and_then(LatticeCell::visual)
    }

    /// Full breakdown for one cell against the current sounding set. Not
    /// cached. `None` for cells outside the lattice and for sounding cells,
    /// which the heatmap never colors.
    pub fn reading(&self, coord: AxialCoord) -> Option<HarmonicReading> {
        let target = self.lattice.cell(coord)?;
        if self.is_active(coord) {
            return None;
        }
        let sources: Vec<i64> = self.active_cells().map(|c| c.pitch_step).collect();
        Some(heatmap::evaluate_target(
            target.pitch_step,
            &sources,
            self.gain,
            &self.filters,
            &self.lut,
            &self.config.blend,
        ))
    }

    /// Sounding cells in lattice order.
    pub fn active_cells(&self) -> impl Iterator<Item = &LatticeCell> + '_ {
        self.lattice
            .cells()
            .iter()
            .filter(|c| self.chords.is_active_now(c.coord))
    }

    pub fn active_frequencies(&self) -> Vec<f64> {
        self.active_cells().map(|c| c.frequency_hz).collect()
    }

    pub fn closest_cell_by_frequency(&self, hz: f64) -> Option<&LatticeCell> {
        self.lattice.closest_cell_by_frequency(hz)
    }

    /// Idle key color from the tuning's white-key set.
    pub fn key_color(&self, coord: AxialCoord) -> Option<Rgb> {
        let cell = self.lattice.cell(coord)?;
        Some(if cell.white_key {
            self.config.white_key_color
        } else {
            self.config.black_key_color
        })
    }

    /// Strummed chord of the sounding cells.
    pub fn chord_triggers(&self) -> Vec<NoteTrigger> {
        playback::chord(&self.active_frequencies(), &self.config.playback)
    }

    /// Ascending arpeggio of the sounding cells.
    pub fn arpeggio(&self) -> ArpeggioPlan {
        playback::arpeggio(&self.active_frequencies(), &self.config.playback)
    }

    /// Sounding notes placed on the one-octave just ruler.
    pub fn projections(&self) -> Vec<IntervalProjection> {
        let steps: Vec<i64> = self.active_cells().map(|c| c.pitch_step).collect();
        reference::interval_projections(
            &steps,
            self.tuning.edo_divisions,
            &self.config.approximator,
            &self.config.palette,
        )
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            tuning: self.tuning.name.clone(),
            edo: self.tuning.edo_divisions,
            radius: self.lattice.radius(),
            complexity_weight: self.complexity_weight,
            gain: self.gain,
            filters: self.filters.clone(),
            current_slot: self.chords.current_slot(),
            cells: self
                .lattice
                .cells()
                .iter()
                .map(|c| CellSnapshot {
                    coord: c.coord,
                    pitch_step: c.pitch_step,
                    note_index: c.note_index,
                    frequency_hz: c.frequency_hz,
                    white_key: c.white_key,
                    active: self.chords.is_active_now(c.coord),
                    visual: c.visual().cloned(),
                })
                .collect(),
        }
    }
}
