// Live MIDI → engine commands.
//
// `MidiInput` keeps the state a MIDI port needs between messages:
// - the last raw pitch bend per channel (centre 8192 until one arrives),
// - the held notes, keyed by `(channel, note)`, each mapped to the lattice
//   cell it activated. MPE sends the same note number on several channels
//   with different bends, so the channel is part of the key.
//
// NoteOn (velocity > 0) computes the bent frequency, picks the closest cell,
// activates it in the current slot if it is not already sounding, and
// returns a trigger at the cell's tuned frequency. NoteOff, or NoteOn with
// velocity 0, deactivates the remembered cell. Everything else is ignored.
//
// See also: `pitch.rs`, `hexharmony_engine::engine` for the commands and
// frequency lookup.

use crate::error::MidiError;
use crate::pitch::{BEND_CENTER, DEFAULT_BEND_RANGE_SEMITONES, note_frequency};
use hexharmony_engine::lattice::AxialCoord;
use hexharmony_engine::playback::NoteTrigger;
use hexharmony_engine::{EngineCommand, HarmonicEngine};
use midly::MidiMessage;
use midly::live::LiveEvent;
use midly::num::u4;
use std::collections::BTreeMap;

/// What a message did.
#[derive(Clone, Debug, PartialEq)]
pub enum MidiResponse {
    /// A note landed on `coord`; play `trigger`.
    NoteOn { coord: AxialCoord, trigger: NoteTrigger },
    /// A held note was released from `coord`.
    NoteOff { coord: AxialCoord },
    /// A channel's bend was updated.
    Bend { channel: u8, raw: u16 },
    /// Nothing the keyboard reacts to.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct MidiInput {
    bend_range_semitones: f64,
    channel_bends: [u16; 16],
    held: BTreeMap<(u8, u8), AxialCoord>,
}

impl Default for MidiInput {
    fn default() -> Self {
        Self::with_bend_range(DEFAULT_BEND_RANGE_SEMITONES)
    }
}

impl MidiInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bend_range(bend_range_semitones: f64) -> Self {
        Self {
            bend_range_semitones,
            channel_bends: [BEND_CENTER; 16],
            held: BTreeMap::new(),
        }
    }

    pub fn bend_range_semitones(&self) -> f64 {
        self.bend_range_semitones
    }

    /// Raw bend currently applied to a channel (0-based).
    pub fn channel_bend(&self, channel: u8) -> u16 {
        self.channel_bends
            .get(usize::from(channel))
            .copied()
            .unwrap_or(BEND_CENTER)
    }

    /// The cell a held note activated.
    pub fn held_cell(&self, channel: u8, note: u8) -> Option<AxialCoord> {
        self.held.get(&(channel, note)).copied()
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Decode one raw live message and handle it.
    pub fn handle_bytes(
        &mut self,
        engine: &mut HarmonicEngine,
        bytes: &[u8],
    ) -> Result<MidiResponse, MidiError> {
        match LiveEvent::parse(bytes)? {
            LiveEvent::Midi { channel, message } => Ok(self.handle_message(engine, channel, message)),
            _ => Ok(MidiResponse::Ignored),
        }
    }

    /// Handle an already-decoded channel message.
    pub fn handle_message(
        &mut self,
        engine: &mut HarmonicEngine,
        channel: u4,
        message: MidiMessage,
    ) -> MidiResponse {
        let channel = channel.as_int();
        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                self.note_on(engine, channel, key.as_int())
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                self.note_off(engine, channel, key.as_int())
            }
            MidiMessage::PitchBend { bend } => {
                let raw = bend.0.as_int();
                if let Some(slot) = self.channel_bends.get_mut(usize::from(channel)) {
                    *slot = raw;
                }
                MidiResponse::Bend { channel, raw }
            }
            _ => MidiResponse::Ignored,
        }
    }

    fn note_on(&mut self, engine: &mut HarmonicEngine, channel: u8, note: u8) -> MidiResponse {
        let hz = note_frequency(note, self.channel_bend(channel), self.bend_range_semitones);
        let Some(cell) = engine.closest_cell_by_frequency(hz) else {
            tracing::debug!(channel, note, hz, "no lattice cell for note");
            return MidiResponse::Ignored;
        };
        let coord = cell.coord;
        let trigger = NoteTrigger::now(cell.frequency_hz, &engine.config().playback);

        self.held.insert((channel, note), coord);
        if !engine.is_active(coord) {
            engine.apply(EngineCommand::SetCellActive { coord, active: true });
        }
        tracing::trace!(channel, note, hz, %coord, "note on");
        MidiResponse::NoteOn { coord, trigger }
    }

    fn note_off(&mut self, engine: &mut HarmonicEngine, channel: u8, note: u8) -> MidiResponse {
        let Some(coord) = self.held.remove(&(channel, note)) else {
            return MidiResponse::Ignored;
        };
        if engine.is_active(coord) {
            engine.apply(EngineCommand::SetCellActive { coord, active: false });
        }
        MidiResponse::NoteOff { coord }
    }
}
