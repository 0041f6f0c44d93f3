// hexharmony_midi — MIDI input adapter for the hexharmony engine.
//
// Converts live MIDI (note on/off and per-channel pitch bend, MPE style) into
// engine commands. Every incoming note is turned into a precise frequency
// (note number plus the channel's current bend), snapped to the nearest
// lattice cell, and activated in the engine's current chord slot. The audio
// side is told to play the *cell's* tuned frequency, so MIDI input always
// sounds inside the active EDO.
//
// Module overview:
// - `pitch.rs`: note + bend → Hz.
// - `input.rs`: MidiInput — per-channel bend state, held-note map, dispatch.
// - `error.rs`: MidiError for undecodable byte input.
//
// Parsing of raw bytes is delegated to `midly::live`.

pub mod error;
pub mod input;
pub mod pitch;

pub use error::MidiError;
pub use input::{MidiInput, MidiResponse};
pub use pitch::note_frequency;
