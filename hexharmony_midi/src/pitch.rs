// MIDI note number and pitch bend to frequency.
//
// Bend is the raw 14-bit wheel value (0..=16383, centre 8192), scaled so
// that full deflection reaches `±bend_range_semitones`. MPE controllers
// commonly use a 48-semitone range, which is the default here.

/// Raw bend value meaning "no bend".
pub const BEND_CENTER: u16 = 8192;

/// Default pitch-bend range (MPE).
pub const DEFAULT_BEND_RANGE_SEMITONES: f64 = 48.0;

const A4_NOTE: f64 = 69.0;
const A4_HZ: f64 = 440.0;

/// Frequency of `note` bent by a raw 14-bit value.
pub fn note_frequency(note: u8, bend_raw: u16, bend_range_semitones: f64) -> f64 {
    let bend = (f64::from(bend_raw) - f64::from(BEND_CENTER)) / f64::from(BEND_CENTER);
    let precise_note = f64::from(note) + bend * bend_range_semitones;
    A4_HZ * ((precise_note - A4_NOTE) / 12.0).exp2()
}
