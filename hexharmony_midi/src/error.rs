use thiserror::Error;

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("malformed MIDI message: {0}")]
    Decode(#[from] midly::Error),
}
