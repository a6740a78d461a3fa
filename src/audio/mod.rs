//! Audio playback and real-time spectrum analysis.
//!
//! Decodes a user-supplied track, plays it through the default output
//! device, and taps the signal for per-frame FFT analysis feeding the
//! orb's modulation scalars.

mod decoder;
mod playback;
mod spectrum;

// Re-export public types
pub use decoder::{decode_audio_file, DecodedTrack};
pub use playback::PlaybackSystem;
pub use spectrum::{remap, ModulationLevels, ModulationReducer, SpectrumAnalyzer};
