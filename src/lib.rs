//! Pulseorb library - Audio-reactive orb visualizer

pub mod audio;
pub mod camera;
pub mod cli;
pub mod driver;
pub mod noise_field;
pub mod orb;
pub mod params;
pub mod rendering;
