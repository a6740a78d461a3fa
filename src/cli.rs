//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::params::{NoiseParams, OrbGeometry, PlaybackConfig, RadiusClamp};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Pulseorb")]
#[command(about = "Audio-reactive orb visualizer", long_about = None)]
pub struct Args {
    /// Audio file to visualize (any format the decoder supports)
    pub track: PathBuf,

    /// Noise permutation seed; omit for a fresh seed each session
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u32>,

    /// Initial playback volume in [0, 1]
    #[arg(long, value_name = "GAIN", default_value = "0.5")]
    pub volume: f32,

    /// Noise intensity multiplier
    #[arg(long, value_name = "AMOUNT", default_value = "5.0")]
    pub intensity: f32,

    /// Icosahedron subdivision level (3 = 642 vertices)
    #[arg(long, value_name = "LEVEL", default_value = "3")]
    pub detail: u32,

    /// Undeformed orb radius
    #[arg(long, value_name = "UNITS", default_value = "10.0")]
    pub radius: f32,

    /// Disable the [0.5R, 1.5R] bound on deformed vertex radii
    #[arg(long)]
    pub no_clamp: bool,
}

impl Args {
    pub fn orb_geometry(&self) -> OrbGeometry {
        OrbGeometry {
            base_radius: self.radius,
            detail: self.detail,
        }
    }

    pub fn noise_params(&self) -> NoiseParams {
        NoiseParams {
            intensity: self.intensity,
            seed: self.seed,
            ..Default::default()
        }
    }

    pub fn radius_clamp(&self) -> RadiusClamp {
        RadiusClamp {
            enabled: !self.no_clamp,
            ..Default::default()
        }
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            initial_volume: self.volume.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let args = Args::parse_from(["pulseorb", "song.mp3"]);

        let geometry = args.orb_geometry();
        assert_eq!(geometry.base_radius, 10.0);
        assert_eq!(geometry.detail, 3);

        let noise = args.noise_params();
        assert_eq!(noise.intensity, 5.0);
        assert_eq!(noise.seed, None);

        assert!(args.radius_clamp().enabled);
        assert_eq!(args.playback_config().initial_volume, 0.5);
    }

    #[test]
    fn test_no_clamp_disables_policy() {
        let args = Args::parse_from(["pulseorb", "song.mp3", "--no-clamp"]);
        assert!(!args.radius_clamp().enabled);
    }

    #[test]
    fn test_out_of_range_volume_is_clamped() {
        let args = Args::parse_from(["pulseorb", "song.mp3", "--volume", "2.5"]);
        assert_eq!(args.playback_config().initial_volume, 1.0);
    }
}
