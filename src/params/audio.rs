//! Audio analysis and playback configuration.

/// Spectrum analysis configuration
///
/// Window size is fixed at construction time; changing it requires
/// re-creating the analyzer.
#[derive(Debug, Clone)]
pub struct SpectrumConfig {
    /// Analysis window size in samples (must be power of 2)
    /// Reference value: 512 (yields 256 frequency bins)
    pub window_size: usize,

    /// Temporal smoothing factor over successive magnitude snapshots,
    /// in [0, 1). 0 = no smoothing, values near 1 = heavy smoothing.
    /// Reference value: 0.8
    pub smoothing_time_constant: f32,

    /// Magnitude at or below this level maps to bin value 0 (dB)
    pub min_decibels: f32,

    /// Magnitude at or above this level maps to bin value 255 (dB)
    pub max_decibels: f32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            window_size: 512,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl SpectrumConfig {
    /// Number of frequency bins produced per sample (half the window)
    pub fn bin_count(&self) -> usize {
        self.window_size / 2
    }

    /// Validate configuration (window must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.window_size.is_power_of_two() || self.window_size < 2 {
            return Err(format!(
                "analysis window must be a power of 2 >= 2, got {}",
                self.window_size
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(format!(
                "smoothing time constant must be in [0, 1), got {}",
                self.smoothing_time_constant
            ));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            ));
        }
        Ok(())
    }
}

/// Mapping from spectrum band energies to deformation scalars
#[derive(Debug, Clone)]
pub struct ModulationMapping {
    /// Power curve applied to the normalized bass peak before remapping,
    /// compresses the low band's dynamic range.
    /// Reference value: 0.8
    pub bass_exponent: f32,

    /// Output range for the bass scalar (drives uniform radius offset)
    /// Reference value: (0, 8)
    pub bass_out: (f32, f32),

    /// Output range for the treble scalar (gates the noise contribution)
    /// Reference value: (0, 4)
    pub treble_out: (f32, f32),
}

impl Default for ModulationMapping {
    fn default() -> Self {
        Self {
            bass_exponent: 0.8,
            bass_out: (0.0, 8.0),
            treble_out: (0.0, 4.0),
        }
    }
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Output gain applied when a track is loaded, in [0, 1]
    /// Reference value: 0.5
    pub initial_volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.5,
        }
    }
}
