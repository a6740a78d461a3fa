//! Spectrum analysis and modulation reduction.
//!
//! The analyzer turns the playback tap into byte-range magnitude bins
//! (Hann window, FFT, temporal smoothing, dB scaling); the reducer folds
//! those bins into the two scalars that drive mesh deformation.

use std::f32::consts::PI;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::params::{ModulationMapping, SpectrumConfig};

/// Per-frame modulation scalars derived from the spectrum
#[derive(Clone, Copy, Debug, Default)]
pub struct ModulationLevels {
    /// Normalized low-band peak, remapped; uniform radius offset
    pub bass: f32,
    /// Normalized high-band average, remapped; gates the noise term
    pub treble: f32,
}

/// Linear remap of `value`'s position in [in_min, in_max] into
/// [out_min, out_max]
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

/// Reduces a magnitude spectrum into bass/treble modulation scalars
#[derive(Debug, Clone, Default)]
pub struct ModulationReducer {
    mapping: ModulationMapping,
}

impl ModulationReducer {
    pub fn new(mapping: ModulationMapping) -> Self {
        Self { mapping }
    }

    /// Split the spectrum at N/2; bass follows the low band's normalized
    /// peak (power-curved to compress its dynamic range), treble the high
    /// band's normalized average. A degenerate spectrum reduces to (0, 0)
    /// rather than dividing by zero.
    pub fn reduce(&self, spectrum: &[f32]) -> ModulationLevels {
        let half = spectrum.len() / 2;
        if half == 0 {
            return ModulationLevels::default();
        }

        let (lower, upper) = spectrum.split_at(half);

        let lower_max = lower.iter().copied().fold(0.0f32, f32::max);
        let upper_avg = upper.iter().sum::<f32>() / upper.len() as f32;

        let bass_raw = lower_max / half as f32;
        let treble_raw = upper_avg / upper.len() as f32;

        let (bass_lo, bass_hi) = self.mapping.bass_out;
        let (treble_lo, treble_hi) = self.mapping.treble_out;

        ModulationLevels {
            bass: remap(
                bass_raw.powf(self.mapping.bass_exponent),
                0.0,
                1.0,
                bass_lo,
                bass_hi,
            ),
            treble: remap(treble_raw, 0.0, 1.0, treble_lo, treble_hi),
        }
    }
}

/// Spectrum analyzer over the live playback tap.
///
/// `sample` reuses the internal bin buffer every frame; nothing is
/// allocated per call. Magnitudes are scaled into [0, 255] the way the
/// reducer's calibration constants expect.
pub struct SpectrumAnalyzer {
    config: SpectrumConfig,
    tap: Arc<Mutex<Vec<f32>>>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    /// Rolling window of the most recent tap samples, one analysis
    /// window long
    history: Vec<f32>,
    fft_buf: Vec<Complex<f32>>,
    /// Temporally smoothed linear magnitudes (pre-dB)
    smoothed: Vec<f32>,
    /// Byte-range output bins, overwritten in place each frame
    bins: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer reading from the given mono tap buffer.
    ///
    /// The analysis window size is fixed here; changing it means building
    /// a new analyzer.
    pub fn new(config: SpectrumConfig, tap: Arc<Mutex<Vec<f32>>>) -> Result<Self> {
        config.validate().map_err(anyhow::Error::msg)?;

        let n = config.window_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);

        let window = (0..n).map(|i| hann_window(i, n)).collect();

        Ok(Self {
            tap,
            fft,
            window,
            history: Vec::with_capacity(n),
            fft_buf: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; config.bin_count()],
            bins: vec![0.0; config.bin_count()],
            config,
        })
    }

    /// Snapshot the current magnitude spectrum, one value per bin.
    ///
    /// Consumes the tap into a rolling one-window history. While the
    /// source is silent (paused, ended, or not yet connected) the tap
    /// produces nothing, so the smoothed magnitudes decay toward zero
    /// frame by frame instead of freezing at their last values.
    pub fn sample(&mut self) -> &[f32] {
        let n = self.config.window_size;

        let fresh = {
            let mut tap = self.tap.lock().unwrap();
            let count = tap.len();
            self.history.extend_from_slice(&tap);
            tap.clear();
            count
        };
        if self.history.len() > n {
            let excess = self.history.len() - n;
            self.history.drain(0..excess);
        }

        if fresh == 0 || self.history.len() < n {
            // Stale or underfilled window: the input is silence
            for i in 0..self.config.bin_count() {
                self.fold_magnitude(i, 0.0);
            }
            return &self.bins;
        }

        // Hann window + forward FFT
        for i in 0..n {
            self.fft_buf[i] = Complex::new(self.history[i] * self.window[i], 0.0);
        }
        self.fft.process(&mut self.fft_buf);

        let scale = 2.0 / n as f32;
        for i in 0..self.config.bin_count() {
            let magnitude = self.fft_buf[i].norm() * scale;
            self.fold_magnitude(i, magnitude);
        }

        &self.bins
    }

    /// Smooth one linear magnitude into its series, then map dB into the
    /// byte range
    fn fold_magnitude(&mut self, i: usize, magnitude: f32) {
        let tau = self.config.smoothing_time_constant;
        let smoothed = tau * self.smoothed[i] + (1.0 - tau) * magnitude;
        self.smoothed[i] = smoothed;

        let db = 20.0 * smoothed.max(1e-10).log10();
        let db_span = self.config.max_decibels - self.config.min_decibels;
        self.bins[i] = ((db - self.config.min_decibels) / db_span * 255.0).clamp(0.0, 255.0);
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_formula() {
        assert_eq!(remap(0.5, 0.0, 1.0, 0.0, 8.0), 4.0);
        assert_eq!(remap(0.0, 0.0, 1.0, 0.0, 4.0), 0.0);
        assert_eq!(remap(2.0, 0.0, 4.0, 10.0, 20.0), 15.0);
    }

    #[test]
    fn test_reduce_zero_spectrum_is_silent() {
        let reducer = ModulationReducer::default();
        let levels = reducer.reduce(&vec![0.0; 256]);
        assert_eq!(levels.bass, 0.0);
        assert_eq!(levels.treble, 0.0);
    }

    #[test]
    fn test_reduce_empty_spectrum_does_not_divide_by_zero() {
        let reducer = ModulationReducer::default();
        let levels = reducer.reduce(&[]);
        assert_eq!(levels.bass, 0.0);
        assert_eq!(levels.treble, 0.0);
    }

    #[test]
    fn test_reduce_matches_documented_scenario() {
        // N=8, halves of 4: bass_raw = max(10..)/4 = 2.5,
        // treble_raw = mean(2..)/4 = 0.5
        let reducer = ModulationReducer::default();
        let levels = reducer.reduce(&[10.0, 10.0, 10.0, 10.0, 2.0, 2.0, 2.0, 2.0]);

        let expected_bass = remap(2.5f32.powf(0.8), 0.0, 1.0, 0.0, 8.0);
        assert!((levels.bass - expected_bass).abs() < 1e-5);
        assert!((levels.treble - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_reduce_stays_in_nominal_range_for_normalized_input() {
        // Inputs whose normalized band values stay within [0, 1] land in
        // the nominal [0,8] / [0,4] output ranges.
        let reducer = ModulationReducer::default();
        let n = 256;
        let half = n / 2;
        let spectrum: Vec<f32> = (0..n).map(|i| (i % half) as f32).collect();

        let levels = reducer.reduce(&spectrum);
        assert!(levels.bass >= 0.0 && levels.bass <= 8.0);
        assert!(levels.treble >= 0.0 && levels.treble <= 4.0);
    }

    fn analyzer_with_tap(samples: Vec<f32>) -> SpectrumAnalyzer {
        let tap = Arc::new(Mutex::new(samples));
        SpectrumAnalyzer::new(SpectrumConfig::default(), tap).unwrap()
    }

    #[test]
    fn test_sample_before_connection_is_all_zeros() {
        let mut analyzer = analyzer_with_tap(Vec::new());
        let bins = analyzer.sample();
        assert_eq!(bins.len(), 256);
        assert!(bins.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_silence_yields_zero_bins() {
        let mut analyzer = analyzer_with_tap(vec![0.0; 1024]);
        assert!(analyzer.sample().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_sine_tone_peaks_at_matching_bin() {
        let n = 512;
        let k = 10; // cycles per window
        let tone: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * k as f32 * i as f32 / n as f32).sin())
            .collect();
        let mut analyzer = analyzer_with_tap(tone);

        let bins = analyzer.sample().to_vec();
        assert!(bins[k] > 200.0, "tone bin {} was {}", k, bins[k]);
        assert!(bins[k] > bins[100] + 50.0);
    }

    #[test]
    fn test_sample_consumes_the_tap() {
        let tap = Arc::new(Mutex::new(vec![0.1; 2048]));
        let mut analyzer = SpectrumAnalyzer::new(SpectrumConfig::default(), Arc::clone(&tap))
            .unwrap();

        let _ = analyzer.sample();
        assert!(tap.lock().unwrap().is_empty());
    }

    #[test]
    fn test_bins_decay_to_silence_when_tap_goes_quiet() {
        // One loud window, then the source pauses and nothing new
        // arrives: the spectrum must fall back to zero, not stay pinned.
        let n = 512;
        let tone: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * 10.0 * i as f32 / n as f32).sin())
            .collect();
        let tap = Arc::new(Mutex::new(tone));
        let mut analyzer =
            SpectrumAnalyzer::new(SpectrumConfig::default(), Arc::clone(&tap)).unwrap();

        assert!(analyzer.sample()[10] > 200.0);

        let mut prev = 255.0f32;
        for _ in 0..600 {
            let bin = analyzer.sample()[10];
            assert!(bin <= prev);
            prev = bin;
        }
        let bins = analyzer.sample().to_vec();
        assert!(
            bins.iter().all(|&b| b < 1.0),
            "tone bin still at {}",
            bins[10]
        );
    }

    #[test]
    fn test_hann_window() {
        let size = 512;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }
}
