//! Playback controller over a cpal output stream.
//!
//! Owns the decoded track and the output stream, exposes transport
//! controls (load/toggle/seek/volume), and taps a mono mix of the output
//! into a shared buffer for spectrum analysis.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::decoder::decode_audio_file;
use crate::params::PlaybackConfig;

/// Upper bound on buffered tap samples; the callback drops the oldest
/// beyond this so a stalled render thread cannot grow the buffer.
const MAX_TAP_SAMPLES: usize = 8192;

/// Transport state shared with the audio callback.
///
/// All fields are atomics so the callback never blocks on the UI thread:
/// volume is stored as f32 bits.
struct Transport {
    cursor: AtomicUsize,
    playing: AtomicBool,
    volume_bits: AtomicU32,
}

impl Transport {
    /// Rewind when the cursor sits at or past the end, so resuming a
    /// finished track restarts it from the top instead of staying silent
    fn rewind_if_ended(&self, total_frames: usize) {
        if total_frames > 0 && self.cursor.load(Ordering::Relaxed) >= total_frames {
            self.cursor.store(0, Ordering::Relaxed);
        }
    }
}

/// Playback system managing the audio source and output stream
pub struct PlaybackSystem {
    /// Output stream (kept alive; None until a track is loaded)
    stream: Option<cpal::Stream>,
    transport: Arc<Transport>,
    /// Mono tap of the rendered output, read by the spectrum analyzer
    tap: Arc<Mutex<Vec<f32>>>,
    total_frames: usize,
}

impl PlaybackSystem {
    /// Create a playback system with no source loaded.
    ///
    /// Every transport method is a silent no-op until `load` succeeds.
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            stream: None,
            transport: Arc::new(Transport {
                cursor: AtomicUsize::new(0),
                playing: AtomicBool::new(false),
                volume_bits: AtomicU32::new(config.initial_volume.clamp(0.0, 1.0).to_bits()),
            }),
            tap: Arc::new(Mutex::new(Vec::new())),
            total_frames: 0,
        }
    }

    /// Shared tap buffer handle for wiring up a spectrum analyzer
    pub fn tap_buffer(&self) -> Arc<Mutex<Vec<f32>>> {
        Arc::clone(&self.tap)
    }

    /// Decode a track, build the output stream, and start playback.
    ///
    /// The one-shot failure path: an unsupported or corrupt file (or a
    /// missing output device) surfaces as `Err` and is not retried.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let track = decode_audio_file(path)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no audio output device found"))?;
        let config = device
            .default_output_config()
            .context("failed to get audio output config")?;

        let device_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        println!(
            "Track: {:.1}s @ {}Hz | Output: {} @ {}Hz",
            track.duration_s(),
            track.sample_rate,
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            device_rate
        );

        let frames = Arc::new(resample_frames(track.frames, track.sample_rate, device_rate)?);
        self.total_frames = frames.len();
        self.transport.cursor.store(0, Ordering::Relaxed);

        let transport = Arc::clone(&self.transport);
        let tap = Arc::clone(&self.tap);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let volume = f32::from_bits(transport.volume_bits.load(Ordering::Relaxed));
                    let mut tap_buf = tap.lock().unwrap();

                    for out_frame in data.chunks_mut(channels) {
                        if !transport.playing.load(Ordering::Relaxed) {
                            out_frame.fill(0.0);
                            continue;
                        }

                        let idx = transport.cursor.fetch_add(1, Ordering::Relaxed);
                        let [l, r] = if idx < frames.len() {
                            frames[idx]
                        } else {
                            // End of track: stop the transport, output silence
                            transport.playing.store(false, Ordering::Relaxed);
                            [0.0, 0.0]
                        };

                        let (l, r) = (l * volume, r * volume);
                        out_frame[0] = l;
                        if channels > 1 {
                            out_frame[1] = r;
                            for extra in &mut out_frame[2..] {
                                *extra = 0.0;
                            }
                        }

                        // The analyzer sees the same post-gain signal the
                        // speakers get
                        tap_buf.push((l + r) * 0.5);
                    }

                    let len = tap_buf.len();
                    if len > MAX_TAP_SAMPLES {
                        tap_buf.drain(0..len - MAX_TAP_SAMPLES);
                    }
                },
                |err| eprintln!("Audio stream error: {}", err),
                None,
            )
            .context("failed to build audio stream")?;

        stream.play().context("failed to start audio stream")?;

        // Replacing the stream drops (and stops) any previous one
        self.stream = Some(stream);
        self.transport.playing.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Pause if playing, resume if paused. No-op without a source.
    pub fn toggle_play(&mut self) {
        let Some(stream) = &self.stream else {
            return;
        };

        if self.transport.playing.load(Ordering::Relaxed) {
            self.transport.playing.store(false, Ordering::Relaxed);
            if let Err(e) = stream.pause() {
                eprintln!("Audio pause failed: {}", e);
            }
        } else {
            self.transport.rewind_if_ended(self.total_frames);

            // Resume the underlying stream first; it may have been
            // suspended by the host
            if let Err(e) = stream.play() {
                eprintln!("Audio resume failed: {}", e);
                return;
            }
            self.transport.playing.store(true, Ordering::Relaxed);
        }
    }

    /// Jump to a position as a fraction of total duration. No-op without
    /// a source; the fraction is clamped into [0, 1].
    pub fn seek(&self, fraction: f32) {
        if self.stream.is_none() || self.total_frames == 0 {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let frame = (fraction * self.total_frames as f32) as usize;
        self.transport
            .cursor
            .store(frame.min(self.total_frames), Ordering::Relaxed);
    }

    /// Set output gain in [0, 1]. No-op without a source.
    pub fn set_volume(&self, volume: f32) {
        if self.stream.is_none() {
            return;
        }
        self.transport
            .volume_bits
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn is_playing(&self) -> bool {
        self.transport.playing.load(Ordering::Relaxed)
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.transport.volume_bits.load(Ordering::Relaxed))
    }

    /// Current position as a fraction of total duration (0 when empty)
    pub fn position_fraction(&self) -> f32 {
        if self.total_frames == 0 {
            return 0.0;
        }
        (self.transport.cursor.load(Ordering::Relaxed) as f32 / self.total_frames as f32)
            .clamp(0.0, 1.0)
    }
}

/// Input chunk size for the offline resampling pass
const RESAMPLE_CHUNK: usize = 1024;

/// Sinc resample of a whole stereo track to the device rate.
///
/// Processed in fixed-size chunks, with a final partial pass so the
/// filter delay line is flushed; a single `process` call would drop the
/// last `sinc_len` frames of every track.
fn resample_frames(frames: Vec<[f32; 2]>, from_hz: u32, to_hz: u32) -> Result<Vec<[f32; 2]>> {
    if from_hz == to_hz {
        return Ok(frames);
    }

    let ratio = to_hz as f64 / from_hz as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0, // max resample ratio
        params,
        RESAMPLE_CHUNK,
        2, // channels
    )?;

    let left: Vec<f32> = frames.iter().map(|f| f[0]).collect();
    let right: Vec<f32> = frames.iter().map(|f| f[1]).collect();

    let capacity = (frames.len() as f64 * ratio) as usize + RESAMPLE_CHUNK;
    let mut out_left: Vec<f32> = Vec::with_capacity(capacity);
    let mut out_right: Vec<f32> = Vec::with_capacity(capacity);
    let append = |chunk: Vec<Vec<f32>>, out_l: &mut Vec<f32>, out_r: &mut Vec<f32>| {
        out_l.extend_from_slice(&chunk[0]);
        out_r.extend_from_slice(&chunk[1]);
    };

    let mut pos = 0;
    while pos + RESAMPLE_CHUNK <= left.len() {
        let input = [
            &left[pos..pos + RESAMPLE_CHUNK],
            &right[pos..pos + RESAMPLE_CHUNK],
        ];
        append(
            resampler.process(&input, None)?,
            &mut out_left,
            &mut out_right,
        );
        pos += RESAMPLE_CHUNK;
    }

    // Remainder shorter than one chunk, then flush the delay line
    if pos < left.len() {
        let input = [&left[pos..], &right[pos..]];
        append(
            resampler.process_partial(Some(&input[..]), None)?,
            &mut out_left,
            &mut out_right,
        );
    }
    append(
        resampler.process_partial::<&[f32]>(None, None)?,
        &mut out_left,
        &mut out_right,
    );

    Ok(out_left
        .iter()
        .zip(&out_right)
        .map(|(&l, &r)| [l, r])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_calls_without_source_are_no_ops() {
        let mut system = PlaybackSystem::new(PlaybackConfig::default());

        system.toggle_play();
        system.seek(0.5);
        system.set_volume(0.9);

        assert!(!system.is_playing());
        assert_eq!(system.position_fraction(), 0.0);
        assert_eq!(system.volume(), 0.5); // initial, untouched
    }

    #[test]
    fn test_initial_volume_is_clamped() {
        let system = PlaybackSystem::new(PlaybackConfig {
            initial_volume: 3.0,
        });
        assert_eq!(system.volume(), 1.0);
    }

    #[test]
    fn test_load_of_missing_file_fails() {
        let mut system = PlaybackSystem::new(PlaybackConfig::default());
        assert!(system.load("/nonexistent/track.mp3").is_err());
        assert!(!system.is_playing());
    }

    #[test]
    fn test_resample_is_identity_at_equal_rates() {
        let frames = vec![[0.1, -0.1]; 128];
        let out = resample_frames(frames.clone(), 44100, 44100).unwrap();
        assert_eq!(out, frames);
    }

    #[test]
    fn test_resample_emits_full_track_length() {
        // 100ms at 44.1kHz should yield at least 100ms at 48kHz; a
        // truncated filter tail comes up short of 4800 frames.
        let frames = vec![[0.5, -0.5]; 4410];
        let out = resample_frames(frames, 44100, 48000).unwrap();
        assert!(
            out.len() >= 4800,
            "resampled output truncated: {} frames",
            out.len()
        );
        assert!(out.len() <= 4800 + 2 * RESAMPLE_CHUNK);
    }

    #[test]
    fn test_resume_past_end_rewinds_to_start() {
        let transport = Transport {
            cursor: AtomicUsize::new(1000),
            playing: AtomicBool::new(false),
            volume_bits: AtomicU32::new(0.5f32.to_bits()),
        };

        transport.rewind_if_ended(1000);
        assert_eq!(transport.cursor.load(Ordering::Relaxed), 0);

        // Mid-track resume keeps its position
        transport.cursor.store(500, Ordering::Relaxed);
        transport.rewind_if_ended(1000);
        assert_eq!(transport.cursor.load(Ordering::Relaxed), 500);
    }
}
