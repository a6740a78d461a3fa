//! Audio file decoding via symphonia.

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Fully decoded track, stereo f32 frames at the source sample rate
pub struct DecodedTrack {
    pub frames: Vec<[f32; 2]>,
    pub sample_rate: u32,
}

impl DecodedTrack {
    pub fn duration_s(&self) -> f32 {
        self.frames.len() as f32 / self.sample_rate as f32
    }
}

/// Decode an audio file into stereo f32 frames.
///
/// Container and codec support is whatever symphonia was built with; an
/// unsupported or corrupt file surfaces as `Err` and is not retried.
/// Mono sources are duplicated to both channels, extra channels are
/// dropped.
pub fn decode_audio_file<P: AsRef<Path>>(path: P) -> Result<DecodedTrack> {
    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let hint = Hint::new();
    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();
    let decoder_opts = DecoderOptions::default();

    let probed =
        symphonia::default::get_probe().format(&hint, mss, &format_opts, &metadata_opts)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow!("no supported audio tracks"))?;

    let mut decoder = symphonia::default::get_codecs().make(&track.codec_params, &decoder_opts)?;

    let track_id = track.id;
    let mut frames: Vec<[f32; 2]> = Vec::new();
    let mut sample_rate = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(_)) => break, // end of stream
            Err(err) => return Err(anyhow!(err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;

                let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);

                let channels = spec.channels.count();
                for frame in sample_buf.samples().chunks(channels) {
                    match frame.len() {
                        0 => {}
                        1 => frames.push([frame[0], frame[0]]),
                        _ => frames.push([frame[0], frame[1]]),
                    }
                }
            }
            Err(Error::IoError(_)) => break,
            Err(Error::DecodeError(_)) => (), // skip bad packets
            Err(err) => return Err(anyhow!(err)),
        }
    }

    if frames.is_empty() || sample_rate == 0 {
        return Err(anyhow!("track decoded to no audio"));
    }

    Ok(DecodedTrack {
        frames,
        sample_rate,
    })
}
