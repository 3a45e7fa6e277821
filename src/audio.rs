//! Audio decode glue (G1): a thin, external-collaborator module that turns
//! an arbitrary container on disk into the mono `f32` buffer the core
//! pipeline consumes. None of the DSP logic lives here.

use std::fs::File;
use std::path::Path;

use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{FingerprintError, Result};

/// Decodes `path`, mixes down to mono, and resamples to `target_sample_rate`.
pub fn load_and_resample(path: &Path, target_sample_rate: u32) -> Result<Vec<f32>> {
    let (samples, source_rate) = decode_to_mono(path)?;

    if source_rate == target_sample_rate {
        return Ok(samples);
    }

    resample(&samples, source_rate, target_sample_rate)
}

fn decode_to_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let file = File::open(path).map_err(|e| FingerprintError::Decode(e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| FingerprintError::Decode(format!("unsupported format: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .ok_or_else(|| FingerprintError::Decode("no compatible audio track found".into()))?;

    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| FingerprintError::Decode(format!("failed to create decoder: {e}")))?;

    let mut samples = Vec::new();
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(FingerprintError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                sample_rate = decoded.spec().rate;
                mix_to_mono(&decoded, &mut samples);
            }
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(FingerprintError::Decode(e.to_string())),
        }
    }

    Ok((samples, sample_rate))
}

fn mix_to_mono(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => push_mono(buf.planes().planes(), buf.frames(), out),
        AudioBufferRef::S32(buf) => push_mono_scaled(buf.planes().planes(), buf.frames(), i32::MAX as f32, out),
        AudioBufferRef::S16(buf) => push_mono_scaled(buf.planes().planes(), buf.frames(), i16::MAX as f32, out),
        _ => {}
    }
}

fn push_mono(planes: &[&[f32]], num_frames: usize, out: &mut Vec<f32>) {
    let channels = planes.len().max(1);
    for i in 0..num_frames {
        let sum: f32 = planes.iter().map(|plane| plane[i]).sum();
        out.push(sum / channels as f32);
    }
}

fn push_mono_scaled<T: Copy + Into<i64>>(planes: &[&[T]], num_frames: usize, scale: f32, out: &mut Vec<f32>) {
    let channels = planes.len().max(1);
    for i in 0..num_frames {
        let sum: f32 = planes.iter().map(|plane| plane[i].into() as f32).sum();
        out.push(sum / channels as f32 / scale);
    }
}

fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = target_rate as f64 / source_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)
        .map_err(|e| FingerprintError::Decode(format!("resampler setup failed: {e}")))?;

    let output = resampler
        .process(&[samples.to_vec()], None)
        .map_err(|e| FingerprintError::Decode(format!("resampling failed: {e}")))?;

    Ok(output.into_iter().next().unwrap_or_default())
}
