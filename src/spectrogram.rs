//! Windowed framing (C2) and the spectrogram builder that drives it through
//! the FFT primitive (C3).

use crate::config::Config;
use crate::error::Result;
use crate::fft;

/// A frame-major magnitude spectrogram: `frames[t][f]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    pub frames: Vec<Vec<f32>>,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn num_bins(&self) -> usize {
        self.frames.first().map_or(0, |f| f.len())
    }
}

/// Number of whole frames a buffer of `num_samples` yields at the given
/// window/hop. The last incomplete frame is discarded, never zero-padded.
pub fn frame_count(num_samples: usize, window_size: usize, hop_size: usize) -> usize {
    if num_samples < window_size {
        0
    } else {
        (num_samples - window_size) / hop_size + 1
    }
}

fn hamming_window(window_size: usize) -> Vec<f32> {
    if window_size <= 1 {
        return vec![1.0; window_size];
    }
    (0..window_size)
        .map(|i| {
            0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / (window_size - 1) as f32).cos()
        })
        .collect()
}

/// Computes the magnitude row for one window-sized chunk of samples.
///
/// `scratch_re`/`scratch_im` are reused across calls by callers that stream
/// frames one at a time, so no allocation happens per frame.
fn magnitude_frame(
    chunk: &[f32],
    window: &[f32],
    scratch_re: &mut [f32],
    scratch_im: &mut [f32],
) -> Result<Vec<f32>> {
    for ((re, &sample), &w) in scratch_re.iter_mut().zip(chunk).zip(window) {
        *re = sample * w;
    }
    scratch_im.iter_mut().for_each(|v| *v = 0.0);

    fft::fft_in_place(scratch_re, scratch_im)?;

    let num_bins = chunk.len() / 2;
    Ok((0..num_bins)
        .map(|k| (scratch_re[k] * scratch_re[k] + scratch_im[k] * scratch_im[k]).sqrt())
        .collect())
}

/// Builds the full spectrogram in memory. Convenient for tests and short
/// queries; for long songs prefer [`for_each_frame`], which bounds memory
/// to a handful of frames.
pub fn build(samples: &[f32], config: &Config) -> Result<Spectrogram> {
    let window_size = config.fft_window_size;
    let hop_size = config.hop_size;
    let window = hamming_window(window_size);

    let n = frame_count(samples.len(), window_size, hop_size);
    let mut frames = Vec::with_capacity(n);
    let mut scratch_re = vec![0.0f32; window_size];
    let mut scratch_im = vec![0.0f32; window_size];

    for i in 0..n {
        let start = i * hop_size;
        let chunk = &samples[start..start + window_size];
        frames.push(magnitude_frame(chunk, &window, &mut scratch_re, &mut scratch_im)?);
    }

    Ok(Spectrogram { frames })
}

/// Streams magnitude rows one frame at a time via `on_frame(t, row)`,
/// avoiding materializing the whole spectrogram for long inputs.
pub fn for_each_frame(
    samples: &[f32],
    config: &Config,
    mut on_frame: impl FnMut(usize, &[f32]) -> Result<()>,
) -> Result<()> {
    let window_size = config.fft_window_size;
    let hop_size = config.hop_size;
    let window = hamming_window(window_size);

    let n = frame_count(samples.len(), window_size, hop_size);
    let mut scratch_re = vec![0.0f32; window_size];
    let mut scratch_im = vec![0.0f32; window_size];

    for i in 0..n {
        let start = i * hop_size;
        let chunk = &samples[start..start + window_size];
        let row = magnitude_frame(chunk, &window, &mut scratch_re, &mut scratch_im)?;
        on_frame(i, &row)?;
    }

    Ok(())
}
