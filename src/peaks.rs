//! Constellation-style spectral peak picker (C4): banded search combined
//! with a local-maximum test and an absolute magnitude threshold.

use crate::config::Config;
use crate::spectrogram::Spectrogram;

/// A spectral peak found at time frame `t`, frequency bin `f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub t: usize,
    pub f: usize,
    pub magnitude: f32,
}

fn hz_to_bin(hz: f64, window_size: usize, sample_rate: u32) -> usize {
    (hz * window_size as f64 / sample_rate as f64).round() as usize
}

/// Bin ranges for the bands defined by `config.frequency_bands`, in
/// ascending order, each range being `[start, end)`.
fn band_bin_ranges(config: &Config) -> Vec<(usize, usize)> {
    let edges: Vec<usize> = config
        .frequency_bands
        .iter()
        .map(|&hz| hz_to_bin(hz, config.fft_window_size, config.sample_rate))
        .collect();

    edges.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Selects peaks from a full spectrogram.
///
/// Emission order is load-bearing for the hasher downstream: frames
/// ascending, then bands ascending, then bins ascending within the band.
pub fn find_peaks(spectrogram: &Spectrogram, config: &Config) -> Vec<Peak> {
    let bands = band_bin_ranges(config);
    let num_bins = spectrogram.num_bins();
    let mut peaks = Vec::new();

    for (t, _) in spectrogram.frames.iter().enumerate() {
        for &(band_start, band_end) in &bands {
            let end = band_end.min(num_bins);
            for f in band_start..end {
                if let Some(magnitude) = peak_at(spectrogram, config, t, f) {
                    peaks.push(Peak { t, f, magnitude });
                }
            }
        }
    }

    peaks
}

/// Tests whether `(t, f)` is a peak: magnitude above threshold and `>=`
/// every neighbor in the clipped radius-`peak_neighborhood_size` square
/// (center excluded); ties at the neighborhood are accepted as peaks.
fn peak_at(spectrogram: &Spectrogram, config: &Config, t: usize, f: usize) -> Option<f32> {
    let magnitude = spectrogram.frames[t][f];
    if magnitude <= config.peak_threshold {
        return None;
    }

    let radius = config.peak_neighborhood_size;
    let num_frames = spectrogram.num_frames();
    let num_bins = spectrogram.num_bins();

    let t_start = t.saturating_sub(radius);
    let t_end = (t + radius + 1).min(num_frames);
    let f_start = f.saturating_sub(radius);
    let f_end = (f + radius + 1).min(num_bins);

    for nt in t_start..t_end {
        for nf in f_start..f_end {
            if nt == t && nf == f {
                continue;
            }
            if spectrogram.frames[nt][nf] > magnitude {
                return None;
            }
        }
    }

    Some(magnitude)
}
