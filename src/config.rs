/// Tunable parameters for the fingerprinting pipeline.
///
/// Threaded explicitly through every component rather than kept as
/// process-wide constants, so tests can override a single knob (e.g. a
/// lower `peak_threshold` for quiet synthetic fixtures) without affecting
/// other tests running in the same process.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Sample rate the pipeline operates at, in Hz.
    pub sample_rate: u32,

    /// STFT window length in samples. Must be a power of two.
    pub fft_window_size: usize,

    /// STFT hop length in samples.
    pub hop_size: usize,

    /// Frequency band edges in Hz; `n` edges define `n - 1` bands.
    pub frequency_bands: Vec<f64>,

    /// Local-maximum neighborhood radius, in frames/bins.
    pub peak_neighborhood_size: usize,

    /// Absolute magnitude threshold a peak must exceed.
    pub peak_threshold: f32,

    /// Minimum forward time offset (frames) considered for a target peak.
    pub target_zone_start: u32,

    /// Width of the forward target zone, in frames, past `target_zone_start`.
    pub target_zone_width: u32,

    /// Maximum number of hashes emitted per anchor peak.
    pub max_pairs_per_anchor: usize,

    /// Minimum number of matching hashes for a song to be considered a candidate.
    pub min_matching_hashes: usize,

    /// Minimum confidence ratio for a candidate to be returned.
    pub min_confidence_threshold: f32,

    /// Histogram bins within this distance of the dominant offset are
    /// folded into the coherent mass.
    pub time_delta_tolerance: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            fft_window_size: 4096,
            hop_size: 1024,
            frequency_bands: vec![
                40.0, 80.0, 120.0, 180.0, 300.0, 500.0, 800.0, 1200.0, 2000.0, 3000.0, 5000.0,
            ],
            peak_neighborhood_size: 10,
            peak_threshold: 0.5,
            target_zone_start: 1,
            target_zone_width: 10,
            max_pairs_per_anchor: 5,
            min_matching_hashes: 5,
            min_confidence_threshold: 0.1,
            time_delta_tolerance: 2,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_fft_window_size(mut self, size: usize) -> Self {
        self.fft_window_size = size;
        self
    }

    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = hop_size;
        self
    }

    pub fn with_peak_threshold(mut self, threshold: f32) -> Self {
        self.peak_threshold = threshold;
        self
    }

    pub fn with_min_confidence_threshold(mut self, threshold: f32) -> Self {
        self.min_confidence_threshold = threshold;
        self
    }

    pub fn with_min_matching_hashes(mut self, count: usize) -> Self {
        self.min_matching_hashes = count;
        self
    }

    /// Target zone, in frames: `[target_zone_start, target_zone_start + target_zone_width]`.
    pub fn target_zone_end(&self) -> u32 {
        self.target_zone_start + self.target_zone_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let config = Config::default();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.fft_window_size, 4096);
        assert_eq!(config.hop_size, 1024);
        assert_eq!(config.frequency_bands.len(), 11);
        assert_eq!(config.peak_neighborhood_size, 10);
        assert_eq!(config.target_zone_end(), 11);
        assert_eq!(config.max_pairs_per_anchor, 5);
        assert_eq!(config.min_matching_hashes, 5);
    }

    #[test]
    fn builder_overrides_single_field() {
        let config = Config::new().with_peak_threshold(0.1);
        assert_eq!(config.peak_threshold, 0.1);
        assert_eq!(config.sample_rate, 44_100);
    }
}
