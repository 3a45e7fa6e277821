//! Constellation hasher (C5): pairs an anchor peak with targets in a
//! forward target zone and packs each pair into a 64-bit hash.

use crate::config::Config;
use crate::peaks::Peak;

pub type Hash = u64;
pub type AnchorTime = u32;

/// One emitted hash together with its anchor's time frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub hash: Hash,
    pub anchor_time: AnchorTime,
}

/// Packs `(f_anchor, f_target, delta_t)` into a bit-exact 64-bit hash:
/// `(f_anchor << 32) | (f_target << 16) | delta_t`.
///
/// No masking is applied; callers must ensure the inputs fit (frequency
/// bins fit in 16 bits given `fft_window_size <= 65536`, and `delta_t` is
/// bounded by the target zone width, itself far below 2^16).
pub fn pack_hash(f_anchor: u16, f_target: u16, delta_t: u16) -> Hash {
    ((f_anchor as u64) << 32) | ((f_target as u64) << 16) | (delta_t as u64)
}

/// Unpacks a hash back into `(f_anchor, f_target, delta_t)`.
pub fn unpack_hash(hash: Hash) -> (u16, u16, u16) {
    let f_anchor = ((hash >> 32) & 0xFFFF) as u16;
    let f_target = ((hash >> 16) & 0xFFFF) as u16;
    let delta_t = (hash & 0xFFFF) as u16;
    (f_anchor, f_target, delta_t)
}

/// Builds the hash list for a peak set.
///
/// Peaks are sorted by ascending time (stable, so ties preserve the peak
/// picker's emission order). Each anchor scans forward for targets whose
/// `delta_t` falls in `[target_zone_start, target_zone_end]`, emitting at
/// most `max_pairs_per_anchor` hashes and stopping early once sorted time
/// order guarantees no further target can fall in the zone.
pub fn create_hashes(peaks: &[Peak], config: &Config) -> Vec<Fingerprint> {
    let mut sorted: Vec<&Peak> = peaks.iter().collect();
    sorted.sort_by_key(|p| p.t);

    let zone_start = config.target_zone_start as u64;
    let zone_end = config.target_zone_end() as u64;

    let mut fingerprints = Vec::new();

    for i in 0..sorted.len() {
        let anchor = sorted[i];
        let mut emitted = 0usize;

        for target in sorted.iter().skip(i + 1) {
            if emitted >= config.max_pairs_per_anchor {
                break;
            }

            let delta_t = target.t as u64 - anchor.t as u64;
            if delta_t > zone_end {
                // Sorted by time: every subsequent target has delta_t >= this one.
                break;
            }
            if delta_t < zone_start {
                continue;
            }

            let hash = pack_hash(anchor.f as u16, target.f as u16, delta_t as u16);
            fingerprints.push(Fingerprint {
                hash,
                anchor_time: anchor.t as AnchorTime,
            });
            emitted += 1;
        }
    }

    fingerprints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(t: usize, f: usize) -> Peak {
        Peak { t, f, magnitude: 1.0 }
    }

    #[test]
    fn pack_and_unpack_round_trip() {
        let h = pack_hash(123, 456, 7);
        assert_eq!(unpack_hash(h), (123, 456, 7));
        assert_eq!(pack_hash(123, 456, 7), h);
    }

    #[test]
    fn no_hashes_from_a_single_peak() {
        let config = Config::default();
        let peaks = vec![peak(0, 10)];
        assert!(create_hashes(&peaks, &config).is_empty());
    }

    #[test]
    fn pairs_within_target_zone_are_emitted() {
        let config = Config::default();
        let peaks = vec![peak(0, 10), peak(1, 20), peak(11, 30), peak(12, 40)];
        let hashes = create_hashes(&peaks, &config);

        // anchor at t=0: targets at dt=1 (ok), dt=11 (ok, zone end inclusive), dt=12 (rejected)
        let anchor0: Vec<_> = hashes
            .iter()
            .filter(|fp| fp.anchor_time == 0)
            .collect();
        assert_eq!(anchor0.len(), 2);
    }

    #[test]
    fn caps_at_max_pairs_per_anchor() {
        let config = Config::default();
        let mut peaks = vec![peak(0, 0)];
        for dt in 1..=11u32 {
            peaks.push(peak(dt as usize, dt as usize));
        }
        let hashes = create_hashes(&peaks, &config);
        let anchor0 = hashes.iter().filter(|fp| fp.anchor_time == 0).count();
        assert_eq!(anchor0, config.max_pairs_per_anchor);
    }

    #[test]
    fn determinism_is_independent_of_song_identity() {
        // The hasher has no notion of song_id at all; calling it twice on
        // the same peaks must reproduce identical output regardless of
        // whatever the caller later tags the result with.
        let config = Config::default();
        let peaks = vec![peak(0, 10), peak(2, 20), peak(5, 30)];
        let a = create_hashes(&peaks, &config);
        let b = create_hashes(&peaks, &config);
        assert_eq!(a, b);
    }
}
