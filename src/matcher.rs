//! Time-coherent matcher (C7): builds an offset histogram per candidate
//! song and scores by the mass in the dominant offset bin.

use std::collections::HashMap;

use crate::config::Config;
use crate::hashing::Fingerprint;
use crate::store::{PostingStore, SongId};

/// A candidate song and its confidence, sorted descending by `confidence`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub song_id: SongId,
    pub confidence: f32,
    pub dominant_offset: i64,
}

/// Scores every candidate song the query's hashes touch in `store`,
/// returning all survivors sorted by descending confidence.
///
/// `qtime` keeps every query occurrence of a repeated hash (spec §9's
/// principled option (b): a repeated hash scores against each of its
/// query-local anchor times, rather than only the last one seen).
pub fn rank_all(
    store: &dyn PostingStore,
    query: &[Fingerprint],
    config: &Config,
) -> crate::error::Result<Vec<MatchCandidate>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut qtime: HashMap<u64, Vec<i64>> = HashMap::new();
    let hashes: Vec<u64> = query.iter().map(|fp| fp.hash).collect();
    for fp in query {
        qtime.entry(fp.hash).or_default().push(fp.anchor_time as i64);
    }

    let matches_by_song = store.lookup(&hashes)?;

    let mut candidates = Vec::new();

    for (song_id, matches) in matches_by_song {
        if matches.len() < config.min_matching_hashes {
            continue;
        }

        let mut histogram: HashMap<i64, usize> = HashMap::new();
        for (hash, song_anchor_time) in &matches {
            if let Some(query_times) = qtime.get(hash) {
                for &query_time in query_times {
                    let delta = *song_anchor_time as i64 - query_time;
                    *histogram.entry(delta).or_insert(0) += 1;
                }
            }
        }

        let Some(dominant_offset) = histogram.iter().fold(None, |best: Option<(i64, usize)>, (&delta, &count)| {
            match best {
                Some((best_delta, best_count))
                    if count < best_count || (count == best_count && delta >= best_delta) =>
                {
                    Some((best_delta, best_count))
                }
                _ => Some((delta, count)),
            }
        }).map(|(delta, _)| delta) else {
            continue;
        };

        let coherent: usize = histogram
            .iter()
            .filter(|(&delta, _)| (delta - dominant_offset).abs() <= config.time_delta_tolerance)
            .map(|(_, &count)| count)
            .sum();

        let confidence = (coherent as f32 / query.len() as f32).min(1.0);

        if confidence >= config.min_confidence_threshold {
            candidates.push(MatchCandidate {
                song_id,
                confidence,
                dominant_offset,
            });
        }
    }

    candidates.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
    Ok(candidates)
}

/// Convenience wrapper over [`rank_all`] that keeps only the top `n`.
pub fn rank(
    store: &dyn PostingStore,
    query: &[Fingerprint],
    config: &Config,
    n: usize,
) -> crate::error::Result<Vec<MatchCandidate>> {
    let mut all = rank_all(store, query, config)?;
    all.truncate(n);
    Ok(all)
}
