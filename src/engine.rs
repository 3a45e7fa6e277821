//! Orchestration (C8): wires the ingest and query pipelines end to end
//! over a pluggable [`PostingStore`].

use tracing::{debug, info_span};

use crate::config::Config;
use crate::error::Result;
use crate::hashing::{self, Hash};
use crate::matcher::{self, MatchCandidate};
use crate::peaks;
use crate::spectrogram;
use crate::store::{PostingStore, Song, SongId};

/// Metadata supplied by the caller when adding a song; the id and duration
/// are assigned by [`Engine::add_song`].
#[derive(Debug, Clone)]
pub struct SongMetadata {
    pub title: String,
    pub artist: String,
    pub source_path: String,
}

/// Wraps a posting store and a pipeline configuration. One spectrogram,
/// one peak set, and one hash list are produced per call; no state
/// persists across calls other than what lands in the store.
pub struct Engine<S: PostingStore> {
    store: S,
    config: Config,
}

impl<S: PostingStore> Engine<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fingerprints `samples` (mono `f32` at `config.sample_rate`) and
    /// inserts the song and its postings atomically.
    pub fn add_song(&self, meta: SongMetadata, samples: &[f32], duration_seconds: f64) -> Result<SongId> {
        let _span = info_span!("add_song", title = %meta.title).entered();

        let song_id = SongId::new();
        let hashes = self.fingerprint(samples)?;
        debug!(count = hashes.len(), "generated fingerprints for ingest");

        let song = Song {
            id: song_id,
            title: meta.title,
            artist: meta.artist,
            source_path: meta.source_path,
            duration_seconds,
        };

        self.store.insert_song(&song)?;

        let postings: Vec<(Hash, u32)> = hashes.iter().map(|fp| (fp.hash, fp.anchor_time)).collect();
        self.store.insert_postings(song_id, &postings)?;

        Ok(song_id)
    }

    /// Fingerprints a query buffer and ranks candidates by temporal
    /// coherence. An empty return value is not an error: it means no
    /// candidate cleared the confidence threshold.
    pub fn identify(&self, samples: &[f32]) -> Result<Vec<MatchCandidate>> {
        let _span = info_span!("identify").entered();

        let hashes = self.fingerprint(samples)?;
        debug!(count = hashes.len(), "generated fingerprints for query");

        let candidates = matcher::rank_all(&self.store, &hashes, &self.config)?;
        debug!(count = candidates.len(), "ranked candidates");

        Ok(candidates)
    }

    fn fingerprint(&self, samples: &[f32]) -> Result<Vec<hashing::Fingerprint>> {
        let spectrogram = spectrogram::build(samples, &self.config)?;
        let peaks = peaks::find_peaks(&spectrogram, &self.config);
        Ok(hashing::create_hashes(&peaks, &self.config))
    }
}
