//! The abstract posting store (C6): an inverted index from hash to
//! `(song_id, anchor_time)` postings, behind a pluggable trait.

pub mod memory;
pub mod sqlite;

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::hashing::{AnchorTime, Hash};

/// Opaque 128-bit song identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SongId(pub uuid::Uuid);

impl SongId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for SongId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Song metadata, immutable after insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub source_path: String,
    pub duration_seconds: f64,
}

/// The contract every posting store backend must satisfy.
///
/// `insert_postings` is atomic at song granularity: either every posting in
/// the batch becomes visible to `lookup`, or none do. `lookup` preserves
/// multiplicity — a hash stored twice for a song is returned twice.
pub trait PostingStore: Send + Sync {
    fn insert_song(&self, song: &Song) -> Result<()>;

    fn insert_postings(&self, song_id: SongId, postings: &[(Hash, AnchorTime)]) -> Result<()>;

    fn lookup(&self, hashes: &[Hash]) -> Result<HashMap<SongId, Vec<(Hash, AnchorTime)>>>;

    fn get_song(&self, song_id: SongId) -> Result<Option<Song>>;

    fn list_songs(&self) -> Result<Vec<Song>>;

    fn count_songs(&self) -> Result<usize>;

    fn count_postings(&self) -> Result<usize>;

    fn remove_song(&self, song_id: SongId) -> Result<()>;

    fn clear(&self) -> Result<()>;
}
