//! In-memory posting store: the test double the core is required to
//! compile and run against, and a reasonable default for small libraries.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::hashing::{AnchorTime, Hash};

use super::{PostingStore, Song, SongId};

#[derive(Default)]
struct State {
    songs: HashMap<SongId, Song>,
    // hash -> postings, each posting tagged with its song.
    postings: HashMap<Hash, Vec<(SongId, AnchorTime)>>,
}

/// `RwLock`-guarded in-memory implementation of [`PostingStore`].
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PostingStore for InMemoryStore {
    fn insert_song(&self, song: &Song) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.songs.insert(song.id, song.clone());
        Ok(())
    }

    fn insert_postings(&self, song_id: SongId, postings: &[(Hash, AnchorTime)]) -> Result<()> {
        let mut state = self.state.write().unwrap();
        // Stage the inserts so a bulk call has no visible partial effect;
        // nothing here can actually fail once the lock is held, but the
        // staging keeps the atomicity contract obvious and cheap to keep
        // honest if a future backend-specific failure is added here.
        let staged: Vec<(Hash, SongId, AnchorTime)> = postings
            .iter()
            .map(|&(hash, anchor_time)| (hash, song_id, anchor_time))
            .collect();

        for (hash, song_id, anchor_time) in staged {
            state.postings.entry(hash).or_default().push((song_id, anchor_time));
        }
        Ok(())
    }

    fn lookup(&self, hashes: &[Hash]) -> Result<HashMap<SongId, Vec<(Hash, AnchorTime)>>> {
        let state = self.state.read().unwrap();
        let mut result: HashMap<SongId, Vec<(Hash, AnchorTime)>> = HashMap::new();

        for &hash in hashes {
            if let Some(postings) = state.postings.get(&hash) {
                for &(song_id, anchor_time) in postings {
                    result.entry(song_id).or_default().push((hash, anchor_time));
                }
            }
        }

        Ok(result)
    }

    fn get_song(&self, song_id: SongId) -> Result<Option<Song>> {
        let state = self.state.read().unwrap();
        Ok(state.songs.get(&song_id).cloned())
    }

    fn list_songs(&self) -> Result<Vec<Song>> {
        let state = self.state.read().unwrap();
        Ok(state.songs.values().cloned().collect())
    }

    fn count_songs(&self) -> Result<usize> {
        let state = self.state.read().unwrap();
        Ok(state.songs.len())
    }

    fn count_postings(&self) -> Result<usize> {
        let state = self.state.read().unwrap();
        Ok(state.postings.values().map(|v| v.len()).sum())
    }

    fn remove_song(&self, song_id: SongId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.songs.remove(&song_id);
        for postings in state.postings.values_mut() {
            postings.retain(|&(id, _)| id != song_id);
        }
        state.postings.retain(|_, postings| !postings.is_empty());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.songs.clear();
        state.postings.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: SongId) -> Song {
        Song {
            id,
            title: "Title".into(),
            artist: "Artist".into(),
            source_path: "path.wav".into(),
            duration_seconds: 10.0,
        }
    }

    #[test]
    fn lookup_returns_a_multiset_equal_to_what_was_inserted() {
        let store = InMemoryStore::new();
        let id = SongId::new();
        store.insert_song(&song(id)).unwrap();
        store.insert_postings(id, &[(1, 0), (1, 5), (2, 10)]).unwrap();

        let result = store.lookup(&[1, 2]).unwrap();
        let postings = &result[&id];
        assert_eq!(postings.len(), 3);
        assert!(postings.contains(&(1, 0)));
        assert!(postings.contains(&(1, 5)));
        assert!(postings.contains(&(2, 10)));
    }

    #[test]
    fn clear_resets_counts_and_drops_referential_integrity() {
        let store = InMemoryStore::new();
        let id = SongId::new();
        store.insert_song(&song(id)).unwrap();
        store.insert_postings(id, &[(1, 0)]).unwrap();

        store.clear().unwrap();

        assert_eq!(store.count_songs().unwrap(), 0);
        assert_eq!(store.count_postings().unwrap(), 0);
        assert!(store.get_song(id).unwrap().is_none());
    }

    #[test]
    fn remove_song_cascades_to_its_postings() {
        let store = InMemoryStore::new();
        let id_a = SongId::new();
        let id_b = SongId::new();
        store.insert_song(&song(id_a)).unwrap();
        store.insert_song(&song(id_b)).unwrap();
        store.insert_postings(id_a, &[(1, 0)]).unwrap();
        store.insert_postings(id_b, &[(1, 1)]).unwrap();

        store.remove_song(id_a).unwrap();

        let result = store.lookup(&[1]).unwrap();
        assert!(!result.contains_key(&id_a));
        assert!(result.contains_key(&id_b));
    }
}
