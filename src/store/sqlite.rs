//! `rusqlite`-backed posting store: the reference relational schema from
//! §6, with bulk inserts batched and wrapped in a transaction per song.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{FingerprintError, Result};
use crate::hashing::{AnchorTime, Hash};

use super::{PostingStore, Song, SongId};

const INSERT_CHUNK_SIZE: usize = 1000;

/// `rusqlite::Connection` is not `Sync`; bulk writers are funneled through
/// one mutex rather than a connection pool, which is enough to satisfy the
/// "concurrent writers" requirement without pulling in a pooling crate the
/// teacher never used.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
        let store = Self { conn: Mutex::new(conn) };
        store.init()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
        let store = Self { conn: Mutex::new(conn) };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE IF NOT EXISTS songs (
                 id TEXT PRIMARY KEY,
                 title TEXT NOT NULL,
                 artist TEXT NOT NULL,
                 file_path TEXT NOT NULL,
                 duration REAL NOT NULL
             );
             CREATE TABLE IF NOT EXISTS postings (
                 hash INTEGER NOT NULL,
                 anchor_time INTEGER NOT NULL,
                 song_id TEXT NOT NULL REFERENCES songs(id) ON DELETE CASCADE
             );
             CREATE INDEX IF NOT EXISTS idx_postings_hash ON postings (hash);
             CREATE INDEX IF NOT EXISTS idx_postings_song_id ON postings (song_id);",
        )
        .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))
    }
}

impl PostingStore for SqliteStore {
    fn insert_song(&self, song: &Song) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO songs (id, title, artist, file_path, duration) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, artist = excluded.artist,
                 file_path = excluded.file_path, duration = excluded.duration",
            params![
                song.id.to_string(),
                song.title,
                song.artist,
                song.source_path,
                song.duration_seconds
            ],
        )
        .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    fn insert_postings(&self, song_id: SongId, postings: &[(Hash, AnchorTime)]) -> Result<()> {
        if postings.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare("INSERT INTO postings (hash, anchor_time, song_id) VALUES (?1, ?2, ?3)")
                .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;

            for chunk in postings.chunks(INSERT_CHUNK_SIZE) {
                for &(hash, anchor_time) in chunk {
                    stmt.execute(params![hash as i64, anchor_time, song_id.to_string()])
                        .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
                }
            }
        }

        tx.commit()
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    fn lookup(&self, hashes: &[Hash]) -> Result<HashMap<SongId, Vec<(Hash, AnchorTime)>>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT song_id, anchor_time FROM postings WHERE hash = ?1")
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;

        let mut result: HashMap<SongId, Vec<(Hash, AnchorTime)>> = HashMap::new();

        for &hash in hashes {
            let rows = stmt
                .query_map(params![hash as i64], |row| {
                    let id_text: String = row.get(0)?;
                    let anchor_time: AnchorTime = row.get(1)?;
                    Ok((id_text, anchor_time))
                })
                .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;

            for row in rows {
                let (id_text, anchor_time) =
                    row.map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
                let song_id = SongId::parse(&id_text)
                    .ok_or_else(|| FingerprintError::StoreUnavailable(format!("bad song id {id_text}")))?;
                result.entry(song_id).or_default().push((hash, anchor_time));
            }
        }

        Ok(result)
    }

    fn get_song(&self, song_id: SongId) -> Result<Option<Song>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, title, artist, file_path, duration FROM songs WHERE id = ?1",
            params![song_id.to_string()],
            |row| row_to_song(row),
        )
        .optional()
        .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))
    }

    fn list_songs(&self) -> Result<Vec<Song>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, title, artist, file_path, duration FROM songs")
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
        let songs = stmt
            .query_map([], row_to_song)
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
        Ok(songs)
    }

    fn count_songs(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))
    }

    fn count_postings(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM postings", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))
    }

    fn remove_song(&self, song_id: SongId) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM songs WHERE id = ?1", params![song_id.to_string()])
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("DELETE FROM postings; DELETE FROM songs;")
            .map_err(|e| FingerprintError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }
}

fn row_to_song(row: &rusqlite::Row) -> rusqlite::Result<Song> {
    let id_text: String = row.get(0)?;
    let id = SongId::parse(&id_text).unwrap_or_default();
    Ok(Song {
        id,
        title: row.get(1)?,
        artist: row.get(2)?,
        source_path: row.get(3)?,
        duration_seconds: row.get(4)?,
    })
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
    fn insert_and_lookup_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = SongId::new();
        store.insert_song(&song(id)).unwrap();
        store.insert_postings(id, &[(42, 0), (42, 7)]).unwrap();

        let result = store.lookup(&[42]).unwrap();
        assert_eq!(result[&id].len(), 2);
        assert_eq!(store.count_postings().unwrap(), 2);
    }

    #[test]
    fn cascade_delete_removes_postings_on_song_removal() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = SongId::new();
        store.insert_song(&song(id)).unwrap();
        store.insert_postings(id, &[(1, 0)]).unwrap();

        store.remove_song(id).unwrap();

        assert_eq!(store.count_postings().unwrap(), 0);
    }

    #[test]
    fn clear_empties_both_tables() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = SongId::new();
        store.insert_song(&song(id)).unwrap();
        store.insert_postings(id, &[(1, 0)]).unwrap();

        store.clear().unwrap();

        assert_eq!(store.count_songs().unwrap(), 0);
        assert_eq!(store.count_postings().unwrap(), 0);
        assert!(store.list_songs().unwrap().is_empty());
    }

    #[test]
    fn survives_a_reopen_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.sqlite");
        let path_str = path.to_str().unwrap().to_string();

        let id = SongId::new();
        {
            let store = SqliteStore::open(&path_str).unwrap();
            store.insert_song(&song(id)).unwrap();
            store.insert_postings(id, &[(7, 0)]).unwrap();
        }

        let reopened = SqliteStore::open(&path_str).unwrap();
        assert_eq!(reopened.count_songs().unwrap(), 1);
        assert_eq!(reopened.lookup(&[7]).unwrap()[&id].len(), 1);
    }
}
