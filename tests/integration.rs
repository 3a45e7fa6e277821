//! End-to-end scenarios from the fingerprinting engine's design spec:
//! silence, pure-tone self-match, distinct tones, temporal offset, noisy
//! mixtures, and referential integrity after a store clear.

use std::f32::consts::PI;

use landmark_fp::store::memory::InMemoryStore;
use landmark_fp::{Config, Engine, SongMetadata};

const SAMPLE_RATE: u32 = 44_100;

fn sine(freq: f32, seconds: f32) -> Vec<f32> {
    let n = (seconds * SAMPLE_RATE as f32) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.8 * (2.0 * PI * freq * t).sin()
        })
        .collect()
}

fn multi_tone(seconds: f32) -> Vec<f32> {
    let n = (seconds * SAMPLE_RATE as f32) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let mut s = 0.0;
            for freq in [220.0, 440.0, 880.0, 1760.0] {
                s += (2.0 * PI * freq * t).sin();
            }
            0.2 * s
        })
        .collect()
}

/// Deterministic pseudo-random noise generator (xorshift), so tests don't
/// depend on an external `rand` crate for a single fixture.
struct XorShift(u32);

impl XorShift {
    fn next(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

fn metadata(title: &str) -> SongMetadata {
    SongMetadata {
        title: title.into(),
        artist: "Test".into(),
        source_path: format!("{title}.wav"),
    }
}

#[test]
fn silence_in_empty_out() {
    let engine = Engine::new(InMemoryStore::new(), Config::default());
    let silence = vec![0.0f32; SAMPLE_RATE as usize];

    engine.add_song(metadata("Silence"), &silence, 1.0).unwrap();
    let result = engine.identify(&silence).unwrap();

    assert!(result.is_empty());
}

#[test]
fn pure_tone_self_match() {
    let engine = Engine::new(InMemoryStore::new(), Config::default());
    let tone = sine(440.0, 2.0);

    let id = engine.add_song(metadata("A440"), &tone, 2.0).unwrap();
    let result = engine.identify(&tone).unwrap();

    assert!(!result.is_empty());
    assert_eq!(result[0].song_id, id);
    assert!(result[0].confidence >= 0.5);
}

#[test]
fn distinct_tones_do_not_match() {
    let engine = Engine::new(InMemoryStore::new(), Config::default());
    let a440 = sine(440.0, 2.0);
    let a880 = sine(880.0, 2.0);

    engine.add_song(metadata("A440"), &a440, 2.0).unwrap();
    let result = engine.identify(&a880).unwrap();

    assert!(result.iter().all(|c| c.confidence < 0.3));
}

#[test]
fn temporal_offset_recovers_the_query_start_within_frame_slop() {
    let engine = Engine::new(InMemoryStore::new(), Config::default());
    let song = multi_tone(10.0);

    let id = engine.add_song(metadata("Multi"), &song, 10.0).unwrap();

    let start = 3 * SAMPLE_RATE as usize;
    let end = 6 * SAMPLE_RATE as usize;
    let query = &song[start..end];

    let result = engine.identify(query).unwrap();
    assert!(!result.is_empty());
    assert_eq!(result[0].song_id, id);

    let expected_offset = (3.0 * SAMPLE_RATE as f32 / engine.config().hop_size as f32).round() as i64;
    assert!(
        (result[0].dominant_offset - expected_offset).abs() <= 2,
        "expected offset near {expected_offset}, got {}",
        result[0].dominant_offset
    );
}

#[test]
fn noisy_query_still_matches_above_the_confidence_floor() {
    let engine = Engine::new(InMemoryStore::new(), Config::default());
    let song = multi_tone(10.0);

    let id = engine.add_song(metadata("Multi"), &song, 10.0).unwrap();

    let start = 3 * SAMPLE_RATE as usize;
    let end = 6 * SAMPLE_RATE as usize;
    let mut query: Vec<f32> = song[start..end].to_vec();

    // Signal power is ~0.2^2 * 4 / 2 per tone summed; approximate -10dB SNR
    // noise amplitude empirically rather than computing exact RMS, since
    // the test only needs the floor behavior, not an exact SNR figure.
    let mut rng = XorShift(0xC0FFEE);
    for sample in query.iter_mut() {
        *sample += 0.15 * rng.next();
    }

    let result = engine.identify(&query).unwrap();
    assert!(!result.is_empty());
    assert_eq!(result[0].song_id, id);
    assert!(result[0].confidence >= 0.1);
}

#[test]
fn clear_drops_referential_integrity() {
    let engine = Engine::new(InMemoryStore::new(), Config::default());
    let tone = sine(440.0, 1.0);

    let id = engine.add_song(metadata("A440"), &tone, 1.0).unwrap();
    assert_eq!(engine.store().count_songs().unwrap(), 1);

    engine.store().clear().unwrap();

    assert!(engine.store().list_songs().unwrap().is_empty());
    assert_eq!(engine.store().count_postings().unwrap(), 0);
    assert!(engine.store().get_song(id).unwrap().is_none());
}

#[test]
fn buffer_shorter_than_one_window_yields_no_hashes_without_erroring() {
    let engine = Engine::new(InMemoryStore::new(), Config::default());
    let short = vec![0.5f32; 100];

    let id = engine.add_song(metadata("Short"), &short, 0.002).unwrap();
    assert!(engine.store().get_song(id).unwrap().is_some());
    assert_eq!(engine.store().count_postings().unwrap(), 0);
}
