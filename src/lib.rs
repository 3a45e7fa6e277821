//! Landmark-pair audio fingerprinting and identification engine.
//!
//! A short, possibly noisy query clip is matched back to the reference
//! recording it was excerpted from via constellation hashing and a
//! time-coherent offset-histogram matcher, in the style of the
//! Wang/"landmark pair" family of algorithms.
//!
//! ```rust,no_run
//! use landmark_fp::{Config, Engine, SongMetadata};
//! use landmark_fp::store::memory::InMemoryStore;
//!
//! let engine = Engine::new(InMemoryStore::new(), Config::default());
//! let samples: Vec<f32> = vec![0.0; 44_100];
//! let id = engine.add_song(
//!     SongMetadata { title: "Example".into(), artist: "Artist".into(), source_path: "example.wav".into() },
//!     &samples,
//!     1.0,
//! ).unwrap();
//! let matches = engine.identify(&samples).unwrap();
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod fft;
pub mod hashing;
pub mod matcher;
pub mod peaks;
pub mod spectrogram;
pub mod store;

pub use config::Config;
pub use engine::{Engine, SongMetadata};
pub use error::{FingerprintError, Result};
pub use matcher::MatchCandidate;
pub use store::{PostingStore, Song, SongId};
