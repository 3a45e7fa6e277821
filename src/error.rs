use thiserror::Error;

use crate::store::SongId;

/// Errors surfaced from any stage of the pipeline.
///
/// Every variant maps onto one of the four error kinds this crate
/// distinguishes: input malformed, parameter violation, store
/// unavailable, or (not an error) an empty result.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("audio buffer too short: have {have} samples, need at least {need}")]
    BufferTooShort { have: usize, need: usize },

    #[error("FFT length {0} is not a power of two")]
    InvalidFftLength(usize),

    #[error("posting store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("audio decode failed: {0}")]
    Decode(String),

    #[error("song not found: {0}")]
    SongNotFound(SongId),
}

pub type Result<T> = std::result::Result<T, FingerprintError>;
