//! Video playback surface.

pub mod mp4;
pub mod player;

use thiserror::Error;

pub use mp4::MediaInfo;
pub use player::{PlaybackStatus, StatusUpdate, VideoPlayer};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("Unsupported container: {0}")]
    UnsupportedContainer(String),

    #[error("Malformed media file: {0}")]
    Malformed(String),

    #[error("Invalid playback rate: {0}")]
    InvalidRate(f32),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PlaybackError {
    fn from(err: std::io::Error) -> Self {
        PlaybackError::Io(err.to_string())
    }
}
