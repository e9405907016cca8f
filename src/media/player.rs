use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{mp4, MediaInfo, PlaybackError};

const MAX_RATE: f32 = 32.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PitchCorrectionQuality {
    #[default]
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub position: Duration,
    pub duration: Duration,
    pub rate: f32,
    pub should_correct_pitch: bool,
    pub pitch_correction_quality: PitchCorrectionQuality,
}

/// Partial status change; `None` fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusUpdate {
    pub should_play: Option<bool>,
    pub position: Option<Duration>,
    pub rate: Option<f32>,
    pub should_correct_pitch: Option<bool>,
    pub pitch_correction_quality: Option<PitchCorrectionQuality>,
}

impl StatusUpdate {
    /// Audio configuration applied once the video surface is up.
    pub fn pitch_corrected() -> Self {
        Self {
            should_correct_pitch: Some(true),
            pitch_correction_quality: Some(PitchCorrectionQuality::High),
            ..Default::default()
        }
    }
}

/// Handle to an opened video. Clones share the same playback status.
#[derive(Debug, Clone)]
pub struct VideoPlayer {
    path: PathBuf,
    status: Arc<Mutex<PlaybackStatus>>,
}

impl VideoPlayer {
    /// Probe `path` and start playing it.
    pub async fn open(path: PathBuf) -> Result<Self, PlaybackError> {
        let probe_path = path.clone();
        let info = tokio::task::spawn_blocking(move || {
            let mut reader = BufReader::new(File::open(&probe_path)?);
            mp4::probe(&mut reader)
        })
        .await
        .map_err(|e| PlaybackError::Io(format!("probe task failed: {}", e)))??;

        tracing::info!(
            path = %path.display(),
            duration_secs = info.duration().as_secs_f64(),
            "video opened"
        );
        Ok(Self::with_info(path, info))
    }

    pub fn with_info(path: PathBuf, info: MediaInfo) -> Self {
        let status = PlaybackStatus {
            is_playing: true,
            position: Duration::ZERO,
            duration: info.duration(),
            rate: 1.0,
            should_correct_pitch: false,
            pitch_correction_quality: PitchCorrectionQuality::default(),
        };

        Self {
            path,
            status: Arc::new(Mutex::new(status)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> PlaybackStatus {
        *self.lock()
    }

    /// Apply `update` and resolve with the resulting status.
    pub async fn set_status(&self, update: StatusUpdate) -> Result<PlaybackStatus, PlaybackError> {
        self.apply(update)
    }

    pub fn apply(&self, update: StatusUpdate) -> Result<PlaybackStatus, PlaybackError> {
        if let Some(rate) = update.rate {
            if !(rate > 0.0 && rate <= MAX_RATE) {
                return Err(PlaybackError::InvalidRate(rate));
            }
        }

        let mut status = self.lock();
        if let Some(rate) = update.rate {
            status.rate = rate;
        }
        if let Some(position) = update.position {
            status.position = position.min(status.duration);
        }
        if let Some(should_play) = update.should_play {
            status.is_playing = should_play;
        }
        if let Some(correct) = update.should_correct_pitch {
            status.should_correct_pitch = correct;
        }
        if let Some(quality) = update.pitch_correction_quality {
            status.pitch_correction_quality = quality;
        }
        Ok(*status)
    }

    /// Play/pause. Playing from the end starts over.
    pub fn toggle(&self) {
        let mut status = self.lock();
        if status.is_playing {
            status.is_playing = false;
        } else {
            if status.position >= status.duration {
                status.position = Duration::ZERO;
            }
            status.is_playing = true;
        }
    }

    /// Move the playhead by `elapsed` wall time. Stops at the end.
    pub fn advance(&self, elapsed: Duration) {
        let mut status = self.lock();
        if !status.is_playing {
            return;
        }
        let rate = status.rate;
        status.position += elapsed.mul_f32(rate);
        if status.position >= status.duration {
            status.position = status.duration;
            status.is_playing = false;
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
