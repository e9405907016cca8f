use thiserror::Error;

/// Failure of one resource fetch. Carries strings so it can travel in UI messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Corrupted file: reported checksum {reported}, local checksum {local}")]
    Corrupted { reported: String, local: String },
}

impl FetchError {
    pub fn is_corruption(&self) -> bool {
        matches!(self, FetchError::Corrupted { .. })
    }
}

/// Opaque error reported by a viewer surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ViewerError(String);

impl ViewerError {
    #[cfg(test)]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<crate::media::PlaybackError> for ViewerError {
    fn from(err: crate::media::PlaybackError) -> Self {
        Self(err.to_string())
    }
}

impl From<crate::document::RenderError> for ViewerError {
    fn from(err: crate::document::RenderError) -> Self {
        Self(err.to_string())
    }
}
