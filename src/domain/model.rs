use std::fmt;
use std::path::PathBuf;

use url::Url;

use super::ViewerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Video,
    Document,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Video => f.write_str("video"),
            ResourceKind::Document => f.write_str("document"),
        }
    }
}

/// A fetchable asset: where it lives remotely and where it lands locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    pub url: Url,
    /// Path relative to the document-storage root, e.g. `/video.mp4`.
    pub relative_path: String,
}

impl ResourceDescriptor {
    pub fn parse(
        kind: ResourceKind,
        url: &str,
        relative_path: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            kind,
            url: Url::parse(url)?,
            relative_path: relative_path.into(),
        })
    }
}

/// What a finished transfer reports about the bytes it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the received bytes.
    pub checksum: String,
    pub bytes: u64,
}

/// Local file handle of one resource. `Loading` until a verified download lands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResourceState {
    #[default]
    Loading,
    Ready(PathBuf),
}

impl ResourceState {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ResourceState::Loading => None,
            ResourceState::Ready(path) => Some(path),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ResourceState::Ready(_))
    }
}

/// One viewer position on the screen. `Errored` is terminal.
#[derive(Debug, Clone)]
pub enum ViewerSlot<T> {
    Opening,
    Active(T),
    Errored(ViewerError),
}

impl<T> Default for ViewerSlot<T> {
    fn default() -> Self {
        ViewerSlot::Opening
    }
}

impl<T> ViewerSlot<T> {
    /// Installs a surface unless the slot already failed. Returns whether it was installed.
    pub fn attach(&mut self, surface: T) -> bool {
        if self.is_errored() {
            return false;
        }
        *self = ViewerSlot::Active(surface);
        true
    }

    /// Switches the slot to its error display. The first error wins.
    pub fn fail(&mut self, error: ViewerError) {
        if !self.is_errored() {
            *self = ViewerSlot::Errored(error);
        }
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, ViewerSlot::Errored(_))
    }

    pub fn active(&self) -> Option<&T> {
        match self {
            ViewerSlot::Active(surface) => Some(surface),
            _ => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewerSlot::Active(surface) => Some(surface),
            _ => None,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_rejects_bad_url() {
        assert!(ResourceDescriptor::parse(ResourceKind::Video, "not a url", "/video.mp4").is_err());
        let d = ResourceDescriptor::parse(
            ResourceKind::Document,
            "https://example.com/dummy.pdf",
            "/pdf.pdf",
        )
        .unwrap();
        assert_eq!(d.url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_errored_slot_is_terminal() {
        let mut slot: ViewerSlot<u32> = ViewerSlot::default();
        assert!(slot.attach(1));
        slot.fail(ViewerError::new("boom"));
        assert!(!slot.attach(2));
        slot.fail(ViewerError::new("second"));
        assert!(matches!(&slot, ViewerSlot::Errored(e) if e.to_string() == "boom"));
        assert!(slot.active().is_none());
    }

    #[test]
    fn test_resource_state() {
        let state = ResourceState::default();
        assert!(!state.is_ready());
        let state = ResourceState::Ready(PathBuf::from("/tmp/video.mp4"));
        assert_eq!(state.path().unwrap(), &PathBuf::from("/tmp/video.mp4"));
    }
}
