use std::path::PathBuf;
use std::time::Duration;

use iced::{task, time, Subscription, Task};

use crate::api::{FetchClient, ScreenConfig};
use crate::application::{fetch_in_order, DownloadCoordinator, FetchEvent};
use crate::document::{PdfViewer, RenderError};
use crate::domain::{FetchError, ResourceKind, ResourceState, ViewerError, ViewerSlot};
use crate::media::{PlaybackError, PlaybackStatus, StatusUpdate, VideoPlayer};
use crate::ui::{self, SurfaceMessage};

const STATUS_LABEL: &str = "Downloading files...";
const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);
const PLAYBACK_CLOCK: Duration = Duration::from_millis(250);

pub struct Screen {
    state: ScreenState,
    /// Abort handle of the download sequence while it is still running.
    downloads: Option<task::Handle>,
}

impl Screen {
    pub fn new() -> (Self, Task<Message>) {
        let config = ScreenConfig::default();
        let mut screen = Self {
            state: ScreenState::default(),
            downloads: None,
        };

        match start_downloads(&config) {
            Ok(stream) => {
                let (task, handle) = Task::stream(stream).map(Message::Fetch).abortable();
                screen.downloads = Some(handle);
                (screen, task)
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot start downloads");
                (screen, Task::none())
            }
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// Abort the download sequence if it has not settled yet.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.downloads.take() {
            tracing::info!("aborting in-flight download");
            handle.abort();
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn start_downloads(
    config: &ScreenConfig,
) -> Result<futures::stream::BoxStream<'static, FetchEvent>, String> {
    let descriptors = config.descriptors().map_err(|e| e.to_string())?;
    let client = FetchClient::new(config).map_err(|e| e.to_string())?;
    let coordinator = DownloadCoordinator::new(client, config.storage_root.clone());

    tracing::info!(root = %config.storage_root.display(), "starting downloads");
    Ok(fetch_in_order(coordinator, descriptors))
}

#[derive(Debug, Clone)]
pub enum Message {
    Fetch(FetchEvent),
    VideoOpened(Result<VideoPlayer, PlaybackError>),
    DocumentOpened(Result<PdfViewer, RenderError>),
    PlaybackConfigured(Result<PlaybackStatus, PlaybackError>),
    Surface(SurfaceMessage),
    SpinnerTick,
    PlaybackTick,
}

/// Side effects requested by a state transition.
#[derive(Debug)]
pub enum Effect {
    OpenSurfaces { video: PathBuf, document: PathBuf },
    /// Fired once, when the video surface first becomes active.
    ConfigurePlayback(VideoPlayer),
}

/// What the screen shows for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Loading {
        status: &'static str,
        spinner: &'static str,
    },
    Ready {
        video: SlotView,
        document: SlotView,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotView {
    Opening,
    Surface,
    Error(String),
}

impl<T> From<&ViewerSlot<T>> for SlotView {
    fn from(slot: &ViewerSlot<T>) -> Self {
        match slot {
            ViewerSlot::Opening => SlotView::Opening,
            ViewerSlot::Active(_) => SlotView::Surface,
            ViewerSlot::Errored(error) => SlotView::Error(error.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScreenState {
    video: ResourceState,
    document: ResourceState,
    video_slot: ViewerSlot<VideoPlayer>,
    document_slot: ViewerSlot<PdfViewer>,
    surfaces_requested: bool,
    playback_configured: bool,
    spinner_frame: usize,
}

impl ScreenState {
    pub fn is_loading(&self) -> bool {
        !(self.video.is_ready() && self.document.is_ready())
    }

    pub fn is_playing(&self) -> bool {
        self.video_slot
            .active()
            .is_some_and(|player| player.status().is_playing)
    }

    pub fn video_player(&self) -> Option<&VideoPlayer> {
        self.video_slot.active()
    }

    pub fn pdf_viewer(&self) -> Option<&PdfViewer> {
        self.document_slot.active()
    }

    pub fn layout(&self) -> Layout {
        if self.is_loading() {
            return Layout::Loading {
                status: STATUS_LABEL,
                spinner: SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()],
            };
        }

        Layout::Ready {
            video: SlotView::from(&self.video_slot),
            document: SlotView::from(&self.document_slot),
        }
    }

    pub fn resource_ready(&mut self, kind: ResourceKind, path: PathBuf) -> Option<Effect> {
        let slot = match kind {
            ResourceKind::Video => &mut self.video,
            ResourceKind::Document => &mut self.document,
        };
        if let ResourceState::Ready(existing) = slot {
            tracing::warn!(%kind, existing = %existing.display(), "resource already resolved");
            return None;
        }
        *slot = ResourceState::Ready(path);

        if self.surfaces_requested {
            return None;
        }
        match (self.video.path(), self.document.path()) {
            (Some(video), Some(document)) => {
                self.surfaces_requested = true;
                Some(Effect::OpenSurfaces {
                    video: video.clone(),
                    document: document.clone(),
                })
            }
            _ => None,
        }
    }

    /// A failed resource stays `Loading`; the failure was already logged by the sequence.
    pub fn resource_failed(&mut self, kind: ResourceKind, error: &FetchError) {
        tracing::debug!(%kind, %error, "resource unavailable");
    }

    pub fn video_opened(&mut self, result: Result<VideoPlayer, PlaybackError>) -> Option<Effect> {
        match result {
            Ok(player) => {
                if !self.video_slot.attach(player.clone()) || self.playback_configured {
                    return None;
                }
                self.playback_configured = true;
                Some(Effect::ConfigurePlayback(player))
            }
            Err(e) => {
                self.video_failed(e.into());
                None
            }
        }
    }

    pub fn document_opened(&mut self, result: Result<PdfViewer, RenderError>) {
        match result {
            Ok(viewer) => {
                self.document_slot.attach(viewer);
            }
            Err(e) => self.document_failed(e.into()),
        }
    }

    pub fn video_failed(&mut self, error: ViewerError) {
        tracing::warn!(%error, "video surface error");
        self.video_slot.fail(error);
    }

    pub fn document_failed(&mut self, error: ViewerError) {
        tracing::warn!(%error, "document surface error");
        self.document_slot.fail(error);
    }

    pub fn surface(&mut self, message: SurfaceMessage) {
        match message {
            SurfaceMessage::TogglePlayback => {
                if let Some(player) = self.video_slot.active() {
                    player.toggle();
                }
            }
            SurfaceMessage::NextPage | SurfaceMessage::PreviousPage => {
                let Some(viewer) = self.document_slot.active_mut() else {
                    return;
                };
                let result = if matches!(message, SurfaceMessage::NextPage) {
                    viewer.next_page()
                } else {
                    viewer.previous_page()
                };
                if let Err(e) = result {
                    self.document_failed(e.into());
                }
            }
        }
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    pub fn advance_playback(&mut self, elapsed: Duration) {
        if let Some(player) = self.video_slot.active() {
            player.advance(elapsed);
        }
    }
}

fn perform(effect: Option<Effect>) -> Task<Message> {
    match effect {
        Some(Effect::OpenSurfaces { video, document }) => Task::batch([
            Task::perform(VideoPlayer::open(video), Message::VideoOpened),
            Task::perform(PdfViewer::open(document), Message::DocumentOpened),
        ]),
        Some(Effect::ConfigurePlayback(player)) => Task::perform(
            async move { player.set_status(StatusUpdate::pitch_corrected()).await },
            Message::PlaybackConfigured,
        ),
        None => Task::none(),
    }
}

pub fn update(screen: &mut Screen, message: Message) -> Task<Message> {
    let state = &mut screen.state;

    let effect = match message {
        Message::Fetch(FetchEvent::Ready(kind, path)) => {
            let effect = state.resource_ready(kind, path);
            if !state.is_loading() {
                screen.downloads = None;
            }
            effect
        }
        Message::Fetch(FetchEvent::Failed(kind, error)) => {
            state.resource_failed(kind, &error);
            screen.downloads = None;
            None
        }
        Message::VideoOpened(result) => state.video_opened(result),
        Message::DocumentOpened(result) => {
            state.document_opened(result);
            None
        }
        Message::PlaybackConfigured(Ok(status)) => {
            tracing::debug!(
                should_correct_pitch = status.should_correct_pitch,
                quality = ?status.pitch_correction_quality,
                "playback configured"
            );
            None
        }
        Message::PlaybackConfigured(Err(e)) => {
            tracing::warn!(error = %e, "failed to configure playback");
            None
        }
        Message::Surface(message) => {
            state.surface(message);
            None
        }
        Message::SpinnerTick => {
            state.advance_spinner();
            None
        }
        Message::PlaybackTick => {
            state.advance_playback(PLAYBACK_CLOCK);
            None
        }
    };

    perform(effect)
}

pub fn view(screen: &Screen) -> iced::Element<'_, Message> {
    ui::view(screen.state())
}

pub fn subscription(screen: &Screen) -> Subscription<Message> {
    let mut subscriptions = Vec::new();
    if screen.state.is_loading() {
        subscriptions.push(time::every(SPINNER_INTERVAL).map(|_| Message::SpinnerTick));
    }
    if screen.state.is_playing() {
        subscriptions.push(time::every(PLAYBACK_CLOCK).map(|_| Message::PlaybackTick));
    }
    Subscription::batch(subscriptions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::sample_pdf;
    use crate::media::player::PitchCorrectionQuality;
    use crate::media::MediaInfo;

    fn player() -> VideoPlayer {
        VideoPlayer::with_info(
            PathBuf::from("video.mp4"),
            MediaInfo {
                timescale: 1,
                duration_units: 60,
            },
        )
    }

    fn viewer() -> PdfViewer {
        PdfViewer::from_document(PathBuf::from("pdf.pdf"), sample_pdf(2)).unwrap()
    }

    fn ready_state() -> ScreenState {
        let mut state = ScreenState::default();
        state.resource_ready(ResourceKind::Video, PathBuf::from("video.mp4"));
        state.resource_ready(ResourceKind::Document, PathBuf::from("pdf.pdf"));
        state
    }

    #[test]
    fn test_loading_until_both_resources_resolve() {
        let mut state = ScreenState::default();
        assert!(matches!(state.layout(), Layout::Loading { status, .. } if status == STATUS_LABEL));

        assert!(state
            .resource_ready(ResourceKind::Video, PathBuf::from("video.mp4"))
            .is_none());
        assert!(matches!(state.layout(), Layout::Loading { .. }));
        assert!(state.video_player().is_none());

        let effect = state.resource_ready(ResourceKind::Document, PathBuf::from("pdf.pdf"));
        assert!(matches!(
            effect,
            Some(Effect::OpenSurfaces { ref video, ref document })
                if video == &PathBuf::from("video.mp4") && document == &PathBuf::from("pdf.pdf")
        ));
        assert_eq!(
            state.layout(),
            Layout::Ready {
                video: SlotView::Opening,
                document: SlotView::Opening
            }
        );
    }

    #[test]
    fn test_failed_fetch_keeps_loading() {
        let mut state = ScreenState::default();
        state.resource_failed(
            ResourceKind::Video,
            &FetchError::Corrupted {
                reported: "aa".to_string(),
                local: "bb".to_string(),
            },
        );
        assert!(state.is_loading());
        assert!(matches!(state.layout(), Layout::Loading { .. }));
    }

    #[test]
    fn test_both_surfaces_render_without_errors() {
        let mut state = ready_state();
        state.video_opened(Ok(player()));
        state.document_opened(Ok(viewer()));

        assert_eq!(
            state.layout(),
            Layout::Ready {
                video: SlotView::Surface,
                document: SlotView::Surface
            }
        );
        assert_eq!(state.pdf_viewer().unwrap().page_count(), 2);
    }

    #[test]
    fn test_document_error_leaves_video_alone() {
        let mut state = ready_state();
        state.video_opened(Ok(player()));
        state.document_opened(Ok(viewer()));

        let error = RenderError::Extract {
            page: 2,
            reason: "bad font".to_string(),
        };
        let text = error.to_string();
        state.document_failed(error.into());

        assert_eq!(
            state.layout(),
            Layout::Ready {
                video: SlotView::Surface,
                document: SlotView::Error(text)
            }
        );
    }

    #[test]
    fn test_viewer_error_survives_new_handle() {
        let mut state = ready_state();
        state.video_opened(Err(PlaybackError::UnsupportedContainer("html".to_string())));

        assert!(state
            .resource_ready(ResourceKind::Video, PathBuf::from("other.mp4"))
            .is_none());
        assert!(state.video_opened(Ok(player())).is_none());

        let expected = PlaybackError::UnsupportedContainer("html".to_string()).to_string();
        assert!(matches!(
            state.layout(),
            Layout::Ready { video: SlotView::Error(text), .. } if text == expected
        ));
        assert!(state.video_player().is_none());
    }

    #[test]
    fn test_playback_configured_exactly_once() {
        let mut state = ready_state();
        let effect = state.video_opened(Ok(player()));
        let Some(Effect::ConfigurePlayback(handle)) = effect else {
            panic!("expected playback configuration");
        };

        let status = handle.apply(StatusUpdate::pitch_corrected()).unwrap();
        assert_eq!(status.pitch_correction_quality, PitchCorrectionQuality::High);
        assert!(state.video_player().unwrap().status().should_correct_pitch);

        assert!(state.video_opened(Ok(player())).is_none());
    }

    #[test]
    fn test_surfaces_opened_once() {
        let mut state = ready_state();
        assert!(state
            .resource_ready(ResourceKind::Document, PathBuf::from("again.pdf"))
            .is_none());
    }

    #[test]
    fn test_surface_controls() {
        let mut state = ready_state();
        state.video_opened(Ok(player()));
        state.document_opened(Ok(viewer()));
        assert!(state.is_playing());

        state.surface(SurfaceMessage::TogglePlayback);
        assert!(!state.is_playing());

        state.surface(SurfaceMessage::NextPage);
        assert_eq!(state.pdf_viewer().unwrap().current_page(), 2);
        state.surface(SurfaceMessage::PreviousPage);
        assert_eq!(state.pdf_viewer().unwrap().current_page(), 1);
    }

    fn screen_with_pending_downloads() -> (Screen, task::Handle) {
        let (_task, handle) =
            Task::stream(futures::stream::pending::<Message>()).abortable();
        let observer = handle.clone();
        let screen = Screen {
            state: ScreenState::default(),
            downloads: Some(handle),
        };
        (screen, observer)
    }

    #[test]
    fn test_teardown_aborts_running_downloads() {
        let (mut screen, observer) = screen_with_pending_downloads();
        assert!(!observer.is_aborted());

        screen.teardown();
        assert!(observer.is_aborted());
        assert!(screen.downloads.is_none());
    }

    #[test]
    fn test_dropping_screen_aborts_running_downloads() {
        let (screen, observer) = screen_with_pending_downloads();
        drop(screen);
        assert!(observer.is_aborted());
    }

    #[test]
    fn test_settled_downloads_are_not_aborted() {
        let (mut screen, observer) = screen_with_pending_downloads();
        let _ = update(
            &mut screen,
            Message::Fetch(FetchEvent::Failed(
                ResourceKind::Video,
                FetchError::Transport("connection reset".to_string()),
            )),
        );
        assert!(screen.downloads.is_none());

        screen.teardown();
        assert!(!observer.is_aborted());
    }

    #[test]
    fn test_spinner_cycles() {
        let mut state = ScreenState::default();
        let first = state.layout();
        state.advance_spinner();
        assert_ne!(state.layout(), first);
        for _ in 1..SPINNER_FRAMES.len() {
            state.advance_spinner();
        }
        assert_eq!(state.layout(), first);
    }
}
