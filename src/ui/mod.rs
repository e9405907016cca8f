use std::path::Path;
use std::time::Duration;

use iced::{
    widget::{button, column, container, progress_bar, row, scrollable, text, Space},
    Alignment, Background, Color, Element, Length, Theme,
};

use crate::app::{Layout, Message, ScreenState, SlotView};
use crate::document::PdfViewer;
use crate::media::VideoPlayer;

/// Controls exposed by the two surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMessage {
    TogglePlayback,
    NextPage,
    PreviousPage,
}

pub fn view(state: &ScreenState) -> Element<'_, Message> {
    match state.layout() {
        Layout::Loading { status, spinner } => container(
            column![
                text(spinner).size(48),
                text(status).width(Length::Fill).center(),
            ]
            .spacing(16)
            .align_x(Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center(Length::Fill)
        .into(),
        Layout::Ready { video, document } => {
            let video = match video {
                SlotView::Surface => state.video_player().map(video_surface),
                other => Some(placeholder(other)),
            };
            let document = match document {
                SlotView::Surface => state.pdf_viewer().map(document_surface),
                other => Some(placeholder(other)),
            };

            column![
                caption("<Video /> component"),
                video.unwrap_or_else(|| Space::new().into()),
                caption("<Pdf /> component"),
                document.unwrap_or_else(|| Space::new().into()),
            ]
            .height(Length::Fill)
            .into()
        }
    }
}

fn caption(label: &'static str) -> Element<'static, Message> {
    container(text(label).width(Length::Fill).center())
        .padding([16, 0])
        .into()
}

fn placeholder(slot: SlotView) -> Element<'static, Message> {
    match slot {
        SlotView::Error(message) => container(
            container(text(message))
                .padding(16)
                .width(Length::Fill)
                .style(|_theme: &Theme| container::Style {
                    background: Some(Background::Color(Color::from_rgb(1.0, 0.0, 0.0))),
                    ..container::Style::default()
                }),
        )
        .padding(16)
        .into(),
        _ => container(text("Opening...").size(14))
            .width(Length::Fill)
            .height(Length::Fill)
            .center(Length::Fill)
            .into(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn video_surface(player: &VideoPlayer) -> Element<'_, Message> {
    let status = player.status();
    let progress = if status.duration.is_zero() {
        0.0
    } else {
        status.position.as_secs_f32() / status.duration.as_secs_f32()
    };
    let name = file_name(player.path());
    let pitch = if status.should_correct_pitch {
        format!("Pitch correction: {:?}", status.pitch_correction_quality)
    } else {
        "Pitch correction: off".to_string()
    };

    container(
        column![
            text(name).size(18),
            Space::new().height(Length::Fill),
            progress_bar(0.0..=1.0, progress),
            row![
                button(if status.is_playing { "Pause" } else { "Play" })
                    .on_press(Message::Surface(SurfaceMessage::TogglePlayback))
                    .padding([6, 14]),
                text(format!(
                    "{} / {}",
                    clock(status.position),
                    clock(status.duration)
                ))
                .size(14),
                Space::new().width(Length::Fill),
                text(pitch).size(12),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        ]
        .spacing(8),
    )
    .padding(16)
    .width(Length::Fill)
    .height(Length::Fill)
    .style(|_theme: &Theme| container::Style {
        text_color: Some(Color::WHITE),
        background: Some(Background::Color(Color::from_rgb8(0x11, 0x11, 0x11))),
        ..container::Style::default()
    })
    .into()
}

fn document_surface(viewer: &PdfViewer) -> Element<'_, Message> {
    let page = viewer.current_page();
    let count = viewer.page_count();

    column![
        row![
            button("Previous")
                .on_press_maybe((page > 1).then_some(Message::Surface(SurfaceMessage::PreviousPage)))
                .padding([6, 14]),
            text(format!("Page {} of {}", page, count)).size(14),
            Space::new().width(Length::Fill),
            text(file_name(viewer.path())).size(12),
            button("Next")
                .on_press_maybe((page < count).then_some(Message::Surface(SurfaceMessage::NextPage)))
                .padding([6, 14]),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
        scrollable(container(text(viewer.text()).size(14)).padding(8)).height(Length::Fill),
    ]
    .spacing(8)
    .padding(16)
    .height(Length::Fill)
    .into()
}
