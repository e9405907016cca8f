mod api;
mod app;
mod application;
mod checksum;
mod document;
mod domain;
mod logging;
mod media;
mod storage;
mod ui;

fn main() -> iced::Result {
    logging::init();

    iced::application(app::Screen::new, app::update, app::view)
        .title("Media Screen")
        .subscription(app::subscription)
        .run()
}
