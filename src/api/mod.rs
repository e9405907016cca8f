pub mod client;
pub mod models;

pub use client::FetchClient;
pub use models::ScreenConfig;
