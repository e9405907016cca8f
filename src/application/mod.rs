pub mod fetcher;
pub mod sequence;

pub use fetcher::DownloadCoordinator;
pub use sequence::{fetch_in_order, FetchEvent};
