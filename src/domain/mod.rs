pub mod error;
pub mod model;

pub use error::{FetchError, ViewerError};
pub use model::{ResourceDescriptor, ResourceKind, ResourceState, TransferReport, ViewerSlot};
