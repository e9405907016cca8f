use std::future::Future;
use std::path::PathBuf;

use futures::{stream::BoxStream, StreamExt};

use crate::domain::{FetchError, ResourceDescriptor, ResourceKind};

use super::DownloadCoordinator;

/// Something that can bring one resource into local storage.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> impl Future<Output = Result<PathBuf, FetchError>> + Send;
}

impl Fetcher for DownloadCoordinator {
    fn fetch(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> impl Future<Output = Result<PathBuf, FetchError>> + Send {
        DownloadCoordinator::fetch(self, descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Ready(ResourceKind, PathBuf),
    Failed(ResourceKind, FetchError),
}

/// Fetch `descriptors` one after another. The first failure ends the sequence,
/// so nothing after a failed resource is ever requested.
pub fn fetch_in_order<F: Fetcher>(
    fetcher: F,
    descriptors: Vec<ResourceDescriptor>,
) -> BoxStream<'static, FetchEvent> {
    futures::stream::unfold(
        SequenceState::Next {
            fetcher,
            remaining: descriptors.into_iter(),
        },
        |state| async move {
            match state {
                SequenceState::Next {
                    fetcher,
                    mut remaining,
                } => {
                    let descriptor = remaining.next()?;
                    tracing::info!(kind = %descriptor.kind, url = %descriptor.url, "fetching");

                    match fetcher.fetch(&descriptor).await {
                        Ok(path) => Some((
                            FetchEvent::Ready(descriptor.kind, path),
                            SequenceState::Next { fetcher, remaining },
                        )),
                        Err(e) => {
                            if e.is_corruption() {
                                tracing::error!(kind = %descriptor.kind, error = %e, "Corrupted file.");
                            } else {
                                tracing::error!(kind = %descriptor.kind, error = %e, "download failed");
                            }
                            if remaining.len() > 0 {
                                tracing::warn!(skipped = remaining.len(), "not fetching remaining resources");
                            }
                            Some((
                                FetchEvent::Failed(descriptor.kind, e),
                                SequenceState::Halted,
                            ))
                        }
                    }
                }
                SequenceState::Halted => None,
            }
        },
    )
    .boxed()
}

enum SequenceState<F> {
    Next {
        fetcher: F,
        remaining: std::vec::IntoIter<ResourceDescriptor>,
    },
    Halted,
}
