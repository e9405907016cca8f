use std::path::{Path, PathBuf};

use futures::StreamExt;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::{
    api::FetchClient,
    checksum,
    domain::{FetchError, ResourceDescriptor, TransferReport},
    storage,
};

/// Downloads one resource into the storage root and gates it on a checksum match.
#[derive(Clone)]
pub struct DownloadCoordinator {
    client: FetchClient,
    storage_root: PathBuf,
}

impl DownloadCoordinator {
    pub fn new(client: FetchClient, storage_root: PathBuf) -> Self {
        Self {
            client,
            storage_root,
        }
    }

    /// Stream the resource to disk, hashing the bytes as they arrive.
    pub async fn transfer(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<TransferReport, FetchError> {
        let path = storage::resolve(&self.storage_root, &descriptor.relative_path)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FetchError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| FetchError::Io(format!("Failed to create file: {}", e)))?;

        let (total, stream) = self
            .client
            .download_stream(&descriptor.url)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let mut stream = std::pin::pin!(stream);

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut next_decile: u64 = 1;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Transport(e.to_string()))?;

            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::Io(format!("Write error: {}", e)))?;
            downloaded += chunk.len() as u64;

            if let Some(total) = total.filter(|t| *t > 0) {
                let decile = downloaded * 10 / total;
                if decile >= next_decile {
                    tracing::debug!(
                        kind = %descriptor.kind,
                        downloaded,
                        total,
                        "download {}%",
                        decile.min(10) * 10
                    );
                    next_decile = decile + 1;
                }
            }
        }

        file.sync_all()
            .await
            .map_err(|e| FetchError::Io(format!("Failed to sync file: {}", e)))?;

        Ok(TransferReport {
            path,
            checksum: hex::encode(hasher.finalize()),
            bytes: downloaded,
        })
    }

    /// Transfer, recompute the stored file's hash and accept the file only if both agree.
    pub async fn fetch(&self, descriptor: &ResourceDescriptor) -> Result<PathBuf, FetchError> {
        let report = self.transfer(descriptor).await?;
        let local = local_checksum(&report.path).await?;
        checksum::verify(&report.checksum, &local)?;

        tracing::info!(
            kind = %descriptor.kind,
            path = %report.path.display(),
            bytes = report.bytes,
            "File downloaded successfully"
        );
        Ok(report.path)
    }
}

async fn local_checksum(path: &Path) -> Result<String, FetchError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || checksum::sha256_path(&path))
        .await
        .map_err(|e| FetchError::Io(format!("Checksum task failed: {}", e)))?
        .map_err(|e| FetchError::Io(format!("Failed to hash file: {}", e)))
}
