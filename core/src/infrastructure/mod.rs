//! Local implementations of the outbound ports

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::ports::{BlobStore, Notice, NoticeLevel, Notifier, StoreError, TransferProgress};

const CHUNK_SIZE: usize = 64 * 1024;
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Blob store backed by a directory. Files are written in chunks so the
/// caller sees progress; the returned URL is the stored name appended to the
/// base URL when one is configured and a `file://` URL otherwise.
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: Option<Url>,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, StoreError> {
        let url = Url::parse(base_url)
            .map_err(|e| StoreError::Rejected(format!("invalid base URL '{}': {}", base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(StoreError::Rejected(format!(
                "base URL '{}' cannot hold paths",
                base_url
            )));
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Creates a file that did not exist before, trying `name` first and
    /// then `stem-N.ext` variants.
    async fn create_unique(&self, name: &str) -> Result<(File, String), StoreError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = name_variant(name, attempt);
            let opened = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&candidate))
                .await;
            match opened {
                Ok(file) => return Ok((file, candidate)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StoreError::Storage(e.to_string())),
            }
        }
        Err(StoreError::Storage(format!("no free blob name for '{}'", name)))
    }

    async fn url_for(&self, stored: &str, path: &Path) -> Result<String, StoreError> {
        match &self.base_url {
            Some(base) => {
                let mut url = base.clone();
                url.path_segments_mut()
                    .map_err(|_| StoreError::Rejected(format!("base URL '{}' cannot hold paths", base)))?
                    .pop_if_empty()
                    .push(stored);
                Ok(url.to_string())
            }
            None => {
                let absolute = tokio::fs::canonicalize(path)
                    .await
                    .map_err(|e| StoreError::Storage(e.to_string()))?;
                Url::from_file_path(&absolute)
                    .map(|url| url.to_string())
                    .map_err(|_| StoreError::Storage(format!("no file URL for {}", absolute.display())))
            }
        }
    }
}

/// `report.pdf`, `report-1.pdf`, `report-2.pdf`, ...
fn name_variant(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], attempt, &name[dot..]),
        _ => format!("{}-{}", name, attempt),
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        name: &str,
        _content_type: &str,
        bytes: &[u8],
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> Result<String, StoreError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(StoreError::Rejected(format!("invalid blob name '{}'", name)));
        }
        let storage = |e: std::io::Error| StoreError::Storage(e.to_string());

        tokio::fs::create_dir_all(&self.root).await.map_err(storage)?;
        let (mut file, stored) = self.create_unique(name).await?;

        let total = bytes.len() as u64;
        let mut transferred = 0u64;
        progress(TransferProgress { transferred, total });
        for chunk in bytes.chunks(CHUNK_SIZE) {
            file.write_all(chunk).await.map_err(storage)?;
            transferred += chunk.len() as u64;
            progress(TransferProgress { transferred, total });
        }
        file.flush().await.map_err(storage)?;

        if stored != name {
            tracing::debug!(requested = %name, stored = %stored, "blob name taken, stored under a variant");
        }
        self.url_for(&stored, &self.root.join(&stored)).await
    }
}

/// Routes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(message = %notice.message, "notice"),
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "notice"),
        }
    }
}
