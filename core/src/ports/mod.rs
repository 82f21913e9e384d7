//! Outbound ports
//!
//! The engine never talks to storage, the network or the screen directly;
//! these are the interfaces the surrounding application implements.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregates::{Form, NewForm};
use crate::domain::value_objects::ResponseEntry;

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Byte counts reported while an upload is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub transferred: u64,
    pub total: u64,
}

impl TransferProgress {
    /// Whole-number percentage, rounded to nearest.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = (self.transferred as f64 / self.total as f64) * 100.0;
        pct.round().clamp(0.0, 100.0) as u8
    }
}

/// Blob storage for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `name`, reporting progress; resolves to a public URL.
    /// An existing blob is never overwritten: when `name` is taken the store
    /// picks a free variant and the URL points at that.
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: &[u8],
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> Result<String, StoreError>;
}

/// Persistence for submitted responses.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn add_response(&self, form_id: &str, entries: &[ResponseEntry]) -> Result<(), StoreError>;
}

/// Persistence for authored forms.
#[async_trait]
pub trait FormStore: Send + Sync {
    async fn create_form(&self, form: &NewForm) -> Result<Form, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
