//! Object store abstraction trait
//!
//! All remote-store backends implement this trait. The error taxonomy is
//! deliberately structured: the conversion engine's polling logic and the
//! connectivity diagnostics branch on the exact kind of remote failure
//! (not-found vs forbidden vs anything else), never on string matching.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Remote-store operation errors.
///
/// Canonical taxonomy: provider "no such key / no such bucket / 404"
/// responses map to [`StoreError::NotFound`], "access denied / 403" to
/// [`StoreError::Forbidden`], bucket-creation collisions to
/// [`StoreError::AlreadyExists`]. Any other provider-reported error keeps
/// its code in [`StoreError::Provider`]; transport failures with no
/// provider response land in [`StoreError::Other`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Object or bucket not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Bucket already exists: {0}")]
    AlreadyExists(String),

    #[error("Provider error: {message}")]
    Provider {
        code: Option<String>,
        message: String,
    },

    #[error("Store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Provider error code, where one was reported.
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::NotFound(_) => Some("NotFound"),
            StoreError::Forbidden(_) => Some("Forbidden"),
            StoreError::AlreadyExists(_) => Some("BucketAlreadyExists"),
            StoreError::Provider { code, .. } => code.as_deref(),
            StoreError::Other(_) => None,
        }
    }

    /// Human-readable detail string for diagnostics output.
    pub fn detail(&self) -> String {
        match self {
            StoreError::Other(message) => {
                format!("Not an object store error: {message}")
            }
            other => {
                let mut detail = format!("ERROR MSG: {other}");
                if let Some(code) = other.code() {
                    detail.push_str(&format!("\nERROR CODE: {code}"));
                }
                detail
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-object failure reported by a batch delete.
#[derive(Debug, Clone)]
pub struct ObjectError {
    pub key: String,
    pub message: String,
}

/// Outcome of a batch delete: how many objects went away, and which did not.
#[derive(Debug, Clone, Default)]
pub struct BatchDelete {
    pub deleted: usize,
    pub errors: Vec<ObjectError>,
}

/// Object store capability.
///
/// Backends must be cheap to share (`Arc<dyn ObjectStore>`); the client
/// handle is constructed once per instance and reused across calls.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes>;

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<()>;

    async fn head_bucket(&self, bucket: &str) -> StoreResult<()>;

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;

    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<String>>;

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> StoreResult<BatchDelete>;

    async fn create_bucket(&self, bucket: &str, region: &str) -> StoreResult<()>;

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()>;
}
