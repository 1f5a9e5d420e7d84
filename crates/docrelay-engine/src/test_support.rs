//! Shared test doubles for the engine crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use docrelay_core::{Config, ConversionEvent, EventSink};
use docrelay_storage::{BatchDelete, MemoryObjectStore, ObjectStore, StoreError, StoreResult};

pub(crate) fn test_config() -> Config {
    Config {
        access_key: Some("AKIAEXAMPLE".to_string()),
        secret_key: Some("secret".to_string()),
        region: "ap-southeast-2".to_string(),
        input_bucket: "docrelay-input".to_string(),
        output_bucket: "docrelay-output".to_string(),
        use_sdk_creds: false,
        use_proxy: false,
        conversion_timeout: Duration::from_secs(300),
    }
}

/// Kinds of remote failure a scripted store can inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    NotFound,
    Forbidden,
    Provider,
}

impl Failure {
    fn to_error(self) -> StoreError {
        match self {
            Failure::NotFound => StoreError::NotFound("no such key".to_string()),
            Failure::Forbidden => StoreError::Forbidden("Access Denied".to_string()),
            Failure::Provider => StoreError::Provider {
                code: Some("InternalError".to_string()),
                message: "we encountered an internal error".to_string(),
            },
        }
    }
}

/// A [`MemoryObjectStore`] with per-operation failure injection.
///
/// Failures can be scoped to one bucket (`op:bucket`) or apply to every
/// bucket (`op`); the scoped entry wins.
#[derive(Default)]
pub(crate) struct ScriptedObjectStore {
    inner: Arc<MemoryObjectStore>,
    failures: Mutex<HashMap<String, Failure>>,
}

impl ScriptedObjectStore {
    pub(crate) fn with_buckets(buckets: &[&str]) -> Self {
        let mut inner = MemoryObjectStore::new();
        for bucket in buckets {
            inner = inner.with_bucket(bucket);
        }
        Self {
            inner: Arc::new(inner),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Handle to the backing store, for seeding and inspecting objects.
    pub(crate) fn inner_handle(&self) -> Arc<MemoryObjectStore> {
        self.inner.clone()
    }

    pub(crate) fn fail_put_in(self, bucket: &str, failure: Failure) -> Self {
        self.add(&format!("put:{bucket}"), failure)
    }

    pub(crate) fn fail_get(self, failure: Failure) -> Self {
        self.add("get", failure)
    }

    pub(crate) fn fail_delete(self, failure: Failure) -> Self {
        self.add("delete", failure)
    }

    pub(crate) fn fail_delete_in(self, bucket: &str, failure: Failure) -> Self {
        self.add(&format!("delete:{bucket}"), failure)
    }

    pub(crate) fn fail_head_bucket_in(self, bucket: &str, failure: Failure) -> Self {
        self.add(&format!("head_bucket:{bucket}"), failure)
    }

    fn add(self, key: &str, failure: Failure) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(key.to_string(), failure);
        self
    }

    fn scripted(&self, op: &str, bucket: &str) -> Option<StoreError> {
        let failures = self.failures.lock().unwrap();
        failures
            .get(&format!("{op}:{bucket}"))
            .or_else(|| failures.get(op))
            .map(|f| f.to_error())
    }
}

#[async_trait]
impl ObjectStore for ScriptedObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()> {
        if let Some(err) = self.scripted("put", bucket) {
            return Err(err);
        }
        self.inner.put_object(bucket, key, bytes, metadata).await
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        if let Some(err) = self.scripted("get", bucket) {
            return Err(err);
        }
        self.inner.get_object(bucket, key).await
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        if let Some(err) = self.scripted("head", bucket) {
            return Err(err);
        }
        self.inner.head_object(bucket, key).await
    }

    async fn head_bucket(&self, bucket: &str) -> StoreResult<()> {
        if let Some(err) = self.scripted("head_bucket", bucket) {
            return Err(err);
        }
        self.inner.head_bucket(bucket).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        if let Some(err) = self.scripted("delete", bucket) {
            return Err(err);
        }
        self.inner.delete_object(bucket, key).await
    }

    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<String>> {
        if let Some(err) = self.scripted("list", bucket) {
            return Err(err);
        }
        self.inner.list_objects(bucket).await
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> StoreResult<BatchDelete> {
        if let Some(err) = self.scripted("delete_objects", bucket) {
            return Err(err);
        }
        self.inner.delete_objects(bucket, keys).await
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> StoreResult<()> {
        if let Some(err) = self.scripted("create_bucket", bucket) {
            return Err(err);
        }
        self.inner.create_bucket(bucket, region).await
    }

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        if let Some(err) = self.scripted("delete_bucket", bucket) {
            return Err(err);
        }
        self.inner.delete_bucket(bucket).await
    }
}

/// Event sink that remembers everything it was handed.
#[derive(Default)]
pub(crate) struct RecordingEventSink {
    events: Mutex<Vec<ConversionEvent>>,
}

impl RecordingEventSink {
    pub(crate) fn events(&self) -> Vec<ConversionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEventSink {
    fn record(&self, event: &ConversionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
