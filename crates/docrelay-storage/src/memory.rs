//! In-memory object store backend.
//!
//! Behaves like the real store for the operations docrelay uses, including
//! the error taxonomy: missing buckets and keys surface as
//! [`StoreError::NotFound`], bucket-creation collisions as
//! [`StoreError::AlreadyExists`]. Used by unit tests and the CLI dry-run
//! path.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::traits::{BatchDelete, ObjectStore, StoreError, StoreResult};

type Bucket = BTreeMap<String, (Bytes, HashMap<String, String>)>;

/// In-process object store keyed by bucket name.
#[derive(Default)]
pub struct MemoryObjectStore {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create a bucket without going through `create_bucket`.
    pub fn with_bucket(self, bucket: &str) -> Self {
        self.buckets
            .lock()
            .unwrap()
            .insert(bucket.to_string(), Bucket::new());
        self
    }

    /// Metadata stored alongside an object, for assertions in tests.
    pub fn object_metadata(&self, bucket: &str, key: &str) -> Option<HashMap<String, String>> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|b| b.get(key))
            .map(|(_, meta)| meta.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()> {
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NotFound(format!("no such bucket: {bucket}")))?;
        bucket.insert(key.to_string(), (bytes, metadata.clone()));
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        let buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NotFound(format!("no such bucket: {bucket}")))?;
        bucket
            .get(key)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound(format!("no such key: {key}")))
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.get_object(bucket, key).await.map(|_| ())
    }

    async fn head_bucket(&self, bucket: &str) -> StoreResult<()> {
        let buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(bucket) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("no such bucket: {bucket}")))
        }
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NotFound(format!("no such bucket: {bucket}")))?;
        // Deleting an absent key succeeds, matching the remote store.
        bucket.remove(key);
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<String>> {
        let buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NotFound(format!("no such bucket: {bucket}")))?;
        Ok(bucket.keys().cloned().collect())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> StoreResult<BatchDelete> {
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NotFound(format!("no such bucket: {bucket}")))?;
        let mut outcome = BatchDelete::default();
        for key in keys {
            bucket.remove(key);
            outcome.deleted += 1;
        }
        Ok(outcome)
    }

    async fn create_bucket(&self, bucket: &str, _region: &str) -> StoreResult<()> {
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(bucket) {
            return Err(StoreError::AlreadyExists(bucket.to_string()));
        }
        buckets.insert(bucket.to_string(), Bucket::new());
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        let mut buckets = self.buckets.lock().unwrap();
        match buckets.get(bucket) {
            None => Err(StoreError::NotFound(format!("no such bucket: {bucket}"))),
            Some(contents) if !contents.is_empty() => Err(StoreError::Provider {
                code: Some("BucketNotEmpty".to_string()),
                message: format!("bucket {bucket} is not empty"),
            }),
            Some(_) => {
                buckets.remove(bucket);
                Ok(())
            }
        }
    }
}
