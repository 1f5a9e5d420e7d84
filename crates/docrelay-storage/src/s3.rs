//! S3 object store backend.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier,
};
use aws_sdk_s3::Client;
use bytes::Bytes;

use crate::traits::{BatchDelete, ObjectError, ObjectStore, StoreError, StoreResult};

/// S3-backed [`ObjectStore`].
///
/// The client handle is constructed once here and reused for every call;
/// tests inject the in-memory backend instead of stubbing this one.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    region: String,
}

impl S3ObjectStore {
    /// Create a new store for `region`.
    ///
    /// With `credentials: Some((key, secret))` the client authenticates with
    /// that static pair; with `None` it falls back to the ambient SDK
    /// credential provider chain.
    pub async fn new(region: String, credentials: Option<(String, String)>) -> Self {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region.clone()));

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let Some((key, secret)) = credentials {
            loader =
                loader.credentials_provider(Credentials::new(key, secret, None, None, "docrelay"));
        }
        let config = loader.load().await;

        Self {
            client: Client::new(&config),
            region,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Map an SDK error onto the docrelay taxonomy.
///
/// Provider error codes win; when the provider returned no code (HEAD
/// responses have no body) the HTTP status decides between not-found and
/// forbidden.
fn map_sdk_error<E>(err: SdkError<E>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(ctx) => {
            let status = ctx.raw().status().as_u16();
            let code = err.code().map(str::to_string);
            let message = err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| ctx.err().to_string());
            match (code.as_deref(), status) {
                (Some("NoSuchKey") | Some("NoSuchBucket") | Some("NotFound"), _) => {
                    StoreError::NotFound(message)
                }
                (Some("AccessDenied") | Some("Forbidden"), _) => StoreError::Forbidden(message),
                (Some("BucketAlreadyExists") | Some("BucketAlreadyOwnedByYou"), _) => {
                    StoreError::AlreadyExists(message)
                }
                (None, 404) => StoreError::NotFound(message),
                (None, 403) => StoreError::Forbidden(message),
                (code, _) => StoreError::Provider {
                    code: code.map(str::to_string),
                    message,
                },
            }
        }
        _ => StoreError::Other(err.to_string()),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()> {
        tracing::debug!(bucket, key, size = bytes.len(), "put object");
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .set_metadata(Some(metadata.clone()))
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;
        let data = output
            .body
            .collect()
            .await
            .map_err(|err| StoreError::Other(err.to_string()))?;
        Ok(data.into_bytes())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn head_bucket(&self, bucket: &str) -> StoreResult<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(map_sdk_error)?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> StoreResult<BatchDelete> {
        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| StoreError::Other(err.to_string()))?;
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .build()
            .map_err(|err| StoreError::Other(err.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(BatchDelete {
            deleted: output.deleted().len(),
            errors: output
                .errors()
                .iter()
                .map(|err| ObjectError {
                    key: err.key().unwrap_or_default().to_string(),
                    message: err.message().unwrap_or_default().to_string(),
                })
                .collect(),
        })
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> StoreResult<()> {
        tracing::info!(bucket, region, "create bucket");
        let constraint = BucketLocationConstraint::from(region);
        let bucket_config = CreateBucketConfiguration::builder()
            .location_constraint(constraint)
            .build();
        self.client
            .create_bucket()
            .bucket(bucket)
            .create_bucket_configuration(bucket_config)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        tracing::info!(bucket, "delete bucket");
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }
}
