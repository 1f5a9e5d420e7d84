//! The conversion state machine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;

use docrelay_core::{
    formats, Config, ConversionEvent, ConversionRequest, ConversionStatus, ConversionStore,
    EventSink, RecordError,
};
use docrelay_storage::{ObjectStore, StoreError};

/// Event context for the upload half of the rendezvous.
pub(crate) const START_CONTEXT: &str = "start_document_conversion";
/// Event context for the download half.
pub(crate) const POLL_CONTEXT: &str = "poll_conversion_status";

/// Errors the engine surfaces to its caller.
///
/// Remote-store failures never appear here; they are converted into the
/// request's status. Only a missing configuration or a host-persistence
/// failure crosses the boundary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Conversion engine is not configured")]
    NotConfigured,

    #[error(transparent)]
    Record(#[from] RecordError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Drives conversion requests through the rendezvous protocol.
///
/// Holds one store client for its lifetime; construction is explicit and
/// collaborators are injected, so tests swap in scripted doubles.
pub struct ConversionEngine {
    config: Config,
    store: Arc<dyn ObjectStore>,
    records: Arc<dyn ConversionStore>,
    events: Arc<dyn EventSink>,
}

impl ConversionEngine {
    pub fn new(
        config: Config,
        store: Arc<dyn ObjectStore>,
        records: Arc<dyn ConversionStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            store,
            records,
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub(crate) fn input_bucket(&self) -> &str {
        &self.config.input_bucket
    }

    pub(crate) fn output_bucket(&self) -> &str {
        &self.config.output_bucket
    }

    /// Whether a conversion from `from` to `to` can be completed.
    pub fn supports(from: &str, to: &str) -> bool {
        formats::supports(from, to)
    }

    /// Upload the source document and move the request into the pipeline.
    ///
    /// On a successful upload the request becomes `InProgress`; on any
    /// remote failure it becomes `Failed`. There is no partial-success
    /// state and no retry. Calling start twice overwrites the input object;
    /// guarding against double submission is the caller's concern.
    pub async fn start(
        &self,
        request: &mut ConversionRequest,
        source: Bytes,
    ) -> EngineResult<ConversionStatus> {
        if !self.config.is_configured() {
            return Err(EngineError::NotConfigured);
        }

        let mut metadata = HashMap::new();
        metadata.insert("targetformat".to_string(), request.target_format.clone());
        metadata.insert("id".to_string(), request.id.to_string());
        metadata.insert("sourcefileid".to_string(), request.source_file_id.clone());

        match self
            .store
            .put_object(
                &self.config.input_bucket,
                &request.source_key,
                source,
                &metadata,
            )
            .await
        {
            Ok(()) => {
                request.set_status(ConversionStatus::InProgress);
            }
            Err(err) => {
                tracing::warn!(
                    key = %request.source_key,
                    error = %err,
                    "source upload failed"
                );
                request.set_status(ConversionStatus::Failed);
            }
        }
        self.records.update(request).await?;

        self.emit(START_CONTEXT, &self.config.input_bucket, request);
        Ok(request.status)
    }

    /// Check the output bucket for the converted document.
    ///
    /// Terminal requests are left untouched. Otherwise: a fetched result
    /// completes the request and removes the rendezvous object (a failed
    /// removal is logged, never reverted); "not found" before the timeout
    /// keeps the request in progress; "not found" past the timeout, or any
    /// other remote error, fails it.
    pub async fn poll(&self, request: &mut ConversionRequest) -> EngineResult<ConversionStatus> {
        if request.status.is_terminal() {
            return Ok(request.status);
        }
        if !self.config.is_configured() {
            return Err(EngineError::NotConfigured);
        }

        match self
            .store
            .get_object(&self.config.output_bucket, &request.source_key)
            .await
        {
            Ok(bytes) => {
                let path = self.records.store_result(request.id, bytes).await?;
                request.result_path = Some(path);
                request.set_status(ConversionStatus::Complete);

                // The rendezvous object is transient; completion wins over
                // bucket hygiene if this delete fails.
                if let Err(err) = self
                    .store
                    .delete_object(&self.config.output_bucket, &request.source_key)
                    .await
                {
                    tracing::warn!(
                        key = %request.source_key,
                        error = %err,
                        "failed to remove converted object from output bucket"
                    );
                }
            }
            Err(StoreError::NotFound(_)) if self.elapsed(request) < self.config.conversion_timeout =>
            {
                request.set_status(ConversionStatus::InProgress);
            }
            Err(err) => {
                tracing::warn!(
                    key = %request.source_key,
                    elapsed_secs = self.elapsed(request).as_secs(),
                    error = %err,
                    "conversion failed"
                );
                request.set_status(ConversionStatus::Failed);
            }
        }
        self.records.update(request).await?;

        self.emit(POLL_CONTEXT, &self.config.output_bucket, request);
        Ok(request.status)
    }

    /// Wall-clock time since the request was created.
    fn elapsed(&self, request: &ConversionRequest) -> Duration {
        (Utc::now() - request.created_at).to_std().unwrap_or_default()
    }

    fn emit(&self, context: &str, bucket: &str, request: &ConversionRequest) {
        self.events.record(&ConversionEvent {
            context: context.to_string(),
            bucket: bucket.to_string(),
            key: request.source_key.clone(),
            target_format: request.target_format.clone(),
            request_id: request.id,
            source_file_id: request.source_file_id.clone(),
            status: request.status,
        });
    }
}
