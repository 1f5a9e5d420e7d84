//! Domain events emitted by the conversion engine.
//!
//! The engine fires an event for every start and poll so the host
//! application can observe the pipeline without the engine depending on the
//! host's event subsystem. Sinks are fire-and-forget; the engine never
//! consumes a return value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ConversionStatus;

/// Structured payload describing one engine-side action on a conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionEvent {
    /// Which side of the rendezvous the action touched, e.g.
    /// `start_document_conversion` or `poll_conversion_status`.
    pub context: String,
    /// Bucket the action ran against (input bucket for start, output bucket
    /// for poll).
    pub bucket: String,
    /// Content-addressable object key.
    pub key: String,
    pub target_format: String,
    pub request_id: Uuid,
    pub source_file_id: String,
    pub status: ConversionStatus,
}

/// Fire-and-forget sink for [`ConversionEvent`]s.
///
/// Implemented by the host application; the engine only ever calls
/// [`EventSink::record`] and ignores the outcome.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &ConversionEvent);
}

/// Default sink that writes events to the tracing subscriber.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: &ConversionEvent) {
        tracing::info!(
            context = %event.context,
            bucket = %event.bucket,
            key = %event.key,
            target_format = %event.target_format,
            request_id = %event.request_id,
            source_file_id = %event.source_file_id,
            status = %event.status,
            "conversion event"
        );
    }
}
