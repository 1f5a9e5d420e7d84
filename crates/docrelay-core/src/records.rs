//! Persistence boundary for conversion requests.
//!
//! The host application owns the durable record store; the engine treats it
//! as a mutable record handle. An in-memory implementation is provided for
//! tests and the CLI test harness.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::{RecordError, RecordResult};
use crate::models::{ConversionRequest, ConversionStatus};

/// Host-side persistence for [`ConversionRequest`] records.
#[async_trait]
pub trait ConversionStore: Send + Sync {
    async fn get(&self, id: Uuid) -> RecordResult<ConversionRequest>;

    async fn create(&self, request: &ConversionRequest) -> RecordResult<()>;

    /// Persist the current status and bookkeeping fields of a record.
    async fn update(&self, request: &ConversionRequest) -> RecordResult<()>;

    /// Persist the fetched result bytes as the request's artifact and
    /// return the artifact path.
    async fn store_result(&self, id: Uuid, bytes: Bytes) -> RecordResult<String>;

    /// All records currently in progress, for the background sweep.
    async fn list_in_progress(&self) -> RecordResult<Vec<ConversionRequest>>;
}

#[derive(Default)]
struct MemoryState {
    records: HashMap<Uuid, ConversionRequest>,
    artifacts: HashMap<Uuid, Bytes>,
}

/// In-memory record store.
#[derive(Default)]
pub struct MemoryConversionStore {
    state: Mutex<MemoryState>,
}

impl MemoryConversionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result bytes stored for a request, if any. Test/harness convenience.
    pub fn result_bytes(&self, id: Uuid) -> Option<Bytes> {
        self.state.lock().unwrap().artifacts.get(&id).cloned()
    }
}

#[async_trait]
impl ConversionStore for MemoryConversionStore {
    async fn get(&self, id: Uuid) -> RecordResult<ConversionRequest> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&id)
            .cloned()
            .ok_or(RecordError::NotFound(id))
    }

    async fn create(&self, request: &ConversionRequest) -> RecordResult<()> {
        self.state
            .lock()
            .unwrap()
            .records
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn update(&self, request: &ConversionRequest) -> RecordResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.records.contains_key(&request.id) {
            return Err(RecordError::NotFound(request.id));
        }
        state.records.insert(request.id, request.clone());
        Ok(())
    }

    async fn store_result(&self, id: Uuid, bytes: Bytes) -> RecordResult<String> {
        let mut state = self.state.lock().unwrap();
        state.artifacts.insert(id, bytes);
        Ok(format!("memory://{id}"))
    }

    async fn list_in_progress(&self) -> RecordResult<Vec<ConversionRequest>> {
        let state = self.state.lock().unwrap();
        let mut in_progress: Vec<ConversionRequest> = state
            .records
            .values()
            .filter(|r| r.status == ConversionStatus::InProgress)
            .cloned()
            .collect();
        in_progress.sort_by_key(|r| r.created_at);
        Ok(in_progress)
    }
}
