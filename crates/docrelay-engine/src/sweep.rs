//! Periodic poll over every in-flight conversion.
//!
//! The host schedules this from its own task runner (a cron task, a timer
//! loop); the sweep itself is a single sequential pass so one stuck
//! request cannot starve the store of connections.

use std::sync::Arc;

use docrelay_core::{ConversionStatus, ConversionStore};

use crate::engine::{ConversionEngine, EngineResult};

/// Counters describing one sweep pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepSummary {
    pub polled: usize,
    pub completed: usize,
    pub failed: usize,
    pub still_in_progress: usize,
    pub errors: usize,
}

/// Polls every in-progress conversion once.
pub struct ConversionSweep {
    engine: Arc<ConversionEngine>,
    records: Arc<dyn ConversionStore>,
}

impl ConversionSweep {
    pub fn new(engine: Arc<ConversionEngine>, records: Arc<dyn ConversionStore>) -> Self {
        Self { engine, records }
    }

    /// Poll each in-progress request in creation order.
    ///
    /// Host-persistence failures abort the sweep; per-request remote
    /// failures are already folded into request status by the engine and
    /// only show up in the counters.
    pub async fn run(&self) -> EngineResult<SweepSummary> {
        let mut summary = SweepSummary::default();
        for mut request in self.records.list_in_progress().await? {
            summary.polled += 1;
            match self.engine.poll(&mut request).await {
                Ok(ConversionStatus::Complete) => summary.completed += 1,
                Ok(ConversionStatus::Failed) => summary.failed += 1,
                Ok(_) => summary.still_in_progress += 1,
                Err(err) => {
                    summary.errors += 1;
                    tracing::warn!(
                        request_id = %request.id,
                        error = %err,
                        "sweep poll failed"
                    );
                }
            }
        }
        tracing::debug!(
            polled = summary.polled,
            completed = summary.completed,
            failed = summary.failed,
            still_in_progress = summary.still_in_progress,
            errors = summary.errors,
            "conversion sweep finished"
        );
        Ok(summary)
    }
}
