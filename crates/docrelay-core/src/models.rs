//! Conversion request record and its status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a conversion request.
///
/// Transitions are monotonic: `NotStarted` → `InProgress` →
/// (`Complete` | `Failed`). The terminal states are sticky; once a request
/// is complete or failed the engine never moves it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    NotStarted,
    InProgress,
    Complete,
    Failed,
}

impl ConversionStatus {
    /// Whether this status admits no further automatic transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversionStatus::Complete | ConversionStatus::Failed)
    }
}

impl std::fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConversionStatus::NotStarted => "not_started",
            ConversionStatus::InProgress => "in_progress",
            ConversionStatus::Complete => "complete",
            ConversionStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One conversion job, owned by the host application.
///
/// `source_key` is the content-addressable identifier of the source file
/// (typically a content hash). It is used verbatim as the object key in both
/// the input and output buckets, which is what joins the two ends of the
/// pipeline: we write under this key, the remote worker reads and writes
/// under the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub id: Uuid,
    /// Content-addressable key of the source file.
    pub source_key: String,
    /// Host-side identifier of the source file, carried in upload metadata.
    pub source_file_id: String,
    /// Target output format extension, e.g. `pdf`.
    pub target_format: String,
    pub status: ConversionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Where the fetched result artifact was stored, once complete.
    pub result_path: Option<String>,
}

impl ConversionRequest {
    pub fn new(source_key: impl Into<String>, source_file_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            source_key: source_key.into(),
            source_file_id: source_file_id.into(),
            target_format: "pdf".to_string(),
            status: ConversionStatus::NotStarted,
            created_at: now,
            updated_at: now,
            result_path: None,
        }
    }

    /// Move to a new status, refreshing `updated_at`.
    pub fn set_status(&mut self, status: ConversionStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
