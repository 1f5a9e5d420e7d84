//! Declarative-infrastructure capability.
//!
//! The provisioner never talks to a provider API directly; it drives this
//! trait. The real backend wraps CloudFormation, tests script their own.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Status reported by the stack engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackStatus {
    CreateInProgress,
    CreateComplete,
    CreateFailed,
    UpdateInProgress,
    UpdateComplete,
    UpdateFailed,
    DeleteInProgress,
    DeleteComplete,
    DeleteFailed,
    RollbackInProgress,
    RollbackComplete,
    RollbackFailed,
    Other(String),
}

impl StackStatus {
    /// Whether the stack will not move again without external intervention.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StackStatus::CreateComplete
                | StackStatus::CreateFailed
                | StackStatus::UpdateComplete
                | StackStatus::UpdateFailed
                | StackStatus::DeleteComplete
                | StackStatus::DeleteFailed
                | StackStatus::RollbackComplete
                | StackStatus::RollbackFailed
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            StackStatus::CreateInProgress => "CREATE_IN_PROGRESS",
            StackStatus::CreateComplete => "CREATE_COMPLETE",
            StackStatus::CreateFailed => "CREATE_FAILED",
            StackStatus::UpdateInProgress => "UPDATE_IN_PROGRESS",
            StackStatus::UpdateComplete => "UPDATE_COMPLETE",
            StackStatus::UpdateFailed => "UPDATE_FAILED",
            StackStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            StackStatus::DeleteComplete => "DELETE_COMPLETE",
            StackStatus::DeleteFailed => "DELETE_FAILED",
            StackStatus::RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            StackStatus::RollbackComplete => "ROLLBACK_COMPLETE",
            StackStatus::RollbackFailed => "ROLLBACK_FAILED",
            StackStatus::Other(status) => status,
        }
    }
}

impl From<&str> for StackStatus {
    fn from(status: &str) -> Self {
        match status {
            "CREATE_IN_PROGRESS" => StackStatus::CreateInProgress,
            "CREATE_COMPLETE" => StackStatus::CreateComplete,
            "CREATE_FAILED" => StackStatus::CreateFailed,
            "UPDATE_IN_PROGRESS" => StackStatus::UpdateInProgress,
            "UPDATE_COMPLETE" => StackStatus::UpdateComplete,
            "UPDATE_FAILED" => StackStatus::UpdateFailed,
            "DELETE_IN_PROGRESS" => StackStatus::DeleteInProgress,
            "DELETE_COMPLETE" => StackStatus::DeleteComplete,
            "DELETE_FAILED" => StackStatus::DeleteFailed,
            "ROLLBACK_IN_PROGRESS" => StackStatus::RollbackInProgress,
            "ROLLBACK_COMPLETE" => StackStatus::RollbackComplete,
            "ROLLBACK_FAILED" => StackStatus::RollbackFailed,
            other => StackStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for StackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the engine should do when stack creation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Rollback,
    Delete,
    DoNothing,
}

/// Snapshot of a stack: current status plus declared outputs.
///
/// Outputs are only populated by the engine once the stack reaches a
/// `*_COMPLETE` status.
#[derive(Debug, Clone)]
pub struct StackDescription {
    pub status: StackStatus,
    pub outputs: BTreeMap<String, String>,
}

/// Stack engine errors.
#[derive(Debug, Error)]
pub enum StackError {
    #[error("Stack not found: {0}")]
    NotFound(String),

    #[error("Provider error: {message}")]
    Provider {
        code: Option<String>,
        message: String,
    },

    #[error("Stack engine error: {0}")]
    Other(String),
}

pub type StackResult<T> = Result<T, StackError>;

/// Declarative-infrastructure capability.
#[async_trait]
pub trait StackEngine: Send + Sync {
    async fn create_stack(
        &self,
        name: &str,
        template: &str,
        capabilities: &[String],
        on_failure: OnFailure,
    ) -> StackResult<()>;

    async fn update_stack(&self, name: &str, template: &str) -> StackResult<()>;

    async fn delete_stack(&self, name: &str) -> StackResult<()>;

    /// Current status and outputs, or `None` when the stack does not exist.
    async fn describe_stack(&self, name: &str) -> StackResult<Option<StackDescription>>;
}
