//! Stack reconciliation workflow.
//!
//! `provision_stack` drives a named stack to the desired state:
//!
//! 1. query current status (`None` = stack does not exist);
//! 2. refuse to touch an existing stack unless replacement was requested;
//! 3. ensure the resource bucket exists and stage the deployment artifacts;
//! 4. render the template and update-or-create, falling back to
//!    delete-then-create when the update call is rejected;
//! 5. poll for a terminal status with a bounded retry budget and extract
//!    the stack outputs.
//!
//! All remote failures are caught at the point of call and surfaced as
//! structured [`ProvisionError`]s; the only deliberate leniencies are the
//! "assume deleted" case after a delete and tolerating an already-existing
//! resource bucket.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::sleep;

use docrelay_storage::{ObjectStore, StoreError};

use crate::naming::{bucket_name, bucket_prefix};
use crate::stack::{OnFailure, StackDescription, StackEngine, StackError, StackStatus};
use crate::template::render_template;

const CREATE_TERMINAL: [StackStatus; 4] = [
    StackStatus::CreateComplete,
    StackStatus::CreateFailed,
    StackStatus::DeleteComplete,
    StackStatus::RollbackComplete,
];

const UPDATE_TERMINAL: [StackStatus; 3] = [
    StackStatus::UpdateComplete,
    StackStatus::UpdateFailed,
    StackStatus::RollbackComplete,
];

const DELETE_TERMINAL: [StackStatus; 2] = [StackStatus::DeleteComplete, StackStatus::DeleteFailed];

/// Provisioning errors.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Stack exists and replacement not requested")]
    StackExists,

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Stack did not report a terminal status")]
    NoResult,

    #[error("Stack reached status {0}")]
    UnexpectedStatus(StackStatus),

    #[error("Resource bucket cleanup failed: {0}")]
    Cleanup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Successful reconciliation: a human-readable summary plus the stack's
/// declared outputs (access credential pair, input/output bucket names).
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub message: String,
    pub outputs: BTreeMap<String, String>,
}

/// Tuning knobs for the reconciliation wait loops.
#[derive(Clone, Debug)]
pub struct ProvisionerConfig {
    /// Stack name, unique per deployment.
    pub stack_name: String,
    pub region: String,
    /// Sleep between stack status polls.
    pub poll_interval: Duration,
    /// Maximum number of status polls per wait.
    pub max_status_attempts: usize,
    /// Consecutive "no such stack / query failed" responses tolerated
    /// before the wait aborts with no result.
    pub max_status_misses: usize,
    /// Settle time between requesting a delete and polling for it.
    pub delete_settle: Duration,
    /// Capabilities granted to the stack engine on create.
    pub capabilities: Vec<String>,
}

impl ProvisionerConfig {
    pub fn new(stack_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            region: region.into(),
            poll_interval: Duration::from_secs(30),
            max_status_attempts: 10,
            max_status_misses: 3,
            delete_settle: Duration::from_secs(10),
            capabilities: vec!["CAPABILITY_NAMED_IAM".to_string()],
        }
    }
}

/// Reconciles the conversion worker's infrastructure stack.
pub struct Provisioner {
    engine: Arc<dyn StackEngine>,
    store: Arc<dyn ObjectStore>,
    config: ProvisionerConfig,
}

impl Provisioner {
    pub fn new(
        engine: Arc<dyn StackEngine>,
        store: Arc<dyn ObjectStore>,
        config: ProvisionerConfig,
    ) -> Self {
        Self {
            engine,
            store,
            config,
        }
    }

    /// Name of the bucket holding staged deployment artifacts.
    pub fn resource_bucket(&self) -> String {
        bucket_name(&self.config.stack_name, "resource")
    }

    /// Prefix substituted into the template for the stack-managed buckets.
    pub fn bucket_prefix(&self) -> String {
        bucket_prefix(&self.config.stack_name)
    }

    /// Reconcile the stack to the given template, staging `resource_files`
    /// into the resource bucket first.
    pub async fn provision_stack(
        &self,
        template: &str,
        resource_files: &[PathBuf],
        replace_allowed: bool,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let stack_name = self.config.stack_name.clone();

        let existing = self.engine.describe_stack(&stack_name).await?;
        if let Some(description) = &existing {
            tracing::info!(stack = %stack_name, status = %description.status, "stack exists");
            if !replace_allowed {
                return Err(ProvisionError::StackExists);
            }
        }

        self.ensure_resource_bucket().await?;
        for file in resource_files {
            self.upload_resource(file).await?;
        }

        let rendered = render_template(template, &stack_name, &self.bucket_prefix());

        let terminal: &[StackStatus] = if existing.is_some() {
            match self.engine.update_stack(&stack_name, &rendered).await {
                Ok(()) => &UPDATE_TERMINAL,
                Err(err) => {
                    // "No updates to perform" and conflicting-state
                    // rejections land here; replace the stack instead.
                    tracing::warn!(stack = %stack_name, error = %err, "update rejected, replacing stack");
                    self.delete_stack().await?;
                    self.create(&rendered).await?;
                    &CREATE_TERMINAL
                }
            }
        } else {
            self.create(&rendered).await?;
            &CREATE_TERMINAL
        };

        match self.check_stack_ready(terminal).await? {
            None => Err(ProvisionError::NoResult),
            Some(description)
                if matches!(
                    description.status,
                    StackStatus::CreateComplete | StackStatus::UpdateComplete
                ) =>
            {
                Ok(ProvisionOutcome {
                    message: format!("Stack {stack_name} reached {}", description.status),
                    outputs: description.outputs,
                })
            }
            Some(description) => Err(ProvisionError::UnexpectedStatus(description.status)),
        }
    }

    async fn create(&self, template: &str) -> Result<(), ProvisionError> {
        self.engine
            .create_stack(
                &self.config.stack_name,
                template,
                &self.config.capabilities,
                OnFailure::Delete,
            )
            .await?;
        Ok(())
    }

    /// Poll the stack status until one of `terminal` is observed or the
    /// retry budget runs out. `Ok(None)` means "no result": either the
    /// status never became terminal, or too many consecutive polls found no
    /// stack at all.
    pub async fn check_stack_ready(
        &self,
        terminal: &[StackStatus],
    ) -> Result<Option<StackDescription>, ProvisionError> {
        let mut misses = 0usize;

        for attempt in 0..self.config.max_status_attempts {
            if attempt > 0 {
                sleep(self.config.poll_interval).await;
            }

            match self.engine.describe_stack(&self.config.stack_name).await {
                Ok(Some(description)) => {
                    misses = 0;
                    tracing::info!(
                        stack = %self.config.stack_name,
                        status = %description.status,
                        "stack status"
                    );
                    if terminal.contains(&description.status) {
                        return Ok(Some(description));
                    }
                }
                Ok(None) => {
                    misses += 1;
                    tracing::debug!(stack = %self.config.stack_name, misses, "no stack found");
                }
                Err(err) => {
                    misses += 1;
                    tracing::warn!(stack = %self.config.stack_name, error = %err, "status query failed");
                }
            }

            if misses > self.config.max_status_misses {
                return Ok(None);
            }
        }

        Ok(None)
    }

    /// Delete the stack and wait for the deletion to finish. A wait that
    /// ends with no status at all is treated as "assume deleted": once
    /// deletion completes, "no stack found" is indistinguishable from
    /// "already gone".
    pub async fn delete_stack(&self) -> Result<(), ProvisionError> {
        self.engine.delete_stack(&self.config.stack_name).await?;
        sleep(self.config.delete_settle).await;

        match self.check_stack_ready(&DELETE_TERMINAL).await? {
            None => {
                tracing::info!(stack = %self.config.stack_name, "no status after delete, assuming deleted");
                Ok(())
            }
            Some(description) if description.status == StackStatus::DeleteComplete => Ok(()),
            Some(description) => Err(ProvisionError::UnexpectedStatus(description.status)),
        }
    }

    /// Full teardown: delete the stack if it exists, then empty and delete
    /// the resource bucket, verifying the batch delete removed everything
    /// that was listed.
    pub async fn remove_stack(&self) -> Result<(), ProvisionError> {
        if self
            .engine
            .describe_stack(&self.config.stack_name)
            .await?
            .is_some()
        {
            self.delete_stack().await?;
        }

        let bucket = self.resource_bucket();
        let keys = self.store.list_objects(&bucket).await?;
        if !keys.is_empty() {
            let outcome = self.store.delete_objects(&bucket, &keys).await?;
            if outcome.deleted < keys.len() {
                let detail = outcome
                    .errors
                    .first()
                    .map(|err| format!("{}: {}", err.key, err.message))
                    .unwrap_or_else(|| {
                        format!("deleted {} of {} objects", outcome.deleted, keys.len())
                    });
                return Err(ProvisionError::Cleanup(detail));
            }
        }
        self.store.delete_bucket(&bucket).await?;
        tracing::info!(bucket = %bucket, "resource bucket removed");
        Ok(())
    }

    async fn ensure_resource_bucket(&self) -> Result<(), ProvisionError> {
        let bucket = self.resource_bucket();
        match self.store.create_bucket(&bucket, &self.config.region).await {
            Ok(()) => Ok(()),
            Err(StoreError::AlreadyExists(_)) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn upload_resource(&self, path: &Path) -> Result<(), ProvisionError> {
        let basename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("resource file has no usable name: {}", path.display()),
                )
            })?;
        let bytes = tokio::fs::read(path).await?;

        let mut metadata = HashMap::new();
        metadata.insert(
            "description".to_string(),
            "Deployment archive for the conversion worker.".to_string(),
        );

        tracing::info!(key = basename, "uploading deployment artifact");
        self.store
            .put_object(&self.resource_bucket(), basename, Bytes::from(bytes), &metadata)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use docrelay_storage::{BatchDelete, MemoryObjectStore, ObjectError, StoreResult};

    use crate::stack::StackResult;

    #[derive(Default)]
    struct MockStackEngine {
        describes: Mutex<VecDeque<Result<Option<StackDescription>, String>>>,
        create_error: Mutex<Option<String>>,
        update_error: Mutex<Option<String>>,
        delete_error: Mutex<Option<String>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockStackEngine {
        fn push_describe(&self, description: Option<StackDescription>) {
            self.describes.lock().unwrap().push_back(Ok(description));
        }

        fn push_describe_err(&self, message: &str) {
            self.describes
                .lock()
                .unwrap()
                .push_back(Err(message.to_string()));
        }

        fn reject_updates(&self, message: &str) {
            *self.update_error.lock().unwrap() = Some(message.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn provider(message: &str) -> StackError {
        StackError::Provider {
            code: None,
            message: message.to_string(),
        }
    }

    #[async_trait]
    impl StackEngine for MockStackEngine {
        async fn create_stack(
            &self,
            _name: &str,
            _template: &str,
            _capabilities: &[String],
            _on_failure: OnFailure,
        ) -> StackResult<()> {
            self.calls.lock().unwrap().push("create".to_string());
            match self.create_error.lock().unwrap().clone() {
                Some(message) => Err(provider(&message)),
                None => Ok(()),
            }
        }

        async fn update_stack(&self, _name: &str, _template: &str) -> StackResult<()> {
            self.calls.lock().unwrap().push("update".to_string());
            match self.update_error.lock().unwrap().clone() {
                Some(message) => Err(provider(&message)),
                None => Ok(()),
            }
        }

        async fn delete_stack(&self, _name: &str) -> StackResult<()> {
            self.calls.lock().unwrap().push("delete".to_string());
            match self.delete_error.lock().unwrap().clone() {
                Some(message) => Err(provider(&message)),
                None => Ok(()),
            }
        }

        async fn describe_stack(&self, _name: &str) -> StackResult<Option<StackDescription>> {
            self.calls.lock().unwrap().push("describe".to_string());
            match self.describes.lock().unwrap().pop_front() {
                Some(Ok(description)) => Ok(description),
                Some(Err(message)) => Err(provider(&message)),
                None => Ok(None),
            }
        }
    }

    fn desc(status: StackStatus) -> StackDescription {
        StackDescription {
            status,
            outputs: BTreeMap::new(),
        }
    }

    fn desc_with_outputs(status: StackStatus, pairs: &[(&str, &str)]) -> StackDescription {
        StackDescription {
            status,
            outputs: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn test_config() -> ProvisionerConfig {
        let mut config = ProvisionerConfig::new("DocConvertStack", "ap-southeast-2");
        config.poll_interval = Duration::ZERO;
        config.delete_settle = Duration::ZERO;
        config
    }

    fn provisioner(
        engine: Arc<MockStackEngine>,
        store: Arc<MemoryObjectStore>,
    ) -> Provisioner {
        Provisioner::new(engine, store, test_config())
    }

    fn temp_resource(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"archive bytes").unwrap();
        path
    }

    #[tokio::test]
    async fn existing_stack_without_replace_fails_fast() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(Some(desc(StackStatus::CreateComplete)));
        let store = Arc::new(MemoryObjectStore::new());
        let prov = provisioner(engine.clone(), store.clone());

        let err = prov
            .provision_stack("Resources: {}", &[], false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::StackExists));
        assert_eq!(
            err.to_string(),
            "Stack exists and replacement not requested"
        );
        // No mutation happened: only the initial describe, no bucket.
        assert_eq!(engine.calls(), vec!["describe"]);
        assert!(store.head_bucket(&prov.resource_bucket()).await.is_err());
    }

    #[tokio::test]
    async fn fresh_stack_is_created_and_outputs_extracted() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(None);
        engine.push_describe(Some(desc(StackStatus::CreateInProgress)));
        engine.push_describe(Some(desc_with_outputs(
            StackStatus::CreateComplete,
            &[
                ("S3UserAccessKey", "AKIA123"),
                ("S3UserSecretKey", "secret"),
                ("InputBucket", "prefix-input"),
                ("OutputBucket", "prefix-output"),
            ],
        )));
        let store = Arc::new(MemoryObjectStore::new());
        let prov = provisioner(engine.clone(), store.clone());

        let dir = tempfile::tempdir().unwrap();
        let archive = temp_resource(&dir, "worker.zip");
        let layer = temp_resource(&dir, "layer.zip");

        let outcome = prov
            .provision_stack("{{bucket_prefix}}", &[archive, layer], false)
            .await
            .unwrap();

        assert_eq!(outcome.outputs["InputBucket"], "prefix-input");
        assert_eq!(outcome.outputs["S3UserAccessKey"], "AKIA123");
        assert_eq!(
            engine.calls(),
            vec!["describe", "create", "describe", "describe"]
        );

        let resource_bucket = prov.resource_bucket();
        let mut staged = store.list_objects(&resource_bucket).await.unwrap();
        staged.sort();
        assert_eq!(staged, vec!["layer.zip", "worker.zip"]);
    }

    #[tokio::test]
    async fn rejected_update_falls_back_to_delete_and_create() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(Some(desc(StackStatus::UpdateComplete)));
        engine.reject_updates("No updates are to be performed");
        // Delete wait.
        engine.push_describe(Some(desc(StackStatus::DeleteComplete)));
        // Create wait; outputs come from this describe, not the update.
        engine.push_describe(Some(desc_with_outputs(
            StackStatus::CreateComplete,
            &[("InputBucket", "fresh-input")],
        )));
        let store = Arc::new(MemoryObjectStore::new());
        let prov = provisioner(engine.clone(), store);

        let outcome = prov
            .provision_stack("Resources: {}", &[], true)
            .await
            .unwrap();

        assert_eq!(outcome.outputs["InputBucket"], "fresh-input");
        assert_eq!(
            engine.calls(),
            vec!["describe", "update", "delete", "describe", "create", "describe"]
        );
    }

    #[tokio::test]
    async fn accepted_update_does_not_replace() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(Some(desc(StackStatus::CreateComplete)));
        engine.push_describe(Some(desc_with_outputs(
            StackStatus::UpdateComplete,
            &[("OutputBucket", "prefix-output")],
        )));
        let store = Arc::new(MemoryObjectStore::new());
        let prov = provisioner(engine.clone(), store);

        let outcome = prov
            .provision_stack("Resources: {}", &[], true)
            .await
            .unwrap();

        assert_eq!(outcome.outputs["OutputBucket"], "prefix-output");
        assert_eq!(engine.calls(), vec!["describe", "update", "describe"]);
    }

    #[tokio::test]
    async fn existing_resource_bucket_is_tolerated() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(None);
        engine.push_describe(Some(desc(StackStatus::CreateComplete)));
        let store = Arc::new(MemoryObjectStore::new());
        let prov = provisioner(engine, store.clone());
        store
            .create_bucket(&prov.resource_bucket(), "ap-southeast-2")
            .await
            .unwrap();

        prov.provision_stack("Resources: {}", &[], false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn consecutive_misses_abort_the_wait() {
        let engine = Arc::new(MockStackEngine::default());
        for _ in 0..4 {
            engine.push_describe(None);
        }
        let prov = provisioner(engine.clone(), Arc::new(MemoryObjectStore::new()));

        let ready = prov
            .check_stack_ready(&[StackStatus::CreateComplete])
            .await
            .unwrap();
        assert!(ready.is_none());
        assert_eq!(engine.calls().len(), 4);
    }

    #[tokio::test]
    async fn query_failures_count_as_misses() {
        let engine = Arc::new(MockStackEngine::default());
        for _ in 0..4 {
            engine.push_describe_err("throttled");
        }
        let prov = provisioner(engine.clone(), Arc::new(MemoryObjectStore::new()));

        let ready = prov
            .check_stack_ready(&[StackStatus::CreateComplete])
            .await
            .unwrap();
        assert!(ready.is_none());
        assert_eq!(engine.calls().len(), 4);
    }

    #[tokio::test]
    async fn a_successful_poll_resets_the_miss_counter() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(None);
        engine.push_describe(None);
        engine.push_describe(Some(desc(StackStatus::CreateInProgress)));
        engine.push_describe(None);
        engine.push_describe(None);
        engine.push_describe(Some(desc(StackStatus::CreateComplete)));
        let prov = provisioner(engine.clone(), Arc::new(MemoryObjectStore::new()));

        let ready = prov
            .check_stack_ready(&[StackStatus::CreateComplete])
            .await
            .unwrap();
        assert_eq!(ready.unwrap().status, StackStatus::CreateComplete);
    }

    #[tokio::test]
    async fn retry_budget_is_bounded() {
        let engine = Arc::new(MockStackEngine::default());
        for _ in 0..20 {
            engine.push_describe(Some(desc(StackStatus::CreateInProgress)));
        }
        let prov = provisioner(engine.clone(), Arc::new(MemoryObjectStore::new()));

        let ready = prov
            .check_stack_ready(&[StackStatus::CreateComplete])
            .await
            .unwrap();
        assert!(ready.is_none());
        assert_eq!(engine.calls().len(), 10);
    }

    #[tokio::test]
    async fn delete_with_no_status_assumes_deleted() {
        let engine = Arc::new(MockStackEngine::default());
        // Every describe after the delete finds nothing.
        let prov = provisioner(engine.clone(), Arc::new(MemoryObjectStore::new()));
        prov.delete_stack().await.unwrap();
        assert_eq!(engine.calls()[0], "delete");
    }

    #[tokio::test]
    async fn delete_failure_status_is_an_error() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(Some(desc(StackStatus::DeleteFailed)));
        let prov = provisioner(engine, Arc::new(MemoryObjectStore::new()));

        let err = prov.delete_stack().await.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::UnexpectedStatus(StackStatus::DeleteFailed)
        ));
    }

    /// Store double that scripts the batch-delete outcome and records call
    /// order for the teardown assertions.
    struct ScriptedStore {
        keys: Vec<String>,
        batch: Mutex<Option<BatchDelete>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedStore {
        fn new(keys: &[&str], batch: BatchDelete) -> Self {
            Self {
                keys: keys.iter().map(|k| k.to_string()).collect(),
                batch: Mutex::new(Some(batch)),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObjectStore for ScriptedStore {
        async fn put_object(
            &self,
            _bucket: &str,
            _key: &str,
            _bytes: Bytes,
            _metadata: &HashMap<String, String>,
        ) -> StoreResult<()> {
            self.calls.lock().unwrap().push("put".to_string());
            Ok(())
        }

        async fn get_object(&self, _bucket: &str, _key: &str) -> StoreResult<Bytes> {
            unimplemented!("not used in teardown")
        }

        async fn head_object(&self, _bucket: &str, _key: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn head_bucket(&self, _bucket: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn delete_object(&self, _bucket: &str, _key: &str) -> StoreResult<()> {
            self.calls.lock().unwrap().push("delete_object".to_string());
            Ok(())
        }

        async fn list_objects(&self, _bucket: &str) -> StoreResult<Vec<String>> {
            self.calls.lock().unwrap().push("list".to_string());
            Ok(self.keys.clone())
        }

        async fn delete_objects(
            &self,
            _bucket: &str,
            _keys: &[String],
        ) -> StoreResult<BatchDelete> {
            self.calls.lock().unwrap().push("batch_delete".to_string());
            Ok(self.batch.lock().unwrap().take().unwrap())
        }

        async fn create_bucket(&self, _bucket: &str, _region: &str) -> StoreResult<()> {
            self.calls.lock().unwrap().push("create_bucket".to_string());
            Ok(())
        }

        async fn delete_bucket(&self, _bucket: &str) -> StoreResult<()> {
            self.calls.lock().unwrap().push("delete_bucket".to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn remove_stack_lists_batch_deletes_and_drops_the_bucket_in_order() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(None); // stack already gone
        let store = Arc::new(ScriptedStore::new(
            &["worker.zip", "layer.zip", "template.yaml"],
            BatchDelete {
                deleted: 3,
                errors: vec![],
            },
        ));
        let prov = Provisioner::new(engine, store.clone(), test_config());

        prov.remove_stack().await.unwrap();
        assert_eq!(store.calls(), vec!["list", "batch_delete", "delete_bucket"]);
    }

    #[tokio::test]
    async fn remove_stack_escalates_a_batch_delete_shortfall() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(None);
        let store = Arc::new(ScriptedStore::new(
            &["worker.zip", "layer.zip"],
            BatchDelete {
                deleted: 1,
                errors: vec![ObjectError {
                    key: "layer.zip".to_string(),
                    message: "Access Denied".to_string(),
                }],
            },
        ));
        let prov = Provisioner::new(engine, store.clone(), test_config());

        let err = prov.remove_stack().await.unwrap_err();
        match err {
            ProvisionError::Cleanup(detail) => {
                assert!(detail.contains("layer.zip"));
                assert!(detail.contains("Access Denied"));
            }
            other => panic!("expected cleanup error, got {other:?}"),
        }
        // The bucket must survive a failed emptying.
        assert_eq!(store.calls(), vec!["list", "batch_delete"]);
    }

    #[tokio::test]
    async fn remove_stack_deletes_the_stack_first_when_present() {
        let engine = Arc::new(MockStackEngine::default());
        engine.push_describe(Some(desc(StackStatus::CreateComplete)));
        engine.push_describe(Some(desc(StackStatus::DeleteComplete)));
        let store = Arc::new(ScriptedStore::new(
            &[],
            BatchDelete::default(),
        ));
        let prov = Provisioner::new(engine.clone(), store.clone(), test_config());

        prov.remove_stack().await.unwrap();
        assert_eq!(engine.calls(), vec!["describe", "delete", "describe"]);
        assert_eq!(store.calls(), vec!["list", "delete_bucket"]);
    }
}
