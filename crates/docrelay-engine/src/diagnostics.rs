//! Connectivity and permission diagnostics.
//!
//! Before the first conversion the host can verify that both rendezvous
//! buckets are reachable and that the configured credentials can write,
//! read, and delete in them. The probe uploads a small marker object to
//! each bucket and exercises the three operations on it.

use bytes::Bytes;

use crate::engine::ConversionEngine;
use docrelay_storage::StoreError;

/// Marker object used by the permission probe.
const PROBE_KEY: &str = "permissions_check_file";
const PROBE_CONTENT: &[u8] = b"test content";

/// Aggregated result of the connectivity and permission checks.
#[derive(Debug, Default)]
pub struct RequirementsReport {
    pub success: bool,
    pub messages: Vec<String>,
}

impl RequirementsReport {
    fn ok(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    fn fail(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self.success = false;
        self
    }
}

impl ConversionEngine {
    /// Probe both buckets for reachability and working permissions.
    ///
    /// Stops at the first unreachable bucket. Permission probes are
    /// stricter about writes than about reads and deletes: a missing
    /// probe object on read is tolerated (the write may have landed in a
    /// write-only bucket), and a denied delete is expected for a worker
    /// that only holds put/get rights. Any other delete failure is
    /// reported but does not fail the check.
    pub async fn check_requirements(&self) -> RequirementsReport {
        let mut report = RequirementsReport {
            success: true,
            messages: Vec::new(),
        };

        for (label, bucket) in [
            ("input", self.input_bucket().to_string()),
            ("output", self.output_bucket().to_string()),
        ] {
            if let Err(err) = self.store().head_bucket(&bucket).await {
                return report.fail(format!(
                    "Could not reach the {label} bucket {bucket}.\n{}",
                    err.detail()
                ));
            }
            report.ok(format!("The {label} bucket {bucket} is reachable."));
        }

        for (label, bucket) in [
            ("input", self.input_bucket().to_string()),
            ("output", self.output_bucket().to_string()),
        ] {
            match self.probe_bucket(&bucket).await {
                Ok(advisory) => {
                    report.ok(format!(
                        "Permissions verified for the {label} bucket {bucket}."
                    ));
                    if let Some(message) = advisory {
                        report.ok(message);
                    }
                }
                Err(message) => return report.fail(message),
            }
        }

        report
    }

    /// Whether the engine is configured and the remote checks pass.
    pub async fn are_requirements_met(&self) -> bool {
        self.config().is_configured() && self.check_requirements().await.success
    }

    /// Write, read back, and remove the probe object.
    ///
    /// Returns an advisory message when the delete failed in a tolerated
    /// way that is still worth surfacing.
    async fn probe_bucket(&self, bucket: &str) -> Result<Option<String>, String> {
        let metadata = std::collections::HashMap::new();
        if let Err(err) = self
            .store()
            .put_object(bucket, PROBE_KEY, Bytes::from_static(PROBE_CONTENT), &metadata)
            .await
        {
            return Err(format!(
                "Could not write to bucket {bucket}.\n{}",
                err.detail()
            ));
        }

        match self.store().get_object(bucket, PROBE_KEY).await {
            Ok(_) => {}
            // Tolerated: the probe write may have been accepted into a
            // bucket this principal cannot list or read back from.
            Err(StoreError::NotFound(_)) => {}
            Err(err) => {
                return Err(format!(
                    "Could not read from bucket {bucket}.\n{}",
                    err.detail()
                ));
            }
        }

        match self.store().delete_object(bucket, PROBE_KEY).await {
            Ok(()) => Ok(None),
            // A delete-denied principal is a valid least-privilege setup.
            Err(StoreError::Forbidden(_)) => Ok(None),
            Err(err) => Ok(Some(format!(
                "Could not remove the probe object from bucket {bucket}; remove {PROBE_KEY} manually.\n{}",
                err.detail()
            ))),
        }
    }
}
