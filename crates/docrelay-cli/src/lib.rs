use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Render stack outputs as a `DOCRELAY_*` env file.
///
/// Output keys are mapped to the settings [`docrelay_core::Config::from_env`]
/// reads; outputs with no corresponding setting are skipped.
pub fn render_env_config(outputs: &BTreeMap<String, String>, region: &str) -> String {
    let mappings = [
        ("S3UserAccessKey", "DOCRELAY_ACCESS_KEY"),
        ("S3UserSecretKey", "DOCRELAY_SECRET_KEY"),
        ("InputBucket", "DOCRELAY_INPUT_BUCKET"),
        ("OutputBucket", "DOCRELAY_OUTPUT_BUCKET"),
    ];

    let mut lines = vec![format!("DOCRELAY_REGION={region}")];
    for (output, setting) in mappings {
        if let Some(value) = outputs.get(output) {
            lines.push(format!("{setting}={value}"));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Hex-encoded SHA-256 of the file contents, used as the rendezvous key.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
