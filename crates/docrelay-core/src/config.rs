//! Configuration module
//!
//! Settings for the conversion engine: credentials, region, the input and
//! output rendezvous buckets, and the conversion timeout. Loaded from the
//! environment; the host application may also construct a `Config` directly
//! and inject it into the engine.

use std::env;
use std::time::Duration;

/// Default time allowed for the remote worker to produce output, in seconds.
const DEFAULT_CONVERSION_TIMEOUT_SECS: u64 = 300;

/// Conversion engine configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// API access key id. Ignored when `use_sdk_creds` is set.
    pub access_key: Option<String>,
    /// API secret access key. Ignored when `use_sdk_creds` is set.
    pub secret_key: Option<String>,
    /// Region hosting the buckets and the conversion worker.
    pub region: String,
    /// Bucket the engine uploads source documents into.
    pub input_bucket: String,
    /// Bucket the remote worker writes converted documents into.
    pub output_bucket: String,
    /// Resolve credentials from the ambient provider chain instead of the
    /// explicit key pair.
    pub use_sdk_creds: bool,
    /// Route remote calls through the host's HTTP proxy. The SDK picks the
    /// proxy up from the standard environment variables; this flag only
    /// gates whether we expect one.
    pub use_proxy: bool,
    /// How long a conversion may sit without output before it is failed.
    pub conversion_timeout: Duration,
}

impl Config {
    /// Load configuration from `DOCRELAY_*` environment variables.
    ///
    /// Reads a `.env` file first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let timeout_secs = env::var("DOCRELAY_CONVERSION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CONVERSION_TIMEOUT_SECS);

        Self {
            access_key: env::var("DOCRELAY_ACCESS_KEY").ok(),
            secret_key: env::var("DOCRELAY_SECRET_KEY").ok(),
            region: env::var("DOCRELAY_REGION").unwrap_or_default(),
            input_bucket: env::var("DOCRELAY_INPUT_BUCKET").unwrap_or_default(),
            output_bucket: env::var("DOCRELAY_OUTPUT_BUCKET").unwrap_or_default(),
            use_sdk_creds: env_flag("DOCRELAY_USE_SDK_CREDS"),
            use_proxy: env_flag("DOCRELAY_USE_PROXY"),
            conversion_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Whether every setting the engine needs before touching the remote
    /// store is present. Checked proactively; a half-configured engine must
    /// not attempt an upload.
    pub fn is_configured(&self) -> bool {
        if self.region.is_empty() || self.input_bucket.is_empty() || self.output_bucket.is_empty()
        {
            return false;
        }
        if self.use_sdk_creds {
            return true;
        }
        matches!(
            (&self.access_key, &self.secret_key),
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty()
        )
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
