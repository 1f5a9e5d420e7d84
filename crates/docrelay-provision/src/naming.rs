//! Bucket name derivation.
//!
//! Bucket names are derived from the stack name plus a deterministic
//! uniqueness fragment. The provider imposes a hard global ceiling on
//! bucket-name length; the derivation enforces it here so an over-long name
//! can never reach a bucket-creation call.

use sha2::{Digest, Sha256};

/// Hard provider ceiling on bucket-name length.
pub const MAX_BUCKET_NAME_LEN: usize = 52;

/// Length of the hex uniqueness fragment appended to every derived name.
const UNIQUENESS_LEN: usize = 8;

fn sanitize(stack_name: &str) -> String {
    let sanitized: String = stack_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    sanitized.trim_matches('-').to_string()
}

fn uniqueness_fragment(stack_name: &str) -> String {
    let digest = Sha256::digest(stack_name.as_bytes());
    let mut fragment = String::with_capacity(UNIQUENESS_LEN);
    for byte in digest.iter().take(UNIQUENESS_LEN / 2) {
        fragment.push_str(&format!("{byte:02x}"));
    }
    fragment
}

/// Bucket-name prefix for a stack: lower-cased stack name, truncated to
/// leave room for the uniqueness fragment, never exceeding
/// [`MAX_BUCKET_NAME_LEN`].
pub fn bucket_prefix(stack_name: &str) -> String {
    let fragment = uniqueness_fragment(stack_name);
    let mut base = sanitize(stack_name);
    let budget = MAX_BUCKET_NAME_LEN - UNIQUENESS_LEN - 1;
    if base.len() > budget {
        base.truncate(budget);
        base = base.trim_matches('-').to_string();
    }
    if base.is_empty() {
        base = "docrelay".to_string();
    }
    format!("{base}-{fragment}")
}

/// Full bucket name for a stack and suffix, e.g. the `resource` staging
/// bucket. The stack-name part is truncated further so the suffixed name
/// also respects the ceiling.
pub fn bucket_name(stack_name: &str, suffix: &str) -> String {
    let fragment = uniqueness_fragment(stack_name);
    let mut base = sanitize(stack_name);
    let budget = MAX_BUCKET_NAME_LEN
        .saturating_sub(UNIQUENESS_LEN + suffix.len() + 2)
        .max(1);
    if base.len() > budget {
        base.truncate(budget);
        base = base.trim_matches('-').to_string();
    }
    if base.is_empty() {
        base = "d".to_string();
    }
    format!("{base}-{fragment}-{suffix}")
}
