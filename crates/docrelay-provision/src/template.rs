//! Infrastructure template rendering.
//!
//! Templates carry two placeholders that are substituted with literal
//! values before submission: the stack name and the bucket-name prefix the
//! stack uses for the input/output buckets it creates.

/// Placeholder for the stack name.
pub const STACK_NAME_PLACEHOLDER: &str = "{{stack_name}}";

/// Placeholder for the derived bucket-name prefix.
pub const BUCKET_PREFIX_PLACEHOLDER: &str = "{{bucket_prefix}}";

/// Substitute both placeholders everywhere they appear.
pub fn render_template(template: &str, stack_name: &str, bucket_prefix: &str) -> String {
    template
        .replace(STACK_NAME_PLACEHOLDER, stack_name)
        .replace(BUCKET_PREFIX_PLACEHOLDER, bucket_prefix)
}
