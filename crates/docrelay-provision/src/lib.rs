//! Environment provisioner for the remote conversion worker.
//!
//! The worker's supporting infrastructure (input/output buckets, execution
//! role, conversion function, event wiring) is described by a declarative
//! template and managed as a named stack. This crate reconciles that stack
//! to the desired state with create-or-update-or-replace semantics, stages
//! deployment artifacts in a separate resource bucket, and polls the stack
//! engine with a bounded retry budget until a terminal status appears.

pub mod cloudformation;
pub mod naming;
pub mod provisioner;
pub mod stack;
pub mod template;

pub use cloudformation::CloudFormationStackEngine;
pub use naming::{bucket_name, bucket_prefix, MAX_BUCKET_NAME_LEN};
pub use provisioner::{ProvisionError, ProvisionOutcome, Provisioner, ProvisionerConfig};
pub use stack::{OnFailure, StackDescription, StackEngine, StackError, StackResult, StackStatus};
pub use template::render_template;
