//! Object store capability for docrelay.
//!
//! The conversion pipeline uses an object store purely as a rendezvous
//! point: the engine writes a source document under its content-addressable
//! key, the remote worker writes the converted result under the same key in
//! another bucket. This crate defines the [`ObjectStore`] trait with the
//! error taxonomy the engine and provisioner branch on, an S3 backend, and
//! an in-memory backend for tests and dry runs.

pub mod memory;
pub mod s3;
pub mod traits;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;
pub use traits::{BatchDelete, ObjectError, ObjectStore, StoreError, StoreResult};
