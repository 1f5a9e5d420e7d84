//! Core domain types for docrelay.
//!
//! docrelay hands files to a remote, serverless conversion worker through an
//! object store: the engine uploads a source document to an input bucket,
//! the worker converts it out-of-band, and the engine polls an output bucket
//! for the result. This crate holds the pieces every other crate needs:
//! configuration, the conversion record and its status lifecycle, the
//! supported-format tables, domain events, and the persistence trait the
//! host application implements.

pub mod config;
pub mod error;
pub mod events;
pub mod formats;
pub mod models;
pub mod records;

pub use config::Config;
pub use error::{RecordError, RecordResult};
pub use events::{ConversionEvent, EventSink, TracingEventSink};
pub use formats::supports;
pub use models::{ConversionRequest, ConversionStatus};
pub use records::{ConversionStore, MemoryConversionStore};
