//! Conversion engine for docrelay.
//!
//! Drives a [`docrelay_core::ConversionRequest`] through the object-store
//! rendezvous protocol: `start` uploads the source document to the input
//! bucket, an external worker converts it out-of-band, and `poll` watches
//! the output bucket until the result appears or the conversion times out.
//! The engine is retry-free; polls are idempotent and terminal states are
//! sticky.

pub mod diagnostics;
pub mod engine;
pub mod sweep;

#[cfg(test)]
pub(crate) mod test_support;

pub use diagnostics::RequirementsReport;
pub use engine::{ConversionEngine, EngineError, EngineResult};
pub use sweep::{ConversionSweep, SweepSummary};
