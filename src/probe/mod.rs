//! HTTP liveness probing
//!
//! `HttpProber` performs the HEAD→GET check with a bounded, manually-followed
//! redirect chain. Every network failure is returned as a classified
//! `ProbeOutcome` instead of an error.

pub mod outcome;
pub mod prober;

pub use outcome::{ErrorKind, FailureCategory, ProbeOutcome};
pub use prober::{HttpProber, LivenessProbe};
