//! Throttling primitives for rate-sensitive collaborators
//!
//! - `retry`: one retry/backoff loop shared by every caller that retries
//! - `gate`: strictly serialized requests with a minimum spacing

pub mod gate;
pub mod retry;

pub use gate::{GatePermit, RequestGate};
pub use retry::{RetryPolicy, retry_with_backoff};
