//! Retry and backoff policy for single-file transfers.
//!
//! Error classification (timeouts, throttling, connection failures) and
//! exponential backoff decisions live here so the transport and the metadata
//! lookup share one policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
