//! Error types for command construction.
//!
//! # Design
//! The only failure a caller can cause is handing a setter a flat key/value
//! list of odd length. It is reported at the setter, never at render time:
//! rendering is best-effort and always produces a command.

use thiserror::Error;

/// Errors returned by `CurlBuilder` setters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurlError {
    /// A flat key/value list had an odd number of elements.
    #[error("{setter}: expected key/value pairs, got {count} values")]
    UnpairedValues { setter: &'static str, count: usize },
}
