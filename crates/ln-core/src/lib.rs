//! Shared primitives used across Lantern crates.

use thiserror::Error;

/// Result alias used across the workspace.
pub type LanternResult<T> = Result<T, LanternError>;

/// Error raised by the fallible edges of the pipeline (fetching, driver commands).
///
/// Parsing, layout and paint never produce one of these: malformed input is
/// repaired in place and the geometry stages are total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct LanternError {
    pub code: &'static str,
    pub message: String,
}

impl LanternError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Stage prefix of the error code (`net`, `renderer`, ...).
    pub fn stage(&self) -> &'static str {
        match self.code.split_once('.') {
            Some((stage, _)) => stage,
            None => self.code,
        }
    }
}
