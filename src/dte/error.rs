//! Error types for the DTE codec's ambient configuration surface.

use thiserror::Error;

/// A caller-supplied [`super::DteSettings`] was invalid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("minimum digram frequency must be positive, got {given}")]
    MinFreqNotPositive { given: i32 },
    #[error("table range ({lo}, {hi}) is empty or inverted")]
    InvalidTableRange { lo: u8, hi: u8 },
}
