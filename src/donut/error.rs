//! Error types for the Donut codec.
//!
//! Everyday decode/encode flow control lives in [`super::DecodeStatus`] and
//! [`super::EncodeStatus`] instead of here: those outcomes (ran out of
//! source bytes, hit an undefined header) are expected and recoverable, not
//! exceptional. What's left for `std::error::Error` is genuine misuse.

use thiserror::Error;

/// A caller-supplied [`super::DonutSettings`] was invalid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cycle limit {given} is below the minimum decodable budget {minimum}")]
    CycleLimitTooLow { given: u32, minimum: u32 },
}

/// Wraps an encountered undefined block header as a proper `std::error::Error`,
/// for callers that want `?`-compatible decoding rather than matching on
/// [`super::DecodeStatus`] directly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("block header {header:#04x} is reserved and undefined")]
    UndefinedBlock { header: u8 },
}
