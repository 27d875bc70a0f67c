//! Digram Tree Encoding: a byte-level recursive pair-substitution codec.
//!
//! An unused byte value in a stream can stand in for an ordered pair of
//! bytes, which may themselves be substitution symbols. [`compress::compress`]
//! greedily builds such a table by repeatedly folding the most frequent
//! remaining pair into one of its halves; [`expand::expand`] undoes it.

mod compress;
mod error;
mod expand;
mod table;

pub use compress::{compress, DteSettings};
pub use error::ConfigError;
pub use expand::{expand, grow_capacity, ExpandError};
pub use table::{CharFlags, DigramTable};
