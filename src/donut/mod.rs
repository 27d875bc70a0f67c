//! The Donut NES CHR tile codec.
//!
//! A Donut file is a concatenation of variable-length "compressed blocks",
//! each decoding to exactly 64 bytes of raw tile data (one NES CHR tile plus
//! its attribute-free neighbour, i.e. 8 bit-planes of 8 bytes each). There is
//! no framing: no magic number, no length prefix, no trailer.
//!
//! See [`decode`] and [`encode`] for the two engines, [`buffer::SplitBuffer`]
//! for the sliding-buffer abstraction a streaming caller drives them with,
//! and [`cost`] for the decode-cycle model the encoder optimizes against.

mod buffer;
mod cost;
mod dont_care;
mod encode;
mod error;
mod decode;
mod plane;

pub use buffer::SplitBuffer;
pub use cost::cblock_cost;
pub use decode::{decode_blocks, decode_one_block, try_decode_one_block, DecodeStatus, DecodedBlock};
pub use dont_care::fill_dont_care_bits;
pub use encode::{
    encode_blocks, encode_blocks_dcb, encode_one_block, encode_one_block_dcb, encode_tile,
    encode_tile_dcb, DonutSettings, EncodeStatus, EncodedBlock,
};
pub use error::{ConfigError, Error};
pub use plane::flip_plane_bits_135;

/// The only header byte that means "the next 64 bytes are a raw, uncompressed tile".
pub const LITERAL_HEADER: u8 = 0x2A;

/// Headers at or above this value are reserved and must be rejected by a decoder.
pub const UNDEFINED_HEADER_MIN: u8 = 0xC0;

/// A decode-cycle budget below this many cycles can never be satisfied (the
/// literal fallback alone costs this much), so encoder settings must reject it.
pub const MIN_CYCLE_LIMIT: u32 = 1268;

/// A raw, uncompressed 64-byte NES CHR tile pair.
pub type Tile = [u8; 64];
