//! The Donut decoder: one compressed block in, one 64-byte tile out.

use super::error::Error;
use super::plane::{flip_plane_bits_135, write_plane};
use super::{Tile, LITERAL_HEADER, UNDEFINED_HEADER_MIN};
use log::{debug, trace};

/// Outcome of attempting to decode one block from a byte slice.
///
/// Most of these are flow control, not failure: a decoder streaming blocks
/// out of a growing buffer sees `SrcPartial` constantly and simply waits for
/// more bytes, exactly as the original cursor-based decoder did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// A full block was decoded; see the `DecodedBlock` returned alongside.
    Ok,
    /// `src` was completely empty; there was nothing to even look at.
    SrcEmpty,
    /// `src` held at least one byte but not enough to complete the block; no
    /// bytes were consumed and the caller should retry once more data arrives.
    SrcPartial,
    /// The header byte named a reserved/undefined block shape.
    UndefinedBlock,
}

/// A single decoded tile plus how many source bytes it consumed.
#[derive(Debug, Clone, Copy)]
pub struct DecodedBlock {
    pub tile: Tile,
    pub consumed: usize,
}

const SHORT_DEFS: [u8; 4] = [0x00, 0x55, 0xAA, 0xFF];

/// A read-only cursor into `src` that records when it ran out of bytes,
/// without ever returning a byte for a position it didn't actually have.
struct PartialCursor<'a> {
    src: &'a [u8],
    pos: usize,
    starved: bool,
}

impl<'a> PartialCursor<'a> {
    fn new(src: &'a [u8]) -> Self {
        PartialCursor { src, pos: 0, starved: false }
    }

    fn take_u8(&mut self) -> u8 {
        match self.src.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                b
            }
            None => {
                self.starved = true;
                0
            }
        }
    }

    fn take_slice(&mut self, n: usize) -> &'a [u8] {
        if self.pos + n > self.src.len() {
            self.starved = true;
            self.pos = self.src.len();
            &[]
        } else {
            let s = &self.src[self.pos..self.pos + n];
            self.pos += n;
            s
        }
    }
}

/// Decode exactly one compressed block from the front of `src`.
///
/// On `Ok`, `DecodedBlock::consumed` bytes were consumed from the front of
/// `src`; on every other status, `src` must be treated as wholly unconsumed,
/// mirroring the original decompressor's rule of only committing its cursor
/// after a block decodes in full.
pub fn decode_one_block(src: &[u8]) -> (DecodeStatus, Option<DecodedBlock>) {
    if src.is_empty() {
        return (DecodeStatus::SrcEmpty, None);
    }
    let header = src[0];
    trace!("decoding block header {:#04x}", header);
    if header >= UNDEFINED_HEADER_MIN {
        debug!("undefined block header {:#04x}, stopping", header);
        return (DecodeStatus::UndefinedBlock, None);
    }
    if header == LITERAL_HEADER {
        if src.len() < 65 {
            return (DecodeStatus::SrcPartial, None);
        }
        let mut tile = [0u8; 64];
        tile.copy_from_slice(&src[1..65]);
        return (DecodeStatus::Ok, Some(DecodedBlock { tile, consumed: 65 }));
    }

    let mut cur = PartialCursor::new(&src[1..]);
    let plane_def_explicit = header & 0x02 != 0;
    let mut plane_def = if plane_def_explicit {
        cur.take_u8()
    } else {
        SHORT_DEFS[((header & 0x0c) >> 2) as usize]
    };
    if cur.starved {
        return (DecodeStatus::SrcPartial, None);
    }
    let decode_only_one_pb8_plane = plane_def_explicit && (header & 0x04 != 0) && plane_def != 0x00;
    let single_pb8_start = cur.pos;

    let mut planes = [0u64; 8];
    for (i, plane) in planes.iter_mut().enumerate() {
        let bg: u8 = if (i % 2 == 0 && header & 0x20 != 0) || (i % 2 == 1 && header & 0x10 != 0) {
            0xff
        } else {
            0x00
        };
        let mut value: u64 = if bg == 0xff { u64::MAX } else { 0 };

        if plane_def & 0x80 != 0 {
            if decode_only_one_pb8_plane {
                cur.pos = single_pb8_start;
            }
            let ctrl = cur.take_u8();
            if cur.starved {
                return (DecodeStatus::SrcPartial, None);
            }
            let payload_len = ctrl.count_ones() as usize;
            let payload = cur.take_slice(payload_len);
            if cur.starved {
                return (DecodeStatus::SrcPartial, None);
            }
            let mut decoded = unpack_pb8(ctrl, payload, bg);
            if header & 0x01 != 0 {
                decoded = flip_plane_bits_135(decoded);
            }
            value = decoded;
        }
        plane_def <<= 1;
        *plane = value;
    }

    let mut tile = [0u8; 64];
    let mut i = 0;
    while i < 8 {
        let mut prev_plane = planes[i];
        let mut plane = planes[i + 1];
        if header & 0x80 != 0 {
            prev_plane ^= plane;
        }
        if header & 0x40 != 0 {
            plane ^= prev_plane;
        }
        write_plane(&mut tile[i * 8..i * 8 + 8], prev_plane);
        write_plane(&mut tile[(i + 1) * 8..(i + 1) * 8 + 8], plane);
        i += 2;
    }

    let consumed = 1 + cur.pos;
    (DecodeStatus::Ok, Some(DecodedBlock { tile, consumed }))
}

/// Unpack a PB8-encoded plane given its control byte and literal payload,
/// with `top_value` as the byte preceding the first plane byte (the
/// background fill when no literal bytes were present yet).
fn unpack_pb8(ctrl: u8, payload: &[u8], top_value: u8) -> u64 {
    let mut plane = 0u64;
    let mut prev = top_value;
    let mut payload_idx = 0;
    for i in 0..8 {
        let byte = if ctrl & (0x80 >> i) != 0 {
            let b = payload[payload_idx];
            payload_idx += 1;
            b
        } else {
            prev
        };
        prev = byte;
        plane = (plane << 8) | byte as u64;
    }
    plane
}

/// Like [`decode_one_block`], but for callers who'd rather propagate an
/// undefined header with `?` than match `DecodeStatus::UndefinedBlock`
/// themselves: every other status passes through unchanged inside `Ok`.
pub fn try_decode_one_block(src: &[u8]) -> Result<(DecodeStatus, Option<DecodedBlock>), Error> {
    let (status, block) = decode_one_block(src);
    if status == DecodeStatus::UndefinedBlock {
        return Err(Error::UndefinedBlock { header: src[0] });
    }
    Ok((status, block))
}

/// Decode as many whole blocks as `src` holds, stopping at the first status
/// that isn't `Ok`. Returns the decoded tiles and that terminal status.
pub fn decode_blocks(mut src: &[u8]) -> (Vec<Tile>, DecodeStatus) {
    let mut tiles = Vec::new();
    loop {
        match decode_one_block(src) {
            (DecodeStatus::Ok, Some(block)) => {
                tiles.push(block.tile);
                src = &src[block.consumed..];
            }
            (status, _) => {
                debug!("decode_blocks stopping after {} tiles: {:?}", tiles.len(), status);
                return (tiles, status);
            }
        }
    }
}
