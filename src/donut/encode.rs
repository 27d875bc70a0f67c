//! The Donut encoder: search a handful of block shapes per 64-byte tile and
//! keep whichever is shortest (ties broken by lowest decode cost), gated by
//! a caller-supplied cycle budget.

use super::cost::cblock_cost;
use super::dont_care::fill_dont_care_bits;
use super::error::ConfigError;
use super::plane::{flip_plane_bits_135, pack_pb8, read_plane};
use super::{Tile, LITERAL_HEADER, MIN_CYCLE_LIMIT};

const SHORT_DEFS: [u8; 4] = [0x00, 0x55, 0xAA, 0xFF];

/// Tunable knobs for [`encode_one_block`] and [`encode_blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonutSettings {
    /// Also try each candidate's 135-degree bit-flip; doubles search cost.
    pub bit_flip: bool,
    /// Reject any candidate whose estimated decode cost exceeds this many
    /// simulated 6502 cycles. Must be at least [`super::MIN_CYCLE_LIMIT`].
    pub cycle_limit: u32,
    /// Allow unmasked ("don't-care") bits in partially-defined tiles; see
    /// [`super::fill_dont_care_bits`]. Not consulted by the plain encoder.
    pub dont_care_bits: bool,
}

impl Default for DonutSettings {
    fn default() -> Self {
        DonutSettings {
            bit_flip: true,
            cycle_limit: 10_000,
            dont_care_bits: false,
        }
    }
}

impl DonutSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_limit < MIN_CYCLE_LIMIT {
            return Err(ConfigError::CycleLimitTooLow {
                given: self.cycle_limit,
                minimum: MIN_CYCLE_LIMIT,
            });
        }
        Ok(())
    }
}

/// Outcome of attempting to encode one 64-byte tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStatus {
    /// A block was produced; see the `EncodedBlock` returned alongside.
    Ok,
    /// `src` was completely empty.
    SrcEmpty,
    /// `src` held fewer than 64 bytes; no bytes were consumed.
    SrcPartial,
}

/// One encoded block plus how many source bytes it consumed (always 64,
/// except the fallback padded-partial case handled by the caller).
#[derive(Debug, Clone)]
pub struct EncodedBlock {
    pub bytes: Vec<u8>,
    pub consumed: usize,
}

struct Candidate {
    bytes: Vec<u8>,
}

/// Encode one 64-byte tile from the front of `src` under `settings`.
pub fn encode_one_block(src: &[u8], settings: &DonutSettings) -> (EncodeStatus, Option<EncodedBlock>) {
    if src.is_empty() {
        return (EncodeStatus::SrcEmpty, None);
    }
    if src.len() < 64 {
        return (EncodeStatus::SrcPartial, None);
    }
    let tile: &[u8; 64] = src[..64].try_into().unwrap();
    let bytes = encode_tile(tile, settings);
    (EncodeStatus::Ok, Some(EncodedBlock { bytes, consumed: 64 }))
}

/// Encode a complete tile, choosing the shortest candidate under
/// `settings.cycle_limit` (ties broken by lower decode cost). Always
/// succeeds: the literal fallback is itself a valid candidate.
pub fn encode_tile(tile: &Tile, settings: &DonutSettings) -> Vec<u8> {
    let mut planes = [0u64; 8];
    for (i, plane) in planes.iter_mut().enumerate() {
        *plane = read_plane(&tile[i * 8..i * 8 + 8]);
    }

    let mut best = {
        let mut literal = Vec::with_capacity(65);
        literal.push(LITERAL_HEADER);
        literal.extend_from_slice(tile);
        literal
    };
    let mut best_cost = cblock_cost(&best);

    let flip_rounds: &[bool] = if settings.bit_flip { &[false, true] } else { &[false] };
    for &flipped in flip_rounds {
        let round_planes = if flipped {
            let mut p = planes;
            for v in p.iter_mut() {
                *v = flip_plane_bits_135(*v);
            }
            p
        } else {
            planes
        };
        // `a` selects every combination of the two background bits plus at
        // most one of the two XOR-combine bits; a in 12..=15 would set both
        // combine bits at once, a shape the decoder's sequential combine
        // formula can't recover in general, so it's left out of the search.
        for a in 0u8..12 {
            let bg_odd = a & 0x1 != 0;
            let bg_even = a & 0x2 != 0;
            let combine_m = a & 0x4 != 0;
            let combine_l = a & 0x8 != 0;
            let candidate = build_candidate(&round_planes, flipped, bg_even, bg_odd, combine_m, combine_l);
            let cost = cblock_cost(&candidate.bytes);
            if cost == 0 {
                continue;
            }
            if cost > settings.cycle_limit {
                continue;
            }
            let better = candidate.bytes.len() < best.len()
                || (candidate.bytes.len() == best.len() && cost < best_cost);
            if better {
                best_cost = cost;
                best = candidate.bytes;
            }
        }
    }
    best
}

fn build_candidate(
    planes: &[u64; 8],
    flipped: bool,
    bg_even: bool,
    bg_odd: bool,
    combine_m: bool,
    combine_l: bool,
) -> Candidate {
    let mut final_planes = [0u64; 8];
    let mut i = 0;
    while i < 8 {
        let even_raw = planes[i];
        let odd_raw = planes[i + 1];
        final_planes[i] = if combine_l { even_raw ^ odd_raw } else { even_raw };
        final_planes[i + 1] = if combine_m { odd_raw ^ even_raw } else { odd_raw };
        i += 2;
    }
    let header_base = (flipped as u8)
        | if bg_even { 0x20 } else { 0 }
        | if bg_odd { 0x10 } else { 0 }
        | if combine_m { 0x40 } else { 0 }
        | if combine_l { 0x80 } else { 0 };
    pack_planes(&final_planes, header_base)
}

/// Same candidate shape as [`build_candidate`], but each plane's "don't
/// care" bits (per `masks`) are filled in — independently, then (if this
/// candidate combines a pair) cross-filled against its partner's filled
/// value — before packing, so masked bits land wherever makes the PB8
/// encoding cheapest rather than wherever the source tile happened to leave
/// them.
fn build_candidate_dcb(
    planes: &[u64; 8],
    masks: &[u64; 8],
    flipped: bool,
    bg_even: bool,
    bg_odd: bool,
    combine_m: bool,
    combine_l: bool,
) -> Candidate {
    let predict_byte_even: u8 = if bg_even { 0xff } else { 0x00 };
    let predict_byte_odd: u8 = if bg_odd { 0xff } else { 0x00 };

    let mut final_planes = [0u64; 8];
    let mut i = 0;
    while i < 8 {
        let even_filled0 = fill_dont_care_bits(planes[i], masks[i], 0, predict_byte_even);
        let odd_filled0 = fill_dont_care_bits(planes[i + 1], masks[i + 1], 0, predict_byte_odd);
        let even_filled = if combine_l {
            fill_dont_care_bits(even_filled0, masks[i], odd_filled0, predict_byte_even)
        } else {
            even_filled0
        };
        let odd_filled = if combine_m {
            fill_dont_care_bits(odd_filled0, masks[i + 1], even_filled0, predict_byte_odd)
        } else {
            odd_filled0
        };
        final_planes[i] = if combine_l { even_filled ^ odd_filled } else { even_filled };
        final_planes[i + 1] = if combine_m { odd_filled ^ even_filled } else { odd_filled };
        i += 2;
    }
    let header_base = (flipped as u8)
        | if bg_even { 0x20 } else { 0 }
        | if bg_odd { 0x10 } else { 0 }
        | if combine_m { 0x40 } else { 0 }
        | if combine_l { 0x80 } else { 0 };
    pack_planes(&final_planes, header_base)
}

/// Pack 8 already-final plane values (background prediction decided, any
/// XOR-combine already applied) into a compressed block body, picking the
/// explicit-plane_def-dedup shape, a short_defs shape, or the general
/// explicit plane_def shape, whichever header bits in `header_base`
/// (background + combine bits already set) call for.
fn pack_planes(final_planes: &[u64; 8], header_base: u8) -> Candidate {
    let bg_even = header_base & 0x20 != 0;
    let bg_odd = header_base & 0x10 != 0;
    let predict_even: u64 = if bg_even { u64::MAX } else { 0 };
    let predict_odd: u64 = if bg_odd { u64::MAX } else { 0 };
    let predict_byte_even: u8 = if bg_even { 0xff } else { 0x00 };
    let predict_byte_odd: u8 = if bg_odd { 0xff } else { 0x00 };

    let mut plane_def = 0u8;
    let mut packed: Vec<Vec<u8>> = Vec::with_capacity(8);
    for (i, &plane) in final_planes.iter().enumerate() {
        let (predict, predict_byte) = if i % 2 == 0 {
            (predict_even, predict_byte_even)
        } else {
            (predict_odd, predict_byte_odd)
        };
        plane_def <<= 1;
        if plane != predict {
            let mut buf = Vec::with_capacity(9);
            pack_pb8(&mut buf, plane, predict_byte);
            plane_def |= 1;
            packed.push(buf);
        }
    }

    let dedup_ok = bg_even == bg_odd && packed.len() >= 2 && packed.iter().all(|p| p == &packed[0]);

    if dedup_ok {
        let mut bytes = vec![header_base | 0x02 | 0x04, plane_def];
        bytes.extend_from_slice(&packed[0]);
        return Candidate { bytes };
    }

    if let Some(idx) = SHORT_DEFS.iter().position(|&d| d == plane_def) {
        let mut bytes = vec![header_base | ((idx as u8) << 2)];
        for p in &packed {
            bytes.extend_from_slice(p);
        }
        return Candidate { bytes };
    }

    let mut bytes = vec![header_base | 0x02, plane_def];
    for p in &packed {
        bytes.extend_from_slice(p);
    }
    Candidate { bytes }
}

/// Encode one tile plus its don't-care bit mask (see
/// [`super::DonutSettings::dont_care_bits`]), choosing the shortest
/// candidate the same way [`encode_tile`] does but with masked bits filled
/// in by [`fill_dont_care_bits`] before each candidate is packed.
pub fn encode_tile_dcb(tile: &Tile, mask: &Tile, settings: &DonutSettings) -> Vec<u8> {
    let mut planes = [0u64; 8];
    let mut masks = [0u64; 8];
    for i in 0..8 {
        planes[i] = read_plane(&tile[i * 8..i * 8 + 8]);
        masks[i] = read_plane(&mask[i * 8..i * 8 + 8]);
    }

    let mut best = {
        let mut literal = Vec::with_capacity(65);
        literal.push(LITERAL_HEADER);
        literal.extend_from_slice(tile);
        literal
    };
    let mut best_cost = cblock_cost(&best);

    let flip_rounds: &[bool] = if settings.bit_flip { &[false, true] } else { &[false] };
    for &flipped in flip_rounds {
        let (round_planes, round_masks) = if flipped {
            let mut p = planes;
            let mut m = masks;
            for v in p.iter_mut() {
                *v = flip_plane_bits_135(*v);
            }
            for v in m.iter_mut() {
                *v = flip_plane_bits_135(*v);
            }
            (p, m)
        } else {
            (planes, masks)
        };
        for a in 0u8..12 {
            let bg_odd = a & 0x1 != 0;
            let bg_even = a & 0x2 != 0;
            let combine_m = a & 0x4 != 0;
            let combine_l = a & 0x8 != 0;
            let candidate = build_candidate_dcb(
                &round_planes,
                &round_masks,
                flipped,
                bg_even,
                bg_odd,
                combine_m,
                combine_l,
            );
            let cost = cblock_cost(&candidate.bytes);
            if cost == 0 {
                continue;
            }
            if cost > settings.cycle_limit {
                continue;
            }
            let better = candidate.bytes.len() < best.len()
                || (candidate.bytes.len() == best.len() && cost < best_cost);
            if better {
                best_cost = cost;
                best = candidate.bytes;
            }
        }
    }
    best
}

/// Encode one 128-byte unit (64 bytes of tile data, then 64 bytes of
/// don't-care bit mask) from the front of `src`. A trailing unit with fewer
/// than 128 bytes but at least 64 is treated as having an all-zero (no
/// don't-cares) mask, consuming only the 64 data bytes.
pub fn encode_one_block_dcb(src: &[u8], settings: &DonutSettings) -> (EncodeStatus, Option<EncodedBlock>) {
    if src.is_empty() {
        return (EncodeStatus::SrcEmpty, None);
    }
    if src.len() < 64 {
        return (EncodeStatus::SrcPartial, None);
    }
    let tile: &Tile = src[..64].try_into().unwrap();
    let (mask, consumed): (Tile, usize) = if src.len() >= 128 {
        (src[64..128].try_into().unwrap(), 128)
    } else {
        ([0u8; 64], 64)
    };
    let bytes = encode_tile_dcb(tile, &mask, settings);
    (EncodeStatus::Ok, Some(EncodedBlock { bytes, consumed }))
}

/// Encode as many whole 128-byte (data, mask) units as `src` holds,
/// stopping once fewer than 64 data bytes remain. See
/// [`encode_one_block_dcb`] for how a short trailing unit is handled.
pub fn encode_blocks_dcb(mut src: &[u8], settings: &DonutSettings) -> (Vec<u8>, EncodeStatus) {
    let mut out = Vec::new();
    loop {
        match encode_one_block_dcb(src, settings) {
            (EncodeStatus::Ok, Some(block)) => {
                out.extend_from_slice(&block.bytes);
                src = &src[block.consumed..];
            }
            (status, _) => return (out, status),
        }
    }
}

/// Encode as many whole 64-byte tiles as `src` holds, stopping once fewer
/// than 64 bytes remain. Returns the concatenated encoded bytes and the
/// terminal status.
pub fn encode_blocks(mut src: &[u8], settings: &DonutSettings) -> (Vec<u8>, EncodeStatus) {
    let mut out = Vec::new();
    loop {
        match encode_one_block(src, settings) {
            (EncodeStatus::Ok, Some(block)) => {
                out.extend_from_slice(&block.bytes);
                src = &src[block.consumed..];
            }
            (status, _) => return (out, status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donut::decode::{decode_one_block, DecodeStatus};

    #[test]
    fn all_zero_tile_encodes_small_and_roundtrips() {
        let tile = [0u8; 64];
        let settings = DonutSettings::default();
        let bytes = encode_tile(&tile, &settings);
        assert!(bytes.len() < 65, "all-zero tile should beat the literal fallback");
        let (status, decoded) = decode_one_block(&bytes);
        assert_eq!(status, DecodeStatus::Ok);
        assert_eq!(&decoded.unwrap().tile[..], &tile[..]);
    }

    #[test]
    fn arbitrary_tile_roundtrips() {
        let mut tile = [0u8; 64];
        for (i, b) in tile.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37).wrapping_add(11);
        }
        let settings = DonutSettings::default();
        let bytes = encode_tile(&tile, &settings);
        let (status, decoded) = decode_one_block(&bytes);
        assert_eq!(status, DecodeStatus::Ok);
        assert_eq!(&decoded.unwrap().tile[..], &tile[..]);
    }

    #[test]
    fn never_exceeds_literal_fallback_length() {
        let mut tile = [0u8; 64];
        for (i, b) in tile.iter_mut().enumerate() {
            *b = if i % 7 == 0 { 0xAB } else { 0 };
        }
        let settings = DonutSettings::default();
        let bytes = encode_tile(&tile, &settings);
        assert!(bytes.len() <= 65);
    }

    #[test]
    fn cycle_limit_below_minimum_is_rejected() {
        let settings = DonutSettings { cycle_limit: 10, ..DonutSettings::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn default_settings_validate() {
        assert!(DonutSettings::default().validate().is_ok());
    }

    #[test]
    fn partial_source_does_not_consume() {
        let (status, block) = encode_one_block(&[1, 2, 3], &DonutSettings::default());
        assert_eq!(status, EncodeStatus::SrcPartial);
        assert!(block.is_none());
    }

    #[test]
    fn empty_source_is_src_empty() {
        let (status, block) = encode_one_block(&[], &DonutSettings::default());
        assert_eq!(status, EncodeStatus::SrcEmpty);
        assert!(block.is_none());
    }

    #[test]
    fn tile_where_m_plane_equals_l_plane_roundtrips_via_combine_search() {
        // Every odd (M) plane byte equals its paired even (L) plane byte, so
        // the XOR-combine search should find a header with 0x40 or 0x80 set
        // (M/L plane collapses to all-zero once combined) at least as small
        // as the non-combined candidates, and it must still decode correctly.
        let mut tile = [0u8; 64];
        for j in 0..4 {
            let b = (j as u8).wrapping_mul(53).wrapping_add(7);
            for k in 0..8 {
                tile[j * 16 + k] = b;
                tile[j * 16 + 8 + k] = b;
            }
        }
        let settings = DonutSettings::default();
        let bytes = encode_tile(&tile, &settings);
        let (status, decoded) = decode_one_block(&bytes);
        assert_eq!(status, DecodeStatus::Ok);
        assert_eq!(&decoded.unwrap().tile[..], &tile[..]);
    }

    #[test]
    fn dcb_with_all_zero_mask_matches_plain_encoding_in_defined_bits() {
        let mut tile = [0u8; 64];
        for (i, b) in tile.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(19).wrapping_add(3);
        }
        let mask = [0u8; 64];
        let settings = DonutSettings::default();
        let bytes = encode_tile_dcb(&tile, &mask, &settings);
        let (status, decoded) = decode_one_block(&bytes);
        assert_eq!(status, DecodeStatus::Ok);
        assert_eq!(&decoded.unwrap().tile[..], &tile[..]);
    }

    #[test]
    fn dcb_with_fully_masked_plane_still_decodes_to_a_valid_filled_tile() {
        // the whole first plane pair is "don't care"; any filled value the
        // encoder picks is acceptable as long as it decodes back out.
        let mut tile = [0u8; 64];
        for (i, b) in tile.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(7).wrapping_add(1);
        }
        let mut mask = [0u8; 64];
        for b in mask[0..16].iter_mut() {
            *b = 0xff;
        }
        let settings = DonutSettings::default();
        let bytes = encode_tile_dcb(&tile, &mask, &settings);
        let (status, decoded) = decode_one_block(&bytes);
        assert_eq!(status, DecodeStatus::Ok);
        // bytes outside the masked region must reproduce exactly.
        assert_eq!(&decoded.unwrap().tile[16..], &tile[16..]);
    }

    #[test]
    fn dcb_one_block_with_short_trailing_unit_treats_mask_as_zero() {
        let tile = [0x42u8; 64];
        let (status, block) = encode_one_block_dcb(&tile, &DonutSettings::default());
        assert_eq!(status, EncodeStatus::Ok);
        let block = block.unwrap();
        assert_eq!(block.consumed, 64);
        let (decoded_status, decoded) = decode_one_block(&block.bytes);
        assert_eq!(decoded_status, DecodeStatus::Ok);
        assert_eq!(&decoded.unwrap().tile[..], &tile[..]);
    }

    #[test]
    fn dcb_blocks_stream_roundtrips_a_full_128_byte_unit() {
        let mut src = vec![0x11u8; 64];
        src.extend_from_slice(&[0u8; 64]);
        let (encoded, status) = encode_blocks_dcb(&src, &DonutSettings::default());
        assert_eq!(status, EncodeStatus::SrcEmpty);
        let (tiles, decode_status) = crate::donut::decode::decode_blocks(&encoded);
        assert_eq!(decode_status, DecodeStatus::SrcEmpty);
        assert_eq!(tiles.len(), 1);
        assert_eq!(&tiles[0][..], &src[..64]);
    }
}
