//! The 256-entry digram substitution table and the per-byte usage flags an
//! encoder consults while building one.

use byteorder::{BigEndian, ByteOrder};
use bitflags::bitflags;

bitflags! {
    /// Per-byte usage state consulted while greedily assigning substitution
    /// symbols. `UNUSED` bytes are eligible to become a digram's
    /// replacement; `USED` and `FORBIDDEN` are not.
    pub struct CharFlags: u8 {
        const UNUSED    = 0b00;
        const USED      = 0b01;
        const FORBIDDEN = 0b10;
    }
}

/// A full byte -> (left, right) substitution table. Entry `c` is "literal"
/// (stands for itself, not a digram) exactly when `left == c`.
#[derive(Debug, Clone)]
pub struct DigramTable {
    pairs: [(u8, u8); 256],
}

impl Default for DigramTable {
    fn default() -> Self {
        let mut pairs = [(0u8, 0u8); 256];
        for (i, pair) in pairs.iter_mut().enumerate() {
            *pair = (i as u8, 0);
        }
        DigramTable { pairs }
    }
}

impl DigramTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, c: u8) -> (u8, u8) {
        self.pairs[c as usize]
    }

    pub fn set(&mut self, c: u8, pair: (u8, u8)) {
        self.pairs[c as usize] = pair;
    }

    pub fn is_literal(&self, c: u8) -> bool {
        self.pairs[c as usize].0 == c
    }

    /// Serialize the entries for `range` (inclusive) as big-endian `u16`s,
    /// `(left << 8) | right` per slot, matching the original tool's on-disk
    /// table layout.
    pub fn to_bytes_for_range(&self, range: (u8, u8)) -> Vec<u8> {
        let (lo, hi) = range;
        let mut out = Vec::with_capacity(2 * (hi as usize + 1 - lo as usize));
        let mut buf = [0u8; 2];
        for c in lo..=hi {
            let (l, r) = self.pairs[c as usize];
            BigEndian::write_u16(&mut buf, u16::from_be_bytes([l, r]));
            out.extend_from_slice(&buf);
            if c == u8::MAX {
                break;
            }
        }
        out
    }

    /// Inverse of [`to_bytes_for_range`]: load entries for `range` from
    /// `bytes`, leaving every other entry at its default identity mapping.
    pub fn from_bytes_for_range(bytes: &[u8], range: (u8, u8)) -> Self {
        let mut table = Self::default();
        let (lo, hi) = range;
        let mut idx = 0usize;
        let mut c = lo;
        loop {
            let word = BigEndian::read_u16(&bytes[idx..idx + 2]);
            let [l, r] = word.to_be_bytes();
            table.pairs[c as usize] = (l, r);
            idx += 2;
            if c == hi {
                break;
            }
            c += 1;
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_all_literal() {
        let table = DigramTable::new();
        for c in 0..=255u8 {
            assert!(table.is_literal(c));
            if c == 255 {
                break;
            }
        }
    }

    #[test]
    fn set_digram_is_no_longer_literal() {
        let mut table = DigramTable::new();
        table.set(5, (1, 2));
        assert!(!table.is_literal(5));
        assert_eq!(table.get(5), (1, 2));
    }

    #[test]
    fn byte_roundtrip_over_full_range() {
        let mut table = DigramTable::new();
        table.set(10, (65, 66));
        table.set(255, (1, 2));
        let bytes = table.to_bytes_for_range((0, 255));
        let restored = DigramTable::from_bytes_for_range(&bytes, (0, 255));
        assert_eq!(restored.get(10), (65, 66));
        assert_eq!(restored.get(255), (1, 2));
        assert_eq!(restored.get(0), (0, 0));
    }

    #[test]
    fn byte_roundtrip_over_partial_range() {
        let mut table = DigramTable::new();
        table.set(40, (9, 9));
        let bytes = table.to_bytes_for_range((30, 50));
        assert_eq!(bytes.len(), 2 * 21);
        let restored = DigramTable::from_bytes_for_range(&bytes, (30, 50));
        assert_eq!(restored.get(40), (9, 9));
        assert!(restored.is_literal(20)); // outside range, stays default
    }
}
