//! Bit packing and rank helpers for the blob bitmaps.
//!
//! Bitmaps are packed LSB-first: bit `i` lives in byte `i / 8` at position
//! `i % 8`. Packed bitmaps are zero-padded to a multiple of 32 bits so every
//! section of a row block stays 4-byte aligned.

/// Alignment in bytes applied to every packed section.
pub const SECTION_ALIGN: usize = 4;

/// Round `n` up to the next multiple of `align`.
pub fn align_up(n: usize, align: usize) -> usize {
    n.div_ceil(align) * align
}

/// Byte length of a bitmap holding `bits` bits after 32-bit padding.
pub fn packed_len(bits: usize) -> usize {
    align_up(bits.div_ceil(8), SECTION_ALIGN)
}

/// Pack `bits` LSB-first, zero-padded to a multiple of 32 bits.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; packed_len(bits.len())];
    for (i, &b) in bits.iter().enumerate() {
        if b {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

/// Read bit `pos`. Positions past the end read as zero.
pub fn get_bit(data: &[u8], pos: usize) -> bool {
    match data.get(pos / 8) {
        Some(byte) => (byte >> (pos % 8)) & 1 != 0,
        None => false,
    }
}

/// Number of set bits strictly before `pos`.
pub fn rank(data: &[u8], pos: usize) -> usize {
    let full = (pos / 8).min(data.len());
    let mut count: usize = data[..full].iter().map(|b| b.count_ones() as usize).sum();
    let rem = pos % 8;
    if rem != 0 {
        if let Some(byte) = data.get(pos / 8) {
            count += (byte & ((1u8 << rem) - 1)).count_ones() as usize;
        }
    }
    count
}

/// Total number of set bits.
pub fn popcount(data: &[u8]) -> usize {
    data.iter().map(|b| b.count_ones() as usize).sum()
}

/// True if any bit at or after `pos` is set.
pub fn any_set_from(data: &[u8], pos: usize) -> bool {
    popcount(data) != rank(data, pos)
}

/// Cursor over a little-endian byte slice used while validating blobs.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take the next `n` bytes, or `None` if the slice is too short.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let data: &'a [u8] = self.data;
        let end = self.pos.checked_add(n)?;
        let out = data.get(self.pos..end)?;
        self.pos = end;
        Some(out)
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_le_bytes([b[0], b[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_is_lsb_first_and_padded() {
        let packed = pack_bits(&[true, false, false, true]);
        assert_eq!(packed, vec![0x09, 0, 0, 0]);
        assert_eq!(pack_bits(&[]), Vec::<u8>::new());
        assert_eq!(pack_bits(&[false; 33]).len(), 8);
    }

    #[test]
    fn rank_counts_bits_before_position() {
        let data = [0b1010_1101u8, 0b0000_0011];
        assert_eq!(rank(&data, 0), 0);
        assert_eq!(rank(&data, 1), 1);
        assert_eq!(rank(&data, 3), 2);
        assert_eq!(rank(&data, 8), 5);
        assert_eq!(rank(&data, 9), 6);
        assert_eq!(rank(&data, 16), 7);
        assert_eq!(rank(&data, 100), 7);
    }

    #[test]
    fn get_bit_matches_packing() {
        let bits: Vec<bool> = (0..40).map(|i| i % 3 == 0).collect();
        let packed = pack_bits(&bits);
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(get_bit(&packed, i), b);
        }
        assert!(!get_bit(&packed, 1000));
    }

    #[test]
    fn any_set_from_detects_tail_bits() {
        let data = [0b0000_0100u8, 0];
        assert!(any_set_from(&data, 2));
        assert!(!any_set_from(&data, 3));
    }

    #[test]
    fn reader_stops_at_end() {
        let data = [1u8, 0, 2];
        let mut r = ByteReader::from_slice(&data);
        assert_eq!(r.read_u16(), Some(1));
        assert_eq!(r.remaining(), 1);
        assert_eq!(r.read_u16(), None);
        assert_eq!(r.position(), 2);
    }
}
