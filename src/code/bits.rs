//! Conversions between packed bytes and one-symbol-per-bit codeword buffers
//!
//! All packing is MSB-first: bit 7 of byte 0 is symbol 0.

use bitvec::prelude::*;

use super::constants::{DIMENSION, HELPER_BYTES_PER_BLOCK, REDUNDANCY, SEGMENT_BYTES};

/// Spread the first `N` bits of `bytes` into one symbol (0/1) per slot
pub fn unpack<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut symbols = [0u8; N];
    for (slot, bit) in symbols
        .iter_mut()
        .zip(bytes.view_bits::<Msb0>().iter().by_vals())
    {
        *slot = u8::from(bit);
    }
    symbols
}

/// Pack symbols into bytes; any nonzero symbol is a 1 bit
pub fn pack<const B: usize>(symbols: &[u8]) -> [u8; B] {
    let mut bytes = [0u8; B];
    let bits = bytes.view_bits_mut::<Msb0>();
    for (i, &symbol) in symbols.iter().take(B * 8).enumerate() {
        bits.set(i, symbol != 0);
    }
    bytes
}

/// Parity bits to helper bytes; the final padding bit stays zero
pub fn pack_parity(parity: &[u8; REDUNDANCY]) -> [u8; HELPER_BYTES_PER_BLOCK] {
    pack(parity)
}

/// Helper bytes to parity bits, dropping the padding bit
pub fn unpack_helper(helper: [u8; HELPER_BYTES_PER_BLOCK]) -> [u8; REDUNDANCY] {
    unpack(&helper)
}

/// Information bits to a key segment
pub fn pack_segment(information: &[u8; DIMENSION]) -> [u8; SEGMENT_BYTES] {
    pack(information)
}

/// One byte per bit, MSB-first: the enrollment-record layout
pub fn expand_bits(packed: &[u8]) -> Vec<u8> {
    packed
        .view_bits::<Msb0>()
        .iter()
        .by_vals()
        .map(u8::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_is_msb_first() {
        let symbols: [u8; 10] = unpack(&[0b1010_0101, 0b1100_0000]);
        assert_eq!(symbols, [1, 0, 1, 0, 0, 1, 0, 1, 1, 1]);
    }

    #[test]
    fn test_parity_padding_bit_is_zero() {
        let helper = pack_parity(&[1; REDUNDANCY]);
        assert_eq!(helper, [0xFF, 0xFE]);
        assert_eq!(unpack_helper([0xFF, 0xFF]), [1; REDUNDANCY]);
    }

    #[test]
    fn test_expand_bits_layout() {
        let expanded = expand_bits(&[0x80, 0x01]);
        assert_eq!(expanded.len(), 16);
        assert_eq!(expanded[0], 1);
        assert_eq!(expanded[15], 1);
        assert_eq!(expanded.iter().filter(|&&b| b == 1).count(), 2);
    }
}
