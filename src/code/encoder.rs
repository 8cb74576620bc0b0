//! Systematic BCH encoding of one PUF sub-block
//!
//! The 15 parity bits of the sub-block's first 16 bits are masked with the
//! sub-block's last 16 bits to form helper data. The key segment is the raw
//! first 16 bits; the code only lets a later reading recover them.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::bits;
use super::constants::{
    DIMENSION, GENERATOR, HELPER_BYTES_PER_BLOCK, LENGTH, REDUNDANCY, RESPONSE_BYTES_PER_BLOCK,
    SEGMENT_BYTES,
};

/// Helper bytes and key segment produced from one sub-block
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncodedBlock {
    /// Masked parity bits, padding bit cleared
    pub helper: [u8; HELPER_BYTES_PER_BLOCK],
    /// Raw key bits taken from the response
    pub segment: [u8; SEGMENT_BYTES],
}

impl std::fmt::Debug for EncodedBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedBlock")
            .field("helper", &self.helper)
            .field("segment", &"<redacted>")
            .finish()
    }
}

/// Shift-register encoder for the (31,16) code
#[derive(Debug, Clone)]
pub struct BlockEncoder {
    generator: [u8; REDUNDANCY + 1],
}

impl Default for BlockEncoder {
    fn default() -> Self {
        Self::new(GENERATOR)
    }
}

impl BlockEncoder {
    /// Encoder driven by the given generator coefficients
    pub fn new(generator: [u8; REDUNDANCY + 1]) -> Self {
        Self { generator }
    }

    /// Remainder of data(x) * x^(n-k) modulo g(x)
    ///
    /// `data[i]` is the coefficient of x^i of the information polynomial; only
    /// the first k symbols are read.
    pub fn parity(&self, data: &[u8; LENGTH]) -> [u8; REDUNDANCY] {
        let g = &self.generator;
        let mut bb = [0u8; REDUNDANCY];

        for i in (0..DIMENSION).rev() {
            let feedback = data[i] ^ bb[REDUNDANCY - 1];
            for j in (1..REDUNDANCY).rev() {
                bb[j] = if feedback != 0 && g[j] != 0 {
                    bb[j - 1] ^ feedback
                } else {
                    bb[j - 1]
                };
            }
            bb[0] = u8::from(feedback != 0 && g[0] != 0);
        }

        bb
    }

    /// Encode a 4-byte sub-block of a packed response
    pub fn encode(&self, response: &[u8; RESPONSE_BYTES_PER_BLOCK]) -> EncodedBlock {
        let mut data: [u8; LENGTH] = bits::unpack(response);
        let mut parity = self.parity(&data);

        let mut helper = bits::pack_parity(&parity);
        helper[0] ^= response[2];
        helper[1] ^= response[3];
        helper[1] &= !0x01;

        data.zeroize();
        parity.zeroize();

        EncodedBlock {
            helper,
            segment: [response[0], response[1]],
        }
    }
}
