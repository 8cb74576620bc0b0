//! Helper data, key material and the reports returned by the assembler

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::code::constants::{BLOCKS, HELPER_BYTES_PER_BLOCK, HELPER_LEN, KEY_LEN};
use crate::code::BlockStatus;
use crate::FuzzyError;

/// Public helper data: 2 bytes per sub-block, sub-block order 0..7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HelperData([u8; HELPER_LEN]);

impl HelperData {
    /// Wrap stored helper bytes
    pub const fn from_bytes(bytes: [u8; HELPER_LEN]) -> Self {
        Self(bytes)
    }

    /// Flat byte layout as persisted
    pub fn as_bytes(&self) -> &[u8; HELPER_LEN] {
        &self.0
    }

    /// Helper bytes of one sub-block, `None` past the last block
    pub fn block(&self, index: usize) -> Option<[u8; HELPER_BYTES_PER_BLOCK]> {
        self.blocks().nth(index)
    }

    /// Helper bytes of every sub-block in order
    pub fn blocks(&self) -> impl Iterator<Item = [u8; HELPER_BYTES_PER_BLOCK]> + '_ {
        self.0
            .chunks_exact(HELPER_BYTES_PER_BLOCK)
            .map(|pair| [pair[0], pair[1]])
    }
}

impl TryFrom<&[u8]> for HelperData {
    type Error = FuzzyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; HELPER_LEN] =
            bytes
                .try_into()
                .map_err(|_| FuzzyError::MalformedHelperData {
                    expected: HELPER_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl fmt::Display for HelperData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// 128-bit key; erased from memory on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Short BLAKE3 digest, safe to log in place of the key
    pub fn fingerprint(&self) -> String {
        let digest = blake3::hash(&self.0);
        digest.to_hex()[..16].to_string()
    }

    /// Lowercase hex of the key bytes
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key(<redacted>, fingerprint={})", self.fingerprint())
    }
}

/// Result of enrolling one PUF response
#[derive(Debug, Clone)]
pub struct Enrollment {
    helper: HelperData,
    key: Key,
}

impl Enrollment {
    pub(crate) fn new(helper: HelperData, key: Key) -> Self {
        Self { helper, key }
    }

    /// Helper data to persist
    pub fn helper(&self) -> &HelperData {
        &self.helper
    }

    /// Enrolled key
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Split into parts, moving the key out
    pub fn into_parts(self) -> (HelperData, Key) {
        (self.helper, self.key)
    }
}

/// Key rebuilt from a fresh reading, with per-block verification status
#[derive(Debug, Clone)]
pub struct Reconstruction {
    key: Key,
    statuses: [BlockStatus; BLOCKS],
}

impl Reconstruction {
    pub(crate) fn new(key: Key, statuses: [BlockStatus; BLOCKS]) -> Self {
        Self { key, statuses }
    }

    /// Assembled key; unverified if any block is uncorrectable
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Status of each sub-block in order
    pub fn statuses(&self) -> &[BlockStatus; BLOCKS] {
        &self.statuses
    }

    /// Sum of corrected bit errors over verified blocks
    pub fn total_errors(&self) -> usize {
        self.statuses
            .iter()
            .filter_map(|status| status.corrected_errors())
            .sum()
    }

    /// Indices of blocks whose segment could not be verified
    pub fn uncorrectable_blocks(&self) -> impl Iterator<Item = usize> + '_ {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, status)| **status == BlockStatus::Uncorrectable)
            .map(|(index, _)| index)
    }

    /// True when every block was clean or corrected
    pub fn is_verified(&self) -> bool {
        self.uncorrectable_blocks().next().is_none()
    }

    /// Key, or the first uncorrectable block
    pub fn into_verified_key(self) -> Result<Key, FuzzyError> {
        let first = self.uncorrectable_blocks().next();
        match first {
            Some(block) => Err(FuzzyError::UncorrectableBlock { block }),
            None => Ok(self.key),
        }
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{byte:02X}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_length_is_checked() {
        let err = HelperData::try_from(&[0u8; 15][..]).unwrap_err();
        assert!(matches!(
            err,
            FuzzyError::MalformedHelperData { expected: 16, actual: 15 }
        ));
        assert!(HelperData::try_from(&[0u8; 17][..]).is_err());
        assert!(HelperData::try_from(&[0u8; 16][..]).is_ok());
    }

    #[test]
    fn test_helper_display_and_blocks() {
        let helper = HelperData::from_bytes([
            0x3A, 0x32, 0x55, 0xEE, 0xBB, 0x96, 0xB2, 0xF2, 0x91, 0xD0, 0x14, 0x32, 0xCD, 0xC2,
            0x2E, 0xF8,
        ]);
        assert_eq!(helper.block(1), Some([0x55, 0xEE]));
        assert_eq!(helper.block(7), Some([0x2E, 0xF8]));
        assert_eq!(helper.block(8), None);
        assert_eq!(helper.blocks().count(), BLOCKS);
        assert!(helper.to_string().starts_with("3A 32 55"));
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = Key::from_bytes([0xAB; KEY_LEN]);
        let rendered = format!("{key:?}");
        assert!(!rendered.contains(&key.to_hex()));
        assert!(rendered.contains("redacted"));
        assert_eq!(key.fingerprint().len(), 16);
    }

    #[test]
    fn test_verified_key_policy() {
        let mut statuses = [BlockStatus::Clean; BLOCKS];
        statuses[2] = BlockStatus::Corrected(3);
        let ok = Reconstruction::new(Key::from_bytes([1; KEY_LEN]), statuses);
        assert_eq!(ok.total_errors(), 3);
        assert!(ok.is_verified());
        assert!(ok.into_verified_key().is_ok());

        statuses[5] = BlockStatus::Uncorrectable;
        let bad = Reconstruction::new(Key::from_bytes([1; KEY_LEN]), statuses);
        assert_eq!(bad.uncorrectable_blocks().collect::<Vec<_>>(), vec![5]);
        assert!(matches!(
            bad.into_verified_key(),
            Err(FuzzyError::UncorrectableBlock { block: 5 })
        ));
    }
}
