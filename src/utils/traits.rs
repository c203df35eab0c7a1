use bincode::{config, Decode, Encode};

use crate::error::{FsError, Result};

/// Trait for fixed-size records stored at a known offset inside a block.
///
/// Records are encoded little-endian with fixed-width integers,
/// the same way they are laid out on the device.
/// # Note
/// `SIZE` must equal the encoded length, every implementor has a test for it
pub trait OnDisk: Encode + Decode<()> {
    /// encoded length in bytes
    const SIZE: usize;

    /// serialize into the first [OnDisk::SIZE] bytes of `buf`
    fn encode_into(&self, buf: &mut [u8]) -> Result<()> {
        let buf_len = buf.len();
        let dst = buf.get_mut(..Self::SIZE).ok_or_else(|| {
            FsError::Validation(format!(
                "record needs {} bytes, only {buf_len} left in block",
                Self::SIZE
            ))
        })?;
        bincode::encode_into_slice(self, dst, config::legacy())
            .map_err(|e| FsError::Corrupted(e.to_string()))?;
        Ok(())
    }

    /// deserialize from the first [OnDisk::SIZE] bytes of `buf`
    fn decode_from(buf: &[u8]) -> Result<Self> {
        let src = buf.get(..Self::SIZE).ok_or_else(|| {
            FsError::Corrupted(format!(
                "record needs {} bytes, only {} left in block",
                Self::SIZE,
                buf.len()
            ))
        })?;
        let (object, _) = bincode::decode_from_slice(src, config::legacy())
            .map_err(|e| FsError::Corrupted(e.to_string()))?;
        Ok(object)
    }

    /// encode into slot `index` of a block holding an array of records
    fn encode_at(&self, block: &mut [u8], index: usize) -> Result<()> {
        let start = index * Self::SIZE;
        let slot = block
            .get_mut(start..)
            .ok_or_else(|| FsError::Validation(format!("slot {index} is outside the block")))?;
        self.encode_into(slot)
    }

    /// decode slot `index` of a block holding an array of records
    fn decode_at(block: &[u8], index: usize) -> Result<Self> {
        let start = index * Self::SIZE;
        let slot = block
            .get(start..)
            .ok_or_else(|| FsError::Corrupted(format!("slot {index} is outside the block")))?;
        Self::decode_from(slot)
    }
}
