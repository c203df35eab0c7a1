//! first-fit data block allocation over the superblock bitmap
use log::{debug, warn};

use super::{BlockDevice, Filesystem, SuperBlock, BLOCK_SIZE, FIRST_DATA_BLOCK, MAX_OBJECTS};
use crate::error::{FsError, Result};

impl SuperBlock {
    /// lowest free data block, reserved blocks are never considered
    pub fn first_free_block(&self) -> Option<u64> {
        self.free_blocks_bits()[FIRST_DATA_BLOCK as usize..MAX_OBJECTS as usize]
            .first_one()
            .map(|p| p as u64 + FIRST_DATA_BLOCK)
    }

    /// calculate the number of free data blocks
    pub fn free_block_count(&self) -> u64 {
        self.free_blocks_bits()[FIRST_DATA_BLOCK as usize..].count_ones() as u64
    }

    /// check if block `index` is free
    pub fn is_block_free(&self, index: u64) -> bool {
        self.free_blocks_bits()
            .get(index as usize)
            .as_deref()
            .copied()
            .unwrap_or(false)
    }
}

impl<D: BlockDevice> Filesystem<D> {
    /// reserve the lowest free data block, persist the bitmap and zero the block
    ///
    /// on failure the in-memory superblock keeps its previous bitmap
    pub(crate) fn allocate_block(&mut self) -> Result<u64> {
        let Some(index) = self.superblock.first_free_block() else {
            warn!("no more free blocks available");
            return Err(FsError::NoSpace("block bitmap exhausted"));
        };
        let mut updated = self.superblock;
        updated.free_blocks_mut().set(index as usize, false);
        updated.persist(&mut self.device)?;
        self.superblock = updated;
        self.write_block(index, &[0u8; BLOCK_SIZE])?;
        debug!("allocated block {index}");
        Ok(index)
    }
}
