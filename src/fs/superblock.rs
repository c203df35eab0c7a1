use bincode::{Decode, Encode};
use bitvec::prelude::*;
use log::{debug, warn};

use super::{
    BlockDevice, BLOCK_SIZE, FIRST_DATA_BLOCK, FS_MAGIC, FS_VERSION, INODE_TABLE_CAPACITY,
    MAX_OBJECTS, SUPERBLOCK_BLOCK,
};
use crate::{
    error::{FsError, Result},
    utils::traits::OnDisk,
};

/// The superblock of this filesystem, stored in block 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode)]
pub struct SuperBlock {
    /// magic number
    pub magic: u64,
    pub version: u64,
    /// data block size, fixed to [BLOCK_SIZE]
    pub block_size: u64,
    /// number of used inode table slots, the next record goes to this slot
    pub inode_count: u64,
    /// bit `i` set means block `i` is free
    pub free_blocks: u64,
}

impl OnDisk for SuperBlock {
    const SIZE: usize = 5 * 8;
}

impl SuperBlock {
    /// the superblock of a freshly formatted device with `block_count` blocks,
    /// holding only the root directory
    pub fn new(block_count: u64) -> Self {
        let mut superblock = Self {
            magic: FS_MAGIC,
            version: FS_VERSION,
            block_size: BLOCK_SIZE as u64,
            inode_count: 1,
            free_blocks: 0,
        };
        let last = block_count.min(MAX_OBJECTS) as usize;
        if last > FIRST_DATA_BLOCK as usize {
            superblock.free_blocks_mut()[FIRST_DATA_BLOCK as usize..last].fill(true);
        }
        superblock
    }

    /// read and validate the superblock, the device is never written
    pub fn load<D: BlockDevice>(device: &D) -> Result<Self> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        device.read_block(SUPERBLOCK_BLOCK, &mut buf)?;
        let superblock = SuperBlock::decode_from(&buf)?;
        superblock.validate(device.block_count())?;
        debug!("loaded superblock: {superblock:?}");
        Ok(superblock)
    }

    /// write the whole superblock to block 0 and sync the device
    pub fn persist<D: BlockDevice>(&self, device: &mut D) -> Result<()> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        self.encode_into(&mut buf)?;
        device.write_block(SUPERBLOCK_BLOCK, &buf)?;
        device.sync()
    }

    /// check that this superblock describes a filesystem on a device of `block_count` blocks
    pub fn validate(&self, block_count: u64) -> Result<()> {
        if self.magic != FS_MAGIC {
            warn!("wrong magic number: {:#x}", self.magic);
            return Err(FsError::Format(format!(
                "magic number {:#x}, expected {FS_MAGIC:#x}",
                self.magic
            )));
        }
        if self.block_size != BLOCK_SIZE as u64 {
            warn!("wrong block size: {}", self.block_size);
            return Err(FsError::Format(format!(
                "block size {}, expected {BLOCK_SIZE}",
                self.block_size
            )));
        }
        if self.inode_count == 0 || self.inode_count > INODE_TABLE_CAPACITY {
            return Err(FsError::Format(format!(
                "inode count {} outside 1..={INODE_TABLE_CAPACITY}",
                self.inode_count
            )));
        }
        let bits = self.free_blocks_bits();
        if bits[..FIRST_DATA_BLOCK as usize].any() {
            return Err(FsError::Format("reserved blocks are marked free".into()));
        }
        let device_end = block_count.min(MAX_OBJECTS) as usize;
        if bits[device_end..].any() {
            return Err(FsError::Format(format!(
                "blocks past the end of a {block_count} block device are marked free"
            )));
        }
        Ok(())
    }

    pub(crate) fn free_blocks_bits(&self) -> &BitSlice<u64, Lsb0> {
        self.free_blocks.view_bits::<Lsb0>()
    }

    pub(crate) fn free_blocks_mut(&mut self) -> &mut BitSlice<u64, Lsb0> {
        self.free_blocks.view_bits_mut::<Lsb0>()
    }
}
