//! This module contains functions to calculate the size of different fs components

use crate::{
    fs::{DirectoryEntry, InodeRecord, BLOCK_SIZE, FIRST_DATA_BLOCK, MAX_OBJECTS},
    utils::traits::OnDisk,
};

/// calculate how many directory entries fit in one data block
/// # Example
/// ```
/// use sbfs::utils::fs_size_calculator::entries_per_block;
/// assert_eq!(entries_per_block(4096), 15);
/// ```
pub const fn entries_per_block(block_size: usize) -> usize {
    block_size / DirectoryEntry::SIZE
}

/// calculate how many inode records the inode table holds
///
/// bounded both by the block and by the bitmap width
/// # Example
/// ```
/// use sbfs::utils::fs_size_calculator::inode_table_capacity;
/// assert_eq!(inode_table_capacity(4096), 64);
/// assert_eq!(inode_table_capacity(1024), 28);
/// ```
pub const fn inode_table_capacity(block_size: usize) -> u64 {
    let fits = (block_size / InodeRecord::SIZE) as u64;
    if fits < MAX_OBJECTS {
        fits
    } else {
        MAX_OBJECTS
    }
}

/// calculate how many blocks an image of `image_size` bytes gets
///
/// partial blocks are dropped and the count is capped at [MAX_OBJECTS]
/// # Example
/// ```
/// use sbfs::utils::fs_size_calculator::block_count_for_size;
/// assert_eq!(block_count_for_size(10 * 4096 + 100), 10);
/// assert_eq!(block_count_for_size(1 << 30), 64);
/// ```
pub const fn block_count_for_size(image_size: u64) -> u64 {
    let blocks = image_size / BLOCK_SIZE as u64;
    if blocks < MAX_OBJECTS {
        blocks
    } else {
        MAX_OBJECTS
    }
}

/// the smallest image that still has one block for user data
pub const fn min_image_size() -> u64 {
    (FIRST_DATA_BLOCK + 1) * BLOCK_SIZE as u64
}

/// byte length of an image with `block_count` blocks
pub const fn image_size(block_count: u64) -> u64 {
    block_count * BLOCK_SIZE as u64
}
