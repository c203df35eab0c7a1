//! our single-block-per-object filesystem
//!
//! Layout on the device:
//! - block 0: superblock
//! - block 1: inode table
//! - block 2: root directory entries
//! - block 3..: one data block per file or directory
pub mod device;
pub mod directory;
mod file_data;
pub mod filekind;
mod free_blocks;
pub mod fs_layout;
pub mod inode;
mod inode_table;
pub mod superblock;
pub use device::*;
pub use directory::*;
pub use filekind::*;
pub use fs_layout::*;
pub use inode::*;
pub use superblock::*;

use crate::utils::fs_size_calculator;

pub const FS_MAGIC: u64 = 0x2023_0101;
pub const FS_VERSION: u64 = 1;
/// the only block size this filesystem supports
pub const BLOCK_SIZE: usize = 4096;
/// upper bound for blocks and inode table slots, one bit each in the bitmap
pub const MAX_OBJECTS: u64 = 64;

pub const SUPERBLOCK_BLOCK: u64 = 0;
pub const INODE_TABLE_BLOCK: u64 = 1;
pub const ROOT_DIR_BLOCK: u64 = 2;
/// blocks below this index are never handed out by the allocator
pub const FIRST_DATA_BLOCK: u64 = 3;

pub const ROOT_INODE: u64 = 1;
/// inode number given to the first object created after formatting
pub const FIRST_USER_INODE: u64 = 10;

pub const FILENAME_MAX_LEN: usize = 255;
pub const DIR_ENTRIES_PER_BLOCK: usize = fs_size_calculator::entries_per_block(BLOCK_SIZE);
pub const INODE_TABLE_CAPACITY: u64 = fs_size_calculator::inode_table_capacity(BLOCK_SIZE);

pub const S_IFMT: u32 = libc::S_IFMT as u32;
pub const S_IFREG: u32 = libc::S_IFREG as u32;
pub const S_IFDIR: u32 = libc::S_IFDIR as u32;
