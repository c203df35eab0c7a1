//! create our filesystem
use std::{fs::OpenOptions, path::Path};

use anyhow::anyhow;
use byte_unit::{Byte, ByteUnit};
use log::info;

use crate::{
    error::{FsError, Result},
    fs::{
        BlockDevice, ImageFile, InodeRecord, SuperBlock, BLOCK_SIZE, FIRST_DATA_BLOCK,
        INODE_TABLE_BLOCK, ROOT_DIR_BLOCK, ROOT_INODE, S_IFDIR,
    },
    utils::{fs_size_calculator, traits::OnDisk},
};

/// write an empty filesystem holding only the root directory to `device`
///
/// the superblock goes last, a device interrupted mid-format does not mount
pub fn format<D: BlockDevice>(device: &mut D) -> Result<SuperBlock> {
    let block_count = device.block_count();
    if block_count <= FIRST_DATA_BLOCK {
        return Err(FsError::Validation(format!(
            "a device of {block_count} blocks leaves no room for data"
        )));
    }

    let zeros = vec![0u8; BLOCK_SIZE];
    device.write_block(ROOT_DIR_BLOCK, &zeros)?;

    let root = InodeRecord::new(ROOT_INODE, S_IFDIR | 0o755, ROOT_DIR_BLOCK);
    let mut table = zeros;
    root.encode_at(&mut table, 0)?;
    device.write_block(INODE_TABLE_BLOCK, &table)?;

    let superblock = SuperBlock::new(block_count);
    superblock.persist(device)?;
    info!(
        "formatted {block_count} blocks, {} free for data",
        superblock.free_block_count()
    );
    Ok(superblock)
}

/// create a new filesystem, given the path of the image file and its size
/// # Params
/// - `image_file_path`: the path of the image file, must not exist yet
/// - `file_size`: the size of the image file, rounded down to whole blocks
///   and capped at what the block bitmap can address
///
/// # Return
/// an [anyhow::Result] type to indicate whether the operation is successful
pub fn mkfs<P>(image_file_path: P, file_size: u64) -> anyhow::Result<()>
where
    P: AsRef<Path>,
{
    let space_needed = fs_size_calculator::min_image_size();
    if file_size < space_needed {
        return Err(anyhow!(
            "File size must be at least {} for block size {}",
            Byte::from_bytes(space_needed as _).get_appropriate_unit(true),
            Byte::from_bytes(BLOCK_SIZE as _).get_adjusted_unit(ByteUnit::B)
        ));
    }
    let block_count = fs_size_calculator::block_count_for_size(file_size);
    let file_len = fs_size_calculator::image_size(block_count);
    if file_len != file_size {
        info!("shrinking image from {file_size} to {file_len} bytes ({block_count} blocks)");
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(image_file_path.as_ref())?;
    // all regions are zero after `set_len`
    file.set_len(file_len)?;
    drop(file);

    let mut image = ImageFile::open(image_file_path)?;
    format(&mut image)?;
    Ok(())
}
