//! the inode table: an append-only array of [InodeRecord]s in one block
use log::debug;

use super::{BlockDevice, Filesystem, InodeRecord, INODE_TABLE_BLOCK, INODE_TABLE_CAPACITY};
use crate::{
    error::{FsError, Result},
    utils::traits::OnDisk,
};

// slot and record with `inode_number` among the first `count` slots
fn find_slot(
    table: &[u8],
    count: u64,
    inode_number: u64,
) -> Result<Option<(usize, InodeRecord)>> {
    for slot in 0..count as usize {
        let inode = InodeRecord::decode_at(table, slot)?;
        if inode.inode_number == inode_number {
            inode.validate()?;
            return Ok(Some((slot, inode)));
        }
    }
    Ok(None)
}

/// [InodeRecord] operations
impl<D: BlockDevice> Filesystem<D> {
    /// linear search of the used part of the table
    pub fn find_inode(&self, inode_number: u64) -> Result<Option<InodeRecord>> {
        let table = self.read_block(INODE_TABLE_BLOCK)?;
        let found = find_slot(&table, self.superblock.inode_count, inode_number)?;
        Ok(found.map(|(_, inode)| inode))
    }

    /// like [Filesystem::find_inode], but a miss is an error
    pub fn get_inode(&self, inode_number: u64) -> Result<InodeRecord> {
        self.find_inode(inode_number)?
            .ok_or_else(|| FsError::NotFound(format!("inode {inode_number}")))
    }

    /// every record in table order
    pub fn inodes(&self) -> Result<Vec<InodeRecord>> {
        let table = self.read_block(INODE_TABLE_BLOCK)?;
        (0..self.superblock.inode_count as usize)
            .map(|slot| {
                let inode = InodeRecord::decode_at(&table, slot)?;
                inode.validate()?;
                Ok(inode)
            })
            .collect()
    }

    /// overwrite the record with the same inode number in place
    pub(crate) fn save_inode(&mut self, inode: &InodeRecord) -> Result<()> {
        let mut table = self.read_block(INODE_TABLE_BLOCK)?;
        let Some((slot, _)) =
            find_slot(&table, self.superblock.inode_count, inode.inode_number)?
        else {
            return Err(FsError::NotFound(format!(
                "inode {} is not in the table",
                inode.inode_number
            )));
        };
        inode.encode_at(&mut table, slot)?;
        self.write_block(INODE_TABLE_BLOCK, &table)?;
        debug!("saved inode {} in slot {slot}", inode.inode_number);
        Ok(())
    }

    /// write `inode` to the next free slot and bump the inode count
    pub(crate) fn append_inode(&mut self, inode: &InodeRecord) -> Result<()> {
        let count = self.superblock.inode_count;
        if count >= INODE_TABLE_CAPACITY {
            return Err(FsError::NoSpace("inode table is full"));
        }
        let mut table = self.read_block(INODE_TABLE_BLOCK)?;
        if find_slot(&table, count, inode.inode_number)?.is_some() {
            return Err(FsError::Validation(format!(
                "inode {} already exists",
                inode.inode_number
            )));
        }
        inode.encode_at(&mut table, count as usize)?;
        self.write_block(INODE_TABLE_BLOCK, &table)?;

        let mut updated = self.superblock;
        updated.inode_count += 1;
        updated.persist(&mut self.device)?;
        self.superblock = updated;
        debug!("appended inode {} in slot {count}", inode.inode_number);
        Ok(())
    }
}
