use std::{
    ffi::{OsStr, OsString},
    os::unix::prelude::{OsStrExt, OsStringExt},
};

use bincode::{Decode, Encode};
use log::debug;

use super::{BlockDevice, Filesystem, InodeRecord, DIR_ENTRIES_PER_BLOCK, FILENAME_MAX_LEN};
use crate::{
    error::{FsError, Result},
    utils::traits::OnDisk,
};

/// one (name, inode number) pair as stored in a directory's data block
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct DirectoryEntry {
    /// NUL padded
    pub filename: [u8; FILENAME_MAX_LEN],
    pub inode_number: u64,
}

impl OnDisk for DirectoryEntry {
    const SIZE: usize = FILENAME_MAX_LEN + 8;
}

impl DirectoryEntry {
    pub fn new(name: &OsStr, inode_number: u64) -> Result<Self> {
        let name = validate_name(name)?;
        let mut filename = [0u8; FILENAME_MAX_LEN];
        filename[..name.len()].copy_from_slice(name);
        Ok(Self {
            filename,
            inode_number,
        })
    }

    /// the stored name without padding
    pub fn name(&self) -> &[u8] {
        let len = self
            .filename
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(FILENAME_MAX_LEN);
        &self.filename[..len]
    }
}

/// a directory listing item handed out to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: OsString,
    pub inode_number: u64,
}

impl From<DirectoryEntry> for DirEntry {
    fn from(entry: DirectoryEntry) -> Self {
        DirEntry {
            name: OsString::from_vec(entry.name().to_vec()),
            inode_number: entry.inode_number,
        }
    }
}

/// names are 1..=255 bytes without `/` or NUL
pub fn validate_name(name: &OsStr) -> Result<&[u8]> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > FILENAME_MAX_LEN {
        return Err(FsError::Validation(format!(
            "file name must be 1 to {FILENAME_MAX_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    if bytes.iter().any(|b| *b == b'/' || *b == 0) {
        return Err(FsError::Validation(format!(
            "file name {name:?} contains '/' or NUL"
        )));
    }
    Ok(bytes)
}

pub(crate) fn ensure_dir(inode: &InodeRecord) -> Result<()> {
    if inode.is_dir() {
        Ok(())
    } else {
        Err(FsError::Validation(format!(
            "inode {} is not a directory",
            inode.inode_number
        )))
    }
}

/// directory entry operations
impl<D: BlockDevice> Filesystem<D> {
    /// append `name -> child` to `parent` and save the parent's child count
    ///
    /// `parent` is updated in place once everything is on disk
    pub(crate) fn add_entry(
        &mut self,
        parent: &mut InodeRecord,
        name: &OsStr,
        child: u64,
    ) -> Result<()> {
        ensure_dir(parent)?;
        if parent.child_count >= DIR_ENTRIES_PER_BLOCK as u64 {
            return Err(FsError::NoSpace("directory block is full"));
        }
        let entry = DirectoryEntry::new(name, child)?;

        let mut block = self.read_block(parent.data_block)?;
        entry.encode_at(&mut block, parent.child_count as usize)?;
        self.write_block(parent.data_block, &block)?;

        let mut updated = *parent;
        updated.child_count += 1;
        self.save_inode(&updated)?;
        *parent = updated;
        debug!(
            "added entry {name:?} -> {child} to directory {}",
            parent.inode_number
        );
        Ok(())
    }

    /// first entry of `parent` named exactly `name`
    pub(crate) fn lookup_entry(&self, parent: &InodeRecord, name: &OsStr) -> Result<Option<u64>> {
        ensure_dir(parent)?;
        let block = self.read_block(parent.data_block)?;
        for index in 0..parent.child_count as usize {
            let entry = DirectoryEntry::decode_at(&block, index)?;
            if entry.name() == name.as_bytes() {
                return Ok(Some(entry.inode_number));
            }
        }
        Ok(None)
    }

    /// the `child_count` entries of `parent` in insertion order
    pub(crate) fn dir_entries(&self, parent: &InodeRecord) -> Result<Vec<DirEntry>> {
        ensure_dir(parent)?;
        let block = self.read_block(parent.data_block)?;
        (0..parent.child_count as usize)
            .map(|index| {
                let entry = DirectoryEntry::decode_at(&block, index)?;
                if entry.name().is_empty() {
                    return Err(FsError::Corrupted(format!(
                        "directory {} has an empty name in entry {index}",
                        parent.inode_number
                    )));
                }
                Ok(entry.into())
            })
            .collect()
    }
}
