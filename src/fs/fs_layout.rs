//! what does our filesystem look like in the memory

use std::{
    ffi::OsStr,
    path::{Component, Path},
};

use log::{info, warn};

use super::{
    directory::{ensure_dir, validate_name},
    BlockDevice, DirEntry, FileKind, InodeRecord, SuperBlock, BLOCK_SIZE, DIR_ENTRIES_PER_BLOCK,
    FIRST_DATA_BLOCK, FIRST_USER_INODE, INODE_TABLE_CAPACITY, MAX_OBJECTS, ROOT_INODE, S_IFDIR,
};
use crate::error::{FsError, Result};

/// A mounted filesystem.
///
/// Only [Filesystem::mount] creates one and [Filesystem::unmount] consumes it,
/// so every operation below runs against a validated superblock.
/// Mutating operations take `&mut self`, callers sharing a mount across
/// threads have to serialize them.
#[derive(Debug)]
pub struct Filesystem<D: BlockDevice> {
    /// the superblock of this filesystem, mirrors block 0
    pub(crate) superblock: SuperBlock,
    /// the underlying device
    pub(crate) device: D,
}

/// numbers reported by [Filesystem::statfs]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub block_size: u64,
    pub data_blocks: u64,
    pub free_blocks: u64,
    pub inodes: u64,
    pub free_inodes: u64,
}

impl<D: BlockDevice> Filesystem<D> {
    /// validate the superblock on `device` and take it over
    ///
    /// on failure the device has not been written to
    pub fn mount(device: D) -> Result<Self> {
        info!("mounting a device of {} blocks", device.block_count());
        let superblock = SuperBlock::load(&device).map_err(|e| {
            warn!("refusing to mount: {e}");
            e
        })?;
        let fs = Filesystem { superblock, device };

        let root = fs
            .find_inode(ROOT_INODE)?
            .ok_or_else(|| FsError::Format("root directory inode is missing".into()))?;
        if !root.is_dir() {
            return Err(FsError::Format(format!(
                "root inode has mode {:#o}, not a directory",
                root.mode
            )));
        }
        info!(
            "mounted filesystem version {} with {} inodes and {} free blocks",
            fs.superblock.version,
            fs.superblock.inode_count,
            fs.superblock.free_block_count()
        );
        Ok(fs)
    }

    /// persist the superblock one last time and hand the device back
    pub fn unmount(mut self) -> Result<D> {
        info!("unmounting");
        self.superblock.persist(&mut self.device)?;
        Ok(self.device)
    }
}

/// get [SuperBlock] and the device of this filesystem
impl<D: BlockDevice> Filesystem<D> {
    #[inline]
    pub fn superblock(&self) -> &SuperBlock {
        &self.superblock
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn statfs(&self) -> FsStats {
        let data_blocks = self
            .device
            .block_count()
            .min(MAX_OBJECTS)
            .saturating_sub(FIRST_DATA_BLOCK);
        FsStats {
            block_size: self.superblock.block_size,
            data_blocks,
            free_blocks: self.superblock.free_block_count(),
            inodes: INODE_TABLE_CAPACITY,
            free_inodes: INODE_TABLE_CAPACITY - self.superblock.inode_count,
        }
    }
}

/// block access, every write is synced before returning
impl<D: BlockDevice> Filesystem<D> {
    pub(crate) fn read_block(&self, index: u64) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        self.device.read_block(index, &mut buf)?;
        Ok(buf)
    }

    pub(crate) fn write_block(&mut self, index: u64, block: &[u8]) -> Result<()> {
        self.device.write_block(index, block)?;
        self.device.sync()
    }
}

/// operations offered to callers
impl<D: BlockDevice> Filesystem<D> {
    pub fn root(&self) -> Result<InodeRecord> {
        self.get_inode(ROOT_INODE)
    }

    /// create a regular file, `mode` has to carry the regular file type bits
    pub fn create_file(
        &mut self,
        parent: &InodeRecord,
        name: impl AsRef<OsStr>,
        mode: u32,
    ) -> Result<InodeRecord> {
        if FileKind::from_mode(mode) != Some(FileKind::RegularFile) {
            return Err(FsError::InvalidMode(mode));
        }
        self.create_object(parent, name.as_ref(), mode)
    }

    /// create a directory, the directory type bits are added to `mode`
    pub fn create_directory(
        &mut self,
        parent: &InodeRecord,
        name: impl AsRef<OsStr>,
        mode: u32,
    ) -> Result<InodeRecord> {
        self.create_object(parent, name.as_ref(), S_IFDIR | mode)
    }

    /// allocate a block, append a record for it and link it into `parent`
    ///
    /// the first failing step aborts, earlier steps are not rolled back
    pub fn create_object(
        &mut self,
        parent: &InodeRecord,
        name: impl AsRef<OsStr>,
        mode: u32,
    ) -> Result<InodeRecord> {
        let name = name.as_ref();
        info!(
            "create called with parent inode {}, name {name:?}, mode {mode:#o}",
            parent.inode_number
        );
        if FileKind::from_mode(mode).is_none() {
            return Err(FsError::InvalidMode(mode));
        }
        // checks that must not leak a block when they fail
        let mut parent = self.get_inode(parent.inode_number)?;
        ensure_dir(&parent)?;
        validate_name(name)?;
        if parent.child_count >= DIR_ENTRIES_PER_BLOCK as u64 {
            return Err(FsError::NoSpace("directory block is full"));
        }
        if self.superblock.inode_count >= INODE_TABLE_CAPACITY {
            return Err(FsError::NoSpace("inode table is full"));
        }

        let block = self.allocate_block()?;
        let inode = InodeRecord::new(self.next_inode_number(), mode, block);
        self.append_inode(&inode)?;
        self.add_entry(&mut parent, name, inode.inode_number)?;
        info!(
            "created inode {} in block {block} as {name:?}",
            inode.inode_number
        );
        Ok(inode)
    }

    /// the child of `parent` named `name`, `None` if there is none
    pub fn lookup(
        &self,
        parent: &InodeRecord,
        name: impl AsRef<OsStr>,
    ) -> Result<Option<InodeRecord>> {
        let parent = self.get_inode(parent.inode_number)?;
        let Some(child) = self.lookup_entry(&parent, name.as_ref())? else {
            return Ok(None);
        };
        self.find_inode(child)?.map(Some).ok_or_else(|| {
            FsError::Corrupted(format!(
                "directory {} links to missing inode {child}",
                parent.inode_number
            ))
        })
    }

    /// entries of `dir` in creation order
    pub fn list_directory(&self, dir: &InodeRecord) -> Result<Vec<DirEntry>> {
        let dir = self.get_inode(dir.inode_number)?;
        self.dir_entries(&dir)
    }

    /// up to `length` bytes of `file` starting at `offset`, empty at end-of-file
    pub fn read(&self, file: &InodeRecord, offset: u64, length: usize) -> Result<Vec<u8>> {
        let file = self.get_inode(file.inode_number)?;
        self.read_data(&file, offset, length)
    }

    /// write `data` at `offset`, returns the number of bytes written
    pub fn write(&mut self, file: &InodeRecord, offset: u64, data: &[u8]) -> Result<usize> {
        let mut file = self.get_inode(file.inode_number)?;
        self.write_data(&mut file, offset, data)
    }

    /// walk an absolute path from the root directory
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<InodeRecord> {
        let path = path.as_ref();
        let mut current = self.root()?;
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir => continue,
                Component::Normal(name) => {
                    current = self.lookup(&current, name)?.ok_or_else(|| {
                        FsError::NotFound(format!("{}", path.display()))
                    })?;
                }
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(FsError::Validation(format!(
                        "unsupported path component in {}",
                        path.display()
                    )))
                }
            }
        }
        Ok(current)
    }

    // sequential, slot 0 holds the root so the first object gets FIRST_USER_INODE
    fn next_inode_number(&self) -> u64 {
        FIRST_USER_INODE + self.superblock.inode_count - 1
    }
}
