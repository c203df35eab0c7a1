use bincode::{Decode, Encode};

use super::{
    filekind::FileKind, BLOCK_SIZE, DIR_ENTRIES_PER_BLOCK, FIRST_DATA_BLOCK, MAX_OBJECTS,
    ROOT_DIR_BLOCK, ROOT_INODE,
};
use crate::{
    error::{FsError, Result},
    utils::traits::OnDisk,
};

/// metadata of one file or directory, stored in the inode table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct InodeRecord {
    pub inode_number: u64,
    /// type and permission bits
    pub mode: u32,
    /// the single block holding this object's content
    pub data_block: u64,
    /// only meaningful for regular files
    pub file_size: u64,
    /// only meaningful for directories
    pub child_count: u64,
}

impl OnDisk for InodeRecord {
    const SIZE: usize = 8 + 4 + 8 + 8 + 8;
}

impl InodeRecord {
    pub fn new(inode_number: u64, mode: u32, data_block: u64) -> Self {
        InodeRecord {
            inode_number,
            mode,
            data_block,
            file_size: 0,
            child_count: 0,
        }
    }

    /// `None` for a record whose mode is neither a file nor a directory
    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_mode(self.mode)
    }

    pub fn is_regular_file(&self) -> bool {
        self.kind() == Some(FileKind::RegularFile)
    }

    pub fn is_dir(&self) -> bool {
        self.kind() == Some(FileKind::Directory)
    }

    /// permission bits without the type
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }

    /// range checks applied to every record read from the table
    pub fn validate(&self) -> Result<()> {
        let corrupted = |what: String| -> Result<()> {
            Err(FsError::Corrupted(format!(
                "inode {}: {what}",
                self.inode_number
            )))
        };
        if self.kind().is_none() {
            return corrupted(format!("unknown mode {:#o}", self.mode));
        }
        if self.data_block >= MAX_OBJECTS {
            return corrupted(format!("data block {} out of range", self.data_block));
        }
        // only the root directory lives in a reserved block
        let is_root = self.inode_number == ROOT_INODE && self.data_block == ROOT_DIR_BLOCK;
        if self.data_block < FIRST_DATA_BLOCK && !is_root {
            return corrupted(format!("data block {} is reserved", self.data_block));
        }
        if self.file_size > BLOCK_SIZE as u64 {
            return corrupted(format!("file size {} exceeds one block", self.file_size));
        }
        if self.child_count > DIR_ENTRIES_PER_BLOCK as u64 {
            return corrupted(format!("{} children exceed one block", self.child_count));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{S_IFDIR, S_IFREG};

    #[test]
    fn test_encoded_layout() {
        let inode = InodeRecord {
            inode_number: 10,
            mode: S_IFREG | 0o644,
            data_block: 3,
            file_size: 5,
            child_count: 0,
        };
        let mut buf = vec![0u8; InodeRecord::SIZE * 2];
        inode.encode_at(&mut buf, 1).unwrap();
        assert!(buf[..InodeRecord::SIZE].iter().all(|b| *b == 0));
        assert_eq!(&buf[InodeRecord::SIZE..InodeRecord::SIZE + 8], &10u64.to_le_bytes());
        assert_eq!(InodeRecord::decode_at(&buf, 1).unwrap(), inode);
    }

    #[test]
    fn test_kind_and_permissions() {
        let dir = InodeRecord::new(1, S_IFDIR | 0o755, 2);
        assert!(dir.is_dir());
        assert!(!dir.is_regular_file());
        assert_eq!(dir.permissions(), 0o755);

        let file = InodeRecord::new(10, S_IFREG | 0o600, 3);
        assert!(file.is_regular_file());
        assert_eq!(file.permissions(), 0o600);
    }

    #[test]
    fn test_validate() {
        let file = InodeRecord::new(10, S_IFREG | 0o644, 3);
        assert!(file.validate().is_ok());

        let bad = [
            InodeRecord { mode: 0o644, ..file },
            InodeRecord { data_block: MAX_OBJECTS, ..file },
            InodeRecord { data_block: 0, ..file },
            InodeRecord { data_block: 1, ..file },
            InodeRecord { data_block: ROOT_DIR_BLOCK, ..file },
            InodeRecord { file_size: BLOCK_SIZE as u64 + 1, ..file },
            InodeRecord { child_count: DIR_ENTRIES_PER_BLOCK as u64 + 1, ..file },
        ];
        for inode in bad {
            assert!(matches!(inode.validate(), Err(FsError::Corrupted(_))));
        }

        let root = InodeRecord::new(ROOT_INODE, S_IFDIR | 0o755, ROOT_DIR_BLOCK);
        assert!(root.validate().is_ok());
        let misplaced_root = InodeRecord { data_block: 1, ..root };
        assert!(matches!(misplaced_root.validate(), Err(FsError::Corrupted(_))));
    }
}
