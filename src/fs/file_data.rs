//! byte access inside a regular file's single data block
use log::debug;

use super::{BlockDevice, Filesystem, InodeRecord, BLOCK_SIZE};
use crate::error::{FsError, Result};

fn ensure_regular_file(inode: &InodeRecord) -> Result<()> {
    if inode.is_regular_file() {
        Ok(())
    } else {
        Err(FsError::Validation(format!(
            "inode {} is not a regular file",
            inode.inode_number
        )))
    }
}

/// read and write data in the filesystem
impl<D: BlockDevice> Filesystem<D> {
    /// copy up to `length` bytes starting at `offset`
    ///
    /// reading at or past the stored size is end-of-file and yields nothing
    pub(crate) fn read_data(
        &self,
        file: &InodeRecord,
        offset: u64,
        length: usize,
    ) -> Result<Vec<u8>> {
        ensure_regular_file(file)?;
        if offset >= file.file_size {
            return Ok(Vec::new());
        }
        // Could underflow if file length is less than offset, checked above
        let should_read = (length as u64).min(file.file_size - offset) as usize;
        let start = offset as usize;
        let end = start + should_read;
        if end > BLOCK_SIZE {
            return Err(FsError::Corrupted(format!(
                "inode {} claims {} bytes in a {BLOCK_SIZE} byte block",
                file.inode_number, file.file_size
            )));
        }
        let block = self.read_block(file.data_block)?;
        Ok(block[start..end].to_vec())
    }

    /// copy `data` to `offset`, the file size becomes `offset + data.len()`
    ///
    /// `file` is updated in place once the data and the record are on disk
    pub(crate) fn write_data(
        &mut self,
        file: &mut InodeRecord,
        offset: u64,
        data: &[u8],
    ) -> Result<usize> {
        ensure_regular_file(file)?;
        let end = offset
            .checked_add(data.len() as u64)
            .filter(|end| *end <= BLOCK_SIZE as u64)
            .ok_or_else(|| {
                FsError::Validation(format!(
                    "write of {} bytes at offset {offset} does not fit in a {BLOCK_SIZE} byte block",
                    data.len()
                ))
            })?;

        let mut block = self.read_block(file.data_block)?;
        block[offset as usize..end as usize].copy_from_slice(data);
        self.write_block(file.data_block, &block)?;

        let mut updated = *file;
        updated.file_size = end;
        self.save_inode(&updated)?;
        *file = updated;
        debug!(
            "wrote {} bytes at offset {offset} to inode {}",
            data.len(),
            file.inode_number
        );
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fs::{ROOT_INODE, S_IFREG},
        utils::init_test_environment::formatted_filesystem,
    };

    fn filesystem_with_file() -> (Filesystem<crate::fs::MemoryDevice>, InodeRecord) {
        let mut fs = formatted_filesystem(16);
        let block = fs.allocate_block().unwrap();
        let file = InodeRecord::new(10, S_IFREG | 0o644, block);
        fs.append_inode(&file).unwrap();
        (fs, file)
    }

    #[test]
    fn test_write_then_read() {
        let (mut fs, mut file) = filesystem_with_file();
        assert_eq!(fs.write_data(&mut file, 0, b"hello").unwrap(), 5);
        assert_eq!(file.file_size, 5);
        assert_eq!(fs.get_inode(10).unwrap().file_size, 5);

        assert_eq!(fs.read_data(&file, 0, 5).unwrap(), b"hello");
        assert_eq!(fs.read_data(&file, 1, 3).unwrap(), b"ell");
        // asking for more than the stored size is clamped
        assert_eq!(fs.read_data(&file, 0, 100).unwrap(), b"hello");
        assert_eq!(fs.read_data(&file, 3, 100).unwrap(), b"lo");
    }

    #[test]
    fn test_read_at_end_of_file() {
        let (mut fs, mut file) = filesystem_with_file();
        assert!(fs.read_data(&file, 0, 10).unwrap().is_empty());
        fs.write_data(&mut file, 0, b"abc").unwrap();
        assert!(fs.read_data(&file, 3, 10).unwrap().is_empty());
        assert!(fs.read_data(&file, 10_000, 10).unwrap().is_empty());
    }

    #[test]
    fn test_size_follows_last_write() {
        let (mut fs, mut file) = filesystem_with_file();
        fs.write_data(&mut file, 0, b"hello world").unwrap();
        fs.write_data(&mut file, 2, b"XY").unwrap();
        assert_eq!(file.file_size, 4);
        assert_eq!(fs.read_data(&file, 0, 100).unwrap(), b"heXY");
    }

    #[test]
    fn test_write_fills_whole_block() {
        let (mut fs, mut file) = filesystem_with_file();
        let data: Vec<u8> = (0..BLOCK_SIZE).map(|i| i as u8).collect();
        fs.write_data(&mut file, 0, &data).unwrap();
        assert_eq!(fs.read_data(&file, 0, BLOCK_SIZE + 1).unwrap(), data);
    }

    #[test]
    fn test_write_out_of_bounds_is_rejected() {
        let (mut fs, mut file) = filesystem_with_file();
        fs.write_data(&mut file, 0, b"keep").unwrap();
        let before = fs.device().clone();

        let too_long = vec![1u8; BLOCK_SIZE + 1];
        assert!(matches!(
            fs.write_data(&mut file, 0, &too_long),
            Err(FsError::Validation(_))
        ));
        assert!(matches!(
            fs.write_data(&mut file, BLOCK_SIZE as u64 - 1, b"ab"),
            Err(FsError::Validation(_))
        ));
        assert!(matches!(
            fs.write_data(&mut file, u64::MAX, b"a"),
            Err(FsError::Validation(_))
        ));
        assert_eq!(*fs.device(), before);
        assert_eq!(file.file_size, 4);
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let mut fs = formatted_filesystem(16);
        let mut root = fs.get_inode(ROOT_INODE).unwrap();
        assert!(matches!(
            fs.read_data(&root, 0, 1),
            Err(FsError::Validation(_))
        ));
        assert!(matches!(
            fs.write_data(&mut root, 0, b"x"),
            Err(FsError::Validation(_))
        ));
    }
}
