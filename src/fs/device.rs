//! block devices the filesystem can live on
use std::{
    fs::OpenOptions,
    io::{Error, ErrorKind},
    path::Path,
};

use memmap2::MmapMut;

use super::BLOCK_SIZE;
use crate::error::Result;

/// storage addressed in [BLOCK_SIZE] chunks
pub trait BlockDevice {
    /// number of blocks on the device
    fn block_count(&self) -> u64;

    /// read block `index` into `buf`, `buf.len()` must be [BLOCK_SIZE]
    fn read_block(&self, index: u64, buf: &mut [u8]) -> Result<()>;

    /// write `buf` to block `index`, `buf.len()` must be [BLOCK_SIZE]
    fn write_block(&mut self, index: u64, buf: &[u8]) -> Result<()>;

    /// force every written block to stable storage
    fn sync(&mut self) -> Result<()>;
}

impl<D: BlockDevice + ?Sized> BlockDevice for &mut D {
    fn block_count(&self) -> u64 {
        (**self).block_count()
    }

    fn read_block(&self, index: u64, buf: &mut [u8]) -> Result<()> {
        (**self).read_block(index, buf)
    }

    fn write_block(&mut self, index: u64, buf: &[u8]) -> Result<()> {
        (**self).write_block(index, buf)
    }

    fn sync(&mut self) -> Result<()> {
        (**self).sync()
    }
}

// byte range of block `index` on a device of `block_count` blocks
fn block_range(index: u64, block_count: u64, buf_len: usize) -> Result<std::ops::Range<usize>> {
    if buf_len != BLOCK_SIZE {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("buffer of {buf_len} bytes, expected {BLOCK_SIZE}"),
        )
        .into());
    }
    if index >= block_count {
        return Err(Error::new(
            ErrorKind::UnexpectedEof,
            format!("block {index} is past the end of a {block_count} block device"),
        )
        .into());
    }
    let start = index as usize * BLOCK_SIZE;
    Ok(start..start + BLOCK_SIZE)
}

/// an image file mapped into memory, something like a `Block Device`
#[derive(Debug)]
pub struct ImageFile {
    mmap: MmapMut,
    block_count: u64,
}

impl ImageFile {
    /// open an existing image for read and write
    /// # Params
    /// - `image_path`: the path of the image file,
    ///   its length must be a whole number of blocks
    pub fn open<P>(image_path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(image_path.as_ref())?;
        let len = file.metadata()?.len();
        if len == 0 || len % BLOCK_SIZE as u64 != 0 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("image length {len} is not a positive multiple of {BLOCK_SIZE}"),
            )
            .into());
        }

        // Safety
        // the mapping is only valid while no other process truncates the image,
        // the same contract a mounted block device has.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self {
            mmap,
            block_count: len / BLOCK_SIZE as u64,
        })
    }
}

impl BlockDevice for ImageFile {
    fn block_count(&self) -> u64 {
        self.block_count
    }

    fn read_block(&self, index: u64, buf: &mut [u8]) -> Result<()> {
        let range = block_range(index, self.block_count, buf.len())?;
        buf.copy_from_slice(&self.mmap[range]);
        Ok(())
    }

    fn write_block(&mut self, index: u64, buf: &[u8]) -> Result<()> {
        let range = block_range(index, self.block_count, buf.len())?;
        self.mmap[range].copy_from_slice(buf);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(self.mmap.flush()?)
    }
}

/// a device kept entirely in memory, sync is a no-op
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDevice {
    data: Vec<u8>,
}

impl MemoryDevice {
    /// creates a zero-filled device of `block_count` blocks
    pub fn new(block_count: u64) -> Self {
        Self {
            data: vec![0; block_count as usize * BLOCK_SIZE],
        }
    }

    /// raw contents of the device
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// raw contents of block `index`
    pub fn block(&self, index: u64) -> Option<&[u8]> {
        let start = index as usize * BLOCK_SIZE;
        self.data.get(start..start + BLOCK_SIZE)
    }
}

impl BlockDevice for MemoryDevice {
    fn block_count(&self) -> u64 {
        (self.data.len() / BLOCK_SIZE) as u64
    }

    fn read_block(&self, index: u64, buf: &mut [u8]) -> Result<()> {
        let range = block_range(index, self.block_count(), buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write_block(&mut self, index: u64, buf: &[u8]) -> Result<()> {
        let range = block_range(index, self.block_count(), buf.len())?;
        self.data[range].copy_from_slice(buf);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FsError;

    #[test]
    fn test_memory_device_read_write() {
        let mut device = MemoryDevice::new(4);
        let mut block = vec![0u8; BLOCK_SIZE];
        block[0] = 0xab;
        block[BLOCK_SIZE - 1] = 0xcd;
        device.write_block(3, &block).unwrap();

        let mut read = vec![0u8; BLOCK_SIZE];
        device.read_block(3, &mut read).unwrap();
        assert_eq!(read, block);
        assert_eq!(device.block(3), Some(block.as_slice()));
        assert!(device.block(2).unwrap().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_out_of_range_block_is_io_error() {
        let mut device = MemoryDevice::new(2);
        let mut buf = vec![0u8; BLOCK_SIZE];
        assert!(matches!(
            device.read_block(2, &mut buf),
            Err(FsError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof
        ));
        assert!(matches!(
            device.write_block(1, &buf[..10]),
            Err(FsError::Io(e)) if e.kind() == ErrorKind::InvalidInput
        ));
    }

    #[test]
    fn test_image_file_round_trip() {
        let path = std::env::temp_dir().join(format!("sbfs_device_{}.img", std::process::id()));
        std::fs::write(&path, vec![0u8; 3 * BLOCK_SIZE]).unwrap();

        let mut image = ImageFile::open(&path).unwrap();
        assert_eq!(image.block_count(), 3);
        let block = vec![7u8; BLOCK_SIZE];
        image.write_block(1, &block).unwrap();
        image.sync().unwrap();
        drop(image);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes[BLOCK_SIZE..2 * BLOCK_SIZE].iter().all(|b| *b == 7));
        assert!(bytes[..BLOCK_SIZE].iter().all(|b| *b == 0));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_image_file_rejects_partial_blocks() {
        let path =
            std::env::temp_dir().join(format!("sbfs_partial_{}.img", std::process::id()));
        std::fs::write(&path, vec![0u8; BLOCK_SIZE + 1]).unwrap();
        assert!(matches!(ImageFile::open(&path), Err(FsError::Io(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
