use super::{S_IFDIR, S_IFMT, S_IFREG};

/// an enum to describe the type of a file
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// an regular file
    RegularFile,
    /// a directory
    Directory,
}

impl FileKind {
    /// the kind encoded in the type bits of `mode`, if this filesystem stores it
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode & S_IFMT {
            S_IFREG => Some(FileKind::RegularFile),
            S_IFDIR => Some(FileKind::Directory),
            _ => None,
        }
    }

    /// the type bits of this kind
    pub fn type_bits(self) -> u32 {
        match self {
            FileKind::RegularFile => S_IFREG,
            FileKind::Directory => S_IFDIR,
        }
    }
}
