//! run a parsed [SbfsCli] against an image file
use std::{ffi::OsStr, io::Write, path::Path};

use anyhow::anyhow;

use super::SbfsCli;
use crate::{
    fs::{BLOCK_SIZE, S_IFREG},
    mkfs::mkfs,
    mount::mount,
};

/// execute one subcommand, printing its output to `out`
///
/// mutating subcommands unmount the filesystem before returning
pub fn execute<W: Write>(cli: SbfsCli, out: &mut W) -> anyhow::Result<()> {
    match cli {
        SbfsCli::Mkfs(args) => {
            mkfs(&args.image_file_path, args.size)?;
            writeln!(out, "created {}", args.image_file_path)?;
        }
        SbfsCli::Info(args) => {
            let fs = mount(&args.image_file_path)?;
            let superblock = fs.superblock();
            let stats = fs.statfs();
            writeln!(out, "magic:       {:#x}", superblock.magic)?;
            writeln!(out, "version:     {}", superblock.version)?;
            writeln!(out, "block size:  {}", stats.block_size)?;
            writeln!(
                out,
                "data blocks: {} ({} free)",
                stats.data_blocks, stats.free_blocks
            )?;
            writeln!(out, "inodes:      {} ({} free)", stats.inodes, stats.free_inodes)?;
        }
        SbfsCli::Ls(args) => {
            let fs = mount(&args.image_file_path)?;
            let dir = fs.resolve(&args.path)?;
            for entry in fs.list_directory(&dir)? {
                let inode = fs.get_inode(entry.inode_number)?;
                writeln!(
                    out,
                    "{:>4} {:>7o} {:>5} {}",
                    entry.inode_number,
                    inode.mode,
                    inode.file_size,
                    entry.name.to_string_lossy()
                )?;
            }
        }
        SbfsCli::Mkdir(args) => {
            let mut fs = mount(&args.image_file_path)?;
            let (parent, name) = split_path(&args.path)?;
            let parent = fs.resolve(parent)?;
            let dir = fs.create_directory(&parent, name, args.mode.unwrap_or(0o755))?;
            fs.unmount()?;
            writeln!(out, "created directory {} (inode {})", args.path, dir.inode_number)?;
        }
        SbfsCli::Create(args) => {
            let mut fs = mount(&args.image_file_path)?;
            let (parent, name) = split_path(&args.path)?;
            let parent = fs.resolve(parent)?;
            let file = fs.create_file(&parent, name, S_IFREG | args.mode.unwrap_or(0o644))?;
            fs.unmount()?;
            writeln!(out, "created file {} (inode {})", args.path, file.inode_number)?;
        }
        SbfsCli::Write(args) => {
            let mut fs = mount(&args.image_file_path)?;
            let file = fs.resolve(&args.path)?;
            let written = fs.write(&file, args.offset, args.data.as_bytes())?;
            fs.unmount()?;
            writeln!(out, "wrote {written} bytes")?;
        }
        SbfsCli::Cat(args) => {
            let fs = mount(&args.image_file_path)?;
            let file = fs.resolve(&args.path)?;
            let data = fs.read(&file, args.offset, args.length.unwrap_or(BLOCK_SIZE))?;
            out.write_all(&data)?;
        }
    }
    Ok(())
}

fn split_path(path: &str) -> anyhow::Result<(&Path, &OsStr)> {
    let path = Path::new(path);
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(anyhow!("{} does not name a new entry", path.display())),
    }
}
