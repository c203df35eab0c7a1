use clap::Parser;

#[derive(Parser, Debug, PartialEq)]
#[command(author, version, about, long_about)]
pub enum SbfsCli {
    /// create a new file system
    Mkfs(MkfsArgs),
    /// print superblock statistics of a file system
    Info(ImageArgs),
    /// list a directory
    Ls(PathArgs),
    /// create a directory
    Mkdir(CreateArgs),
    /// create an empty regular file
    Create(CreateArgs),
    /// write bytes to a regular file
    Write(WriteArgs),
    /// print the content of a regular file
    Cat(CatArgs),
}

///make a new fs subcommand
#[derive(clap::Args, Debug, PartialEq)]
#[command(author, version, about = "make a new file system")]
pub struct MkfsArgs {
    /// the path of the file system image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
    /// the size of the file system in bytes
    #[clap(short, long)]
    pub size: u64,
}

#[derive(clap::Args, Debug, PartialEq)]
pub struct ImageArgs {
    /// the path of the file system image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
}

#[derive(clap::Args, Debug, PartialEq)]
pub struct PathArgs {
    /// the path of the file system image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
    /// absolute path inside the file system
    pub path: String,
}

#[derive(clap::Args, Debug, PartialEq)]
pub struct CreateArgs {
    /// the path of the file system image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
    /// absolute path of the new object
    pub path: String,
    /// permission bits in octal, 755 for directories and 644 for files if omitted
    #[clap(short, long, value_parser = parse_octal_mode)]
    pub mode: Option<u32>,
}

#[derive(clap::Args, Debug, PartialEq)]
pub struct WriteArgs {
    /// the path of the file system image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
    /// absolute path of the file
    pub path: String,
    /// the bytes to write
    pub data: String,
    /// where in the file to start writing
    #[clap(short, long, default_value_t = 0)]
    pub offset: u64,
}

#[derive(clap::Args, Debug, PartialEq)]
pub struct CatArgs {
    /// the path of the file system image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
    /// absolute path of the file
    pub path: String,
    #[clap(short, long, default_value_t = 0)]
    pub offset: u64,
    /// at most this many bytes, the whole file if omitted
    #[clap(short, long)]
    pub length: Option<usize>,
}

fn parse_octal_mode(mode: &str) -> Result<u32, String> {
    let bits = u32::from_str_radix(mode.trim_start_matches("0o"), 8)
        .map_err(|e| format!("{mode} is not an octal mode: {e}"))?;
    if bits > 0o7777 {
        return Err(format!("{mode} has bits outside the permission bits"));
    }
    Ok(bits)
}


/// test the subcommands working inside an image
#[cfg(test)]
mod image_parse_args_tests {
    use super::*;

    #[test]
    fn test_create_mode_is_octal() {
        let args = SbfsCli::parse_from(["sbfs", "create", "-p", "img", "/a.txt", "-m", "600"]);
        assert_eq!(
            args,
            SbfsCli::Create(CreateArgs {
                image_file_path: "img".to_string(),
                path: "/a.txt".to_string(),
                mode: Some(0o600),
            })
        );
        let args = SbfsCli::parse_from(["sbfs", "mkdir", "--image-file-path", "img", "/dir"]);
        assert_eq!(
            args,
            SbfsCli::Mkdir(CreateArgs {
                image_file_path: "img".to_string(),
                path: "/dir".to_string(),
                mode: None,
            })
        );
    }

    #[test]
    fn test_bad_mode_is_rejected() {
        assert!(SbfsCli::try_parse_from(["sbfs", "create", "-p", "img", "/a", "-m", "9"]).is_err());
        assert!(
            SbfsCli::try_parse_from(["sbfs", "create", "-p", "img", "/a", "-m", "17777"]).is_err()
        );
    }

    #[test]
    fn test_write_and_cat() {
        let args = SbfsCli::parse_from(["sbfs", "write", "-p", "img", "/a", "hello", "-o", "3"]);
        assert_eq!(
            args,
            SbfsCli::Write(WriteArgs {
                image_file_path: "img".to_string(),
                path: "/a".to_string(),
                data: "hello".to_string(),
                offset: 3,
            })
        );
        let args = SbfsCli::parse_from(["sbfs", "cat", "-p", "img", "/a", "--length", "2"]);
        assert_eq!(
            args,
            SbfsCli::Cat(CatArgs {
                image_file_path: "img".to_string(),
                path: "/a".to_string(),
                offset: 0,
                length: Some(2),
            })
        );
    }

    #[test]
    fn test_info_and_ls() {
        assert_eq!(
            SbfsCli::parse_from(["sbfs", "info", "-p", "img"]),
            SbfsCli::Info(ImageArgs {
                image_file_path: "img".to_string(),
            })
        );
        assert_eq!(
            SbfsCli::parse_from(["sbfs", "ls", "-p", "img", "/"]),
            SbfsCli::Ls(PathArgs {
                image_file_path: "img".to_string(),
                path: "/".to_string(),
            })
        );
    }
}
