//! open an image file and mount the filesystem on it
use std::path::Path;

use crate::{
    error::Result,
    fs::{Filesystem, ImageFile},
};

pub fn mount<P>(image_path: P) -> Result<Filesystem<ImageFile>>
where
    P: AsRef<Path>,
{
    let image = ImageFile::open(image_path)?;
    Filesystem::mount(image)
}
