use std::path::PathBuf;

use crate::{
    fs::{Filesystem, MemoryDevice},
    mkfs::format,
};

/// route `log` output through the test harness, safe to call from every test
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// a mounted, freshly formatted in-memory filesystem of `block_count` blocks
pub fn formatted_filesystem(block_count: u64) -> Filesystem<MemoryDevice> {
    init_logger();
    let mut device = MemoryDevice::new(block_count);
    format(&mut device).expect("format in-memory device");
    Filesystem::mount(device).expect("mount freshly formatted device")
}

/// a path in the temp dir that does not exist yet, unique per test name and process
pub fn fresh_image_path(test_name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sbfs_{test_name}_{}.img", std::process::id()));
    if path.exists() {
        std::fs::remove_file(&path).expect("remove stale test image");
    }
    path
}
