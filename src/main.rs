use clap::Parser;
use sbfs::cli_interface::{execute, SbfsCli};
/// a CLI interface to users to create our filesystem,
/// or to inspect and change an image without mounting it into the OS
fn main() -> anyhow::Result<()> {
    env_logger::builder().format_timestamp_nanos().init();
    let args = SbfsCli::parse();
    execute(args, &mut std::io::stdout().lock())
}
