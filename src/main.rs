//! CLI entry point for tile registration

use clap::Parser;
use tilestitch::io::cli::{Cli, Stitcher};
use tilestitch::io::logging::init_logging;

fn main() -> tilestitch::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let mut stitcher = Stitcher::new(cli);
    stitcher.process()
}
