//! CLI entry point for the density gridding pipeline

use clap::Parser;
use popgrid::io::cli::{Cli, PipelineRunner};

fn main() -> popgrid::Result<()> {
    let cli = Cli::parse();
    let mut runner = PipelineRunner::new(cli);
    runner.process()
}
