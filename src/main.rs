use clap::Parser;
use heat_atlas::cli::{run, Cli};
use heat_atlas::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
