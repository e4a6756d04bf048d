//! CLI entry point for the wavetile solver

use clap::Parser;
use wavetile::io::cli::{Cli, SolveCommand};
use wavetile::io::logging;

fn main() -> wavetile::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let stdout = std::io::stdout();
    SolveCommand::new(cli).execute(&mut stdout.lock())
}
