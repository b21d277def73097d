//! `grades`: keep a class roster and its scores in a plain-text file.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
