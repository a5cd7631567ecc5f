//! CLI commands module.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

mod demo;
mod merkle;

#[derive(Subcommand)]
pub enum Commands {
    /// Build, validate and tamper with a small signed chain
    Demo(demo::DemoArgs),
    /// Merkle trees over files
    Merkle(merkle::MerkleArgs),
    /// Print the SHA-256 digest of a string
    Hash {
        /// Text to hash
        text: String,
    },
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Demo(args) => demo::run(args),
        Commands::Merkle(args) => merkle::run(args),
        Commands::Hash { text } => {
            println!("{}", toychain_core::hash(text.as_bytes()).to_hex().bright_yellow());
            Ok(())
        }
    }
}
