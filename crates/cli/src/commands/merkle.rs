//! Merkle tree commands over file contents.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use toychain_core::{hash, verify_proof, Hash, MerkleTree};

#[derive(Args)]
pub struct MerkleArgs {
    #[command(subcommand)]
    command: MerkleCommand,
}

#[derive(Subcommand)]
enum MerkleCommand {
    /// Print each file's leaf hash and the merkle root
    Root {
        /// Files to use as leaves, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Produce and verify an inclusion proof for one file
    Prove {
        /// Files to use as leaves, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Leaf index to prove
        #[arg(short, long)]
        index: usize,
    },
}

pub fn run(args: MerkleArgs) -> Result<()> {
    match args.command {
        MerkleCommand::Root { files } => show_root(files),
        MerkleCommand::Prove { files, index } => show_proof(files, index),
    }
}

/// SHA-256 of each file's contents.
fn file_leaves(files: &[PathBuf]) -> Result<Vec<Hash>> {
    files
        .iter()
        .map(|path| {
            fs::read(path)
                .map(|bytes| hash(&bytes))
                .with_context(|| format!("Failed to read file: {}", path.display()))
        })
        .collect()
}

fn show_root(files: Vec<PathBuf>) -> Result<()> {
    let leaves = file_leaves(&files)?;
    let tree = MerkleTree::new(&leaves);

    println!();
    println!("{}", "Files and leaf hashes:".bold().cyan());
    for (path, leaf) in files.iter().zip(&leaves) {
        println!(
            "  {} {}",
            leaf.to_hex().bright_yellow(),
            path.display().to_string().bright_black()
        );
    }
    println!();
    println!("Root: {}", tree.root().to_hex().bright_green());
    Ok(())
}

fn show_proof(files: Vec<PathBuf>, index: usize) -> Result<()> {
    let leaves = file_leaves(&files)?;
    let tree = MerkleTree::new(&leaves);
    let root = tree.root();

    let proof = tree
        .proof(index)
        .with_context(|| format!("Cannot prove leaf {}", index))?;

    println!();
    println!("Root: {}", root.to_hex().bright_green());
    println!("{}", format!("Proof for index {}:", index).bold().cyan());
    for (level, sibling) in proof.iter().enumerate() {
        println!(
            "  {} {}",
            format!("L{}", level).bright_black(),
            sibling.to_hex().bright_yellow()
        );
    }

    let ok = verify_proof(&leaves[index], &proof, &root, index);
    println!();
    if ok {
        println!("{}  Proof verifies", "✓".green().bold());
    } else {
        println!("{}  Proof does not verify", "✗".red().bold());
    }
    Ok(())
}
