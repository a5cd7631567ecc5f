//! End-to-end chain demo command.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use toychain_chain::{Blockchain, BlockchainConfig};
use toychain_core::{transactions_root, Block, Keypair, MiningOutcome};

#[derive(Args)]
pub struct DemoArgs {
    /// JSON config file with `difficulty_prefix` and `max_attempts`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hex prefix mined header hashes must start with
    #[arg(short, long)]
    difficulty: Option<String>,

    /// Maximum nonce attempts per block
    #[arg(short = 'n', long)]
    max_attempts: Option<u64>,
}

/// Load the config file if given, then apply flag overrides.
fn load_config(args: &DemoArgs) -> Result<BlockchainConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => BlockchainConfig::default(),
    };
    if let Some(prefix) = &args.difficulty {
        config.difficulty_prefix = prefix.clone();
    }
    if let Some(max_attempts) = args.max_attempts {
        config.max_attempts = max_attempts;
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<BlockchainConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config file: {}", path.display()))
}

fn format_timestamp(timestamp: f64) -> String {
    let secs = timestamp.trunc() as i64;
    let nanos = (timestamp.fract() * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

fn print_block(block: &Block, mining: Option<&MiningOutcome>) {
    let status = match mining {
        Some(MiningOutcome::Mined { attempts, .. }) => {
            format!("mined in {} attempts", attempts).green()
        }
        Some(MiningOutcome::Exhausted { attempts }) => {
            format!("mining exhausted after {} attempts", attempts).red()
        }
        None => "not mined".bright_black(),
    };

    println!(
        "  {} {} {}",
        format!("#{}", block.index()).bright_black(),
        block.hash().to_hex().bright_yellow(),
        status
    );
    println!(
        "      nonce {}  txs {}  time {}",
        block.header.nonce.to_string().bright_cyan(),
        block.tx_count(),
        format_timestamp(block.header.timestamp).bright_black()
    );
}

fn print_validation(chain: &Blockchain) {
    match chain.validate() {
        Ok(()) => println!("{}  Chain is valid", "✓".green().bold()),
        Err(e) => println!("{}  Chain is invalid: {}", "✗".red().bold(), e),
    }
}

pub fn run(args: DemoArgs) -> Result<()> {
    let config = load_config(&args)?;
    println!("{}", "Building toychain...".bold().cyan());
    println!(
        "  difficulty {}  budget {}",
        format!("{:?}", config.difficulty_prefix).bright_cyan(),
        config.max_attempts
    );
    println!();

    let keypair = Keypair::generate();
    println!("  signer {}", keypair.public_key().to_hex().bright_yellow());

    let mut chain = build_chain(config, &keypair)?;

    println!();
    print_validation(&chain);

    println!();
    println!("{}", "Tampering with block 1...".bold());
    tamper_first_block(&mut chain);
    print_validation(&chain);

    Ok(())
}

/// Signed genesis plus two blocks built from the pending pool.
fn build_chain(config: BlockchainConfig, keypair: &Keypair) -> Result<Blockchain> {
    let mut chain = Blockchain::new(config).context("Failed to create blockchain")?;
    chain.sign_genesis(keypair);
    print_block(chain.latest(), None);

    let batches: [&[&str]; 2] = [
        &["Alice pays Bob 10", "Bob pays Carol 3"],
        &["Dave pays Erin 7"],
    ];
    for batch in batches {
        for tx in batch {
            chain
                .submit_transaction(*tx)
                .context("Failed to queue transaction")?;
        }
        let appended = chain.add_pending_block(keypair, true);
        print_block(appended.block, appended.mining.as_ref());
    }
    Ok(chain)
}

/// Rewrite a transaction in block 1 and recompute its merkle root.
fn tamper_first_block(chain: &mut Blockchain) {
    if let Some(block) = chain.block_mut(1) {
        block.transactions[0] = "Alice pays Bob 9999".to_string();
        block.header.merkle_root = transactions_root(&block.transactions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use toychain_chain::ValidationError;

    fn args(config: Option<PathBuf>, difficulty: Option<&str>) -> DemoArgs {
        DemoArgs {
            config,
            difficulty: difficulty.map(str::to_string),
            max_attempts: None,
        }
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"difficulty_prefix": "0", "max_attempts": 42}}"#).unwrap();

        let config = load_config(&args(Some(file.path().to_path_buf()), Some("00"))).unwrap();
        assert_eq!(config.difficulty_prefix, "00");
        assert_eq!(config.max_attempts, 42);
    }

    #[test]
    fn test_missing_config_file_errors() {
        let missing = PathBuf::from("/definitely/not/here.json");
        assert!(load_config(&args(Some(missing), None)).is_err());
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = load_config(&args(None, None)).unwrap();
        assert_eq!(config, BlockchainConfig::default());
    }

    #[test]
    fn test_run_with_trivial_difficulty() {
        assert!(run(args(None, Some(""))).is_ok());
    }

    #[test]
    fn test_run_rejects_invalid_difficulty() {
        assert!(run(args(None, Some("XYZ"))).is_err());
    }

    #[test]
    fn test_tamper_fails_at_block_one() {
        let keypair = Keypair::generate();
        let mut chain = build_chain(BlockchainConfig::new("", 1), &keypair).unwrap();
        assert_eq!(chain.len(), 3);
        assert!(chain.pending().is_empty());
        assert_eq!(chain.validate(), Ok(()));

        tamper_first_block(&mut chain);
        assert_eq!(
            chain.validate(),
            Err(ValidationError::InvalidSignature { index: 1 })
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "1970-01-01T00:00:00+00:00");
    }
}
