use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use blockfile_core::{Block, ChainStore};
use blockfile_storage::FixedChain;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "blockfile")]
#[command(about = "Append-only, hash-linked block file")]
struct Cli {
    /// Chain file to operate on (created if missing)
    #[arg(long, global = true, default_value = "./chain.blk")]
    chain_file: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append a block and print it
    Append {
        /// Payload to store
        #[arg(required_unless_present = "stdin")]
        data: Option<String>,
        /// Read the payload from standard input instead
        #[arg(long, conflicts_with = "data")]
        stdin: bool,
    },
    /// Print the block at an index
    Show { index: u64 },
    /// Print the number of blocks
    Size,
    /// Check every link; exits with status 1 when the chain is invalid
    Verify,
    /// Print every block, one JSON object per line
    Dump,
}

#[derive(Serialize)]
struct BlockView {
    block_number: i64,
    timestamp: i64,
    hash: String,
    previous_hash: String,
    data: String,
    data_hex: String,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            block_number: block.block_number(),
            timestamp: block.timestamp(),
            hash: block.hash_hex(),
            previous_hash: hex::encode(block.previous_hash()),
            data: String::from_utf8_lossy(block.data()).into_owned(),
            data_hex: hex::encode(block.data()),
        }
    }
}

fn main() -> Result<ExitCode> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Append { data, stdin } => {
            let payload = if stdin {
                let mut buf = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buf)
                    .context("reading payload from stdin")?;
                buf
            } else {
                match data {
                    Some(data) => data.into_bytes(),
                    None => bail!("no payload given"),
                }
            };
            let mut chain = FixedChain::new(open_chain_file(&cli.chain_file)?);
            let block = chain
                .append(&payload)
                .with_context(|| format!("appending to {}", cli.chain_file.display()))?;
            info!(block_number = block.block_number(), "block appended");
            print_block(&block)?;
        }
        Command::Show { index } => {
            let chain = FixedChain::new(open_chain_file(&cli.chain_file)?);
            let block = chain
                .block_at(index)
                .with_context(|| format!("reading block {index}"))?;
            print_block(&block)?;
        }
        Command::Size => {
            let chain = FixedChain::new(open_chain_file(&cli.chain_file)?);
            println!("{}", chain.size()?);
        }
        Command::Verify => {
            let chain = FixedChain::new(open_chain_file(&cli.chain_file)?);
            if chain.is_valid() {
                println!("valid");
            } else {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Dump => {
            let chain = FixedChain::new(open_chain_file(&cli.chain_file)?);
            for block in chain.blocks()? {
                print_block(&block?)?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// The binary owns the handle; the chain only reads and writes through it.
fn open_chain_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("opening chain file {}", path.display()))
}

fn print_block(block: &Block) -> Result<()> {
    println!("{}", serde_json::to_string(&BlockView::from(block))?);
    Ok(())
}
