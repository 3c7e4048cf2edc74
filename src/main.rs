//! seedtable CLI
//!
//! Dispatches the index phases: generate the unsorted shards, sort
//! them into key order, verify a sorted shard, or answer a query read
//! from stdin. Running with no subcommand answers a query.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use seedtable::{check, generate, query, sort};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "seedtable")]
#[command(about = "Reverse index over the 32-bit SFMT seed space")]
struct Cli {
    /// Directory holding the 100 shard files
    #[arg(long, env = "SEED_INDEX_DIR", default_value = "index", global = true)]
    dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build unsorted shards over the full 32-bit seed space
    Generate,
    /// Sort every shard into ascending key order
    Sort,
    /// Verify a sorted shard's ascending-key invariant
    Check {
        /// Shard index to scan
        #[arg(default_value_t = 1)]
        shard: u32,
    },
    /// Read a draw sequence from stdin and print matching seeds
    Query,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Query) {
        Commands::Generate => {
            generate::build_shards(&cli.dir, 0..generate::SEED_SPACE)?;
        }
        Commands::Sort => sort::sort_all(&cli.dir)?,
        Commands::Check { shard } => run_check(&cli.dir, shard)?,
        Commands::Query => run_query(&cli.dir)?,
    }
    Ok(())
}

fn run_check(dir: &Path, shard: u32) -> Result<()> {
    let report = check::check_sorted(dir, shard)?;
    match report.violation {
        None => {
            println!(
                "shard {:02}: {} entries in ascending key order",
                shard, report.entries
            );
            Ok(())
        }
        Some(v) => {
            eprintln!(
                "shard {:02}: sort violation at index {}: key {:08x} follows {:08x}",
                shard, v.index, v.key, v.prev_key
            );
            std::process::exit(1);
        }
    }
}

/// Query format: a draw count followed by that many draw values,
/// whitespace separated. Matches print as hex (seed, key) pairs, one
/// per line; no matches prints nothing.
fn run_query(dir: &Path) -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read query from stdin")?;

    let mut tokens = input.split_whitespace();
    let count: usize = match tokens.next() {
        Some(token) => token
            .parse()
            .with_context(|| format!("Bad draw count: {token}"))?,
        None => bail!("Empty query: expected a draw count followed by the draws"),
    };
    let draws = tokens
        .take(count)
        .map(|token| {
            token
                .parse::<u8>()
                .with_context(|| format!("Bad draw value: {token}"))
        })
        .collect::<Result<Vec<u8>>>()?;
    if draws.len() != count {
        bail!("Query names {} draws but supplies {}", count, draws.len());
    }

    for m in query::search(dir, &draws)? {
        println!("{:08x} {:08x}", m.seed, m.key);
    }
    Ok(())
}
