//! Per-shard sort: packed entries in, ascending-key seeds out.
//!
//! Each shard is loaded whole (worst case around 43M entries for the
//! full keyspace), radix sorted on the key, and written back as the
//! seed column only; keys are recomputed on demand at query time.
//! Shards share no state, so one shard failing leaves the rest intact.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;

use crate::radix;
use crate::shard::{self, SHARD_COUNT};

/// Sort every shard under `dir`. Failures are reported per shard and
/// the remaining shards still run; an error is returned if any failed.
pub fn sort_all(dir: &Path) -> Result<()> {
    println!("\n{}", "═".repeat(60));
    println!("Sort: {} shards under {}", SHARD_COUNT, dir.display());
    println!("{}", "═".repeat(60));

    let start_time = Instant::now();
    let mut failed = 0u32;
    for index in 0..SHARD_COUNT {
        match sort_shard(dir, index) {
            Ok(entries) => println!("  shard {:02}: {} entries", index, entries),
            Err(err) => {
                failed += 1;
                eprintln!("  shard {:02}: {:#}", index, err);
            }
        }
    }

    println!("{}", "─".repeat(60));
    if failed > 0 {
        anyhow::bail!("{} of {} shards failed to sort", failed, SHARD_COUNT);
    }
    println!(
        "  ✅ Sort complete in {:.1}m",
        start_time.elapsed().as_secs_f64() / 60.0
    );
    Ok(())
}

/// Sort one shard by key and replace its file with the seed column.
///
/// Ties among equal keys land in generation order, but nothing
/// downstream may rely on that: the query path treats an equal-key run
/// as an unordered set.
pub fn sort_shard(dir: &Path, index: u32) -> Result<u64> {
    let path = shard::shard_path(dir, index);
    let entries = shard::read_entries(&path)?;

    let mut keys = Vec::with_capacity(entries.len());
    let mut seeds = Vec::with_capacity(entries.len());
    for entry in &entries {
        keys.push(entry.key);
        seeds.push(entry.seed);
    }
    drop(entries);

    let (_, seeds) = radix::sort_pairs(keys, seeds);
    shard::write_seeds_atomic(&path, &seeds)
        .with_context(|| format!("Failed to write sorted shard {:02}", index))?;
    Ok(seeds.len() as u64)
}
