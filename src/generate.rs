//! Keyspace generation: one packed entry per seed, partitioned into
//! 100 shard files by `key mod 100`.
//!
//! Seeds are enumerated in fixed-size blocks to bound working-set
//! memory. Digests within a block are computed in parallel (no seed's
//! digest depends on another's); the partition pass that appends each
//! entry to its shard file runs single-threaded afterwards, so writes
//! to one shard never interleave.

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;
use std::time::Instant;

use crate::digest;
use crate::shard::{self, Entry, SHARD_COUNT};

/// Seeds per block: 2^24 entries, a 128 MB working buffer.
pub const BLOCK_SIZE: u64 = 1 << 24;
/// The full enumeration domain, [0, 2^32).
pub const SEED_SPACE: u64 = 1 << 32;

/// Write one entry per seed in `seeds` across the shard files in `dir`.
///
/// The full run covers [0, [`SEED_SPACE`]); smaller ranges exercise the
/// identical path over a reduced keyspace. Returns the number of
/// entries written. All 100 shard files are created up front and every
/// writer is flushed before returning.
pub fn build_shards(dir: &Path, seeds: Range<u64>) -> Result<u64> {
    if seeds.end > SEED_SPACE {
        bail!(
            "Seed range end {:#x} exceeds the 32-bit seed space",
            seeds.end
        );
    }

    println!("\n{}", "═".repeat(60));
    println!(
        "Generate: seeds [{:#010x}, {:#010x})",
        seeds.start, seeds.end
    );
    println!("{}", "═".repeat(60));
    println!("  Shards: {} files under {}", SHARD_COUNT, dir.display());
    println!("  Workers: {}", rayon::current_num_threads());

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create index directory: {}", dir.display()))?;

    let mut writers = Vec::with_capacity(SHARD_COUNT as usize);
    for index in 0..SHARD_COUNT {
        let path = shard::shard_path(dir, index);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create shard file: {}", path.display()))?;
        writers.push(BufWriter::with_capacity(1024 * 1024, file));
    }

    let start_time = Instant::now();
    let total = seeds.end - seeds.start;
    let mut block: Vec<Entry> = Vec::new();
    let mut done = 0u64;
    let mut base = seeds.start;

    while base < seeds.end {
        let len = BLOCK_SIZE.min(seeds.end - base) as usize;
        (0..len)
            .into_par_iter()
            .map(|i| {
                let seed = (base + i as u64) as u32;
                Entry {
                    seed,
                    key: digest::key(seed),
                }
            })
            .collect_into_vec(&mut block);

        for entry in &block {
            let index = shard::shard_index(entry.key) as usize;
            writers[index]
                .write_all(&entry.to_bytes())
                .with_context(|| format!("Failed to append to shard {:02}", index))?;
        }

        base += len as u64;
        done += len as u64;
        let elapsed = start_time.elapsed().as_secs_f64().max(0.001);
        let rate = done as f64 / elapsed;
        println!(
            "  seed {:#010x} ({:.1}%) - {:.2}M seeds/s - ETA: {:.0}m",
            base,
            done as f64 / total as f64 * 100.0,
            rate / 1e6,
            (total - done) as f64 / rate / 60.0
        );
    }

    for (index, writer) in writers.iter_mut().enumerate() {
        writer
            .flush()
            .with_context(|| format!("Failed to flush shard {:02}", index))?;
    }

    println!("{}", "─".repeat(60));
    println!(
        "  ✅ Generation complete: {} entries in {:.1}m",
        total,
        start_time.elapsed().as_secs_f64() / 60.0
    );
    Ok(total)
}
