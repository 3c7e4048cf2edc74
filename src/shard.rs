//! Shard files and the packed entry record.
//!
//! The index is partitioned into 100 shard files selected by
//! `key mod 100`, so a query's computed key always routes to the shard
//! holding its entries. Before sorting, a shard holds packed 64-bit
//! (seed, key) entries in generation order; after sorting it holds bare
//! 32-bit seeds in ascending key order. Both layouts are raw fixed-width
//! little-endian words: no header, no checksum.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Number of shard files the key space is split across.
pub const SHARD_COUNT: u32 = 100;

/// (seed, key) pair, the unit record before sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub seed: u32,
    pub key: u32,
}

impl Entry {
    pub const SIZE: usize = 8;

    /// Single-word form: seed in the high 32 bits, key in the low 32.
    pub fn pack(&self) -> u64 {
        (u64::from(self.seed) << 32) | u64::from(self.key)
    }

    pub fn unpack(word: u64) -> Self {
        Self {
            seed: (word >> 32) as u32,
            key: word as u32,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        self.pack().to_le_bytes()
    }

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        Self::unpack(u64::from_le_bytes(*buf))
    }
}

/// Shard selection; stable across generation and query time.
pub fn shard_index(key: u32) -> u32 {
    key % SHARD_COUNT
}

pub fn shard_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("shard_{:02}.bin", index))
}

/// Read a whole pre-sort shard as packed entries.
pub fn read_entries(path: &Path) -> Result<Vec<Entry>> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read shard file: {}", path.display()))?;
    if data.len() % Entry::SIZE != 0 {
        bail!(
            "Shard file {} is truncated: {} bytes is not a whole number of entries",
            path.display(),
            data.len()
        );
    }
    Ok(data
        .chunks_exact(Entry::SIZE)
        .map(|chunk| {
            let mut buf = [0u8; Entry::SIZE];
            buf.copy_from_slice(chunk);
            Entry::from_bytes(&buf)
        })
        .collect())
}

/// Read a whole post-sort shard as seed words.
pub fn read_seeds(path: &Path) -> Result<Vec<u32>> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read shard file: {}", path.display()))?;
    if data.len() % 4 != 0 {
        bail!(
            "Shard file {} is truncated: {} bytes is not a whole number of seeds",
            path.display(),
            data.len()
        );
    }
    Ok(data
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Replace `path` with the given seed words.
///
/// Writes to a temp file first and renames over the target, so a crash
/// mid-write leaves either the old file or a complete new one, never a
/// torn one.
pub fn write_seeds_atomic(path: &Path, seeds: &[u32]) -> Result<()> {
    let temp_path = path.with_extension("bin.tmp");
    {
        let file = File::create(&temp_path).with_context(|| {
            format!("Failed to create temp shard file: {}", temp_path.display())
        })?;
        let mut writer = BufWriter::with_capacity(8 * 1024 * 1024, file);
        for &seed in seeds {
            writer.write_all(&seed.to_le_bytes())?;
        }
        writer.flush()?;
    }
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp shard file to: {}", path.display()))?;
    Ok(())
}
