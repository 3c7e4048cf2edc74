//! Post-sort consistency gate.
//!
//! Recomputes every seed's key and confirms the ascending order the
//! query path depends on. Off the query path; run it after sorting,
//! before trusting search results.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::digest;
use crate::shard;

/// First adjacent pair that breaks the sort invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortViolation {
    /// Index of the out-of-place element.
    pub index: u64,
    pub prev_key: u32,
    pub key: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    /// Entries scanned before returning.
    pub entries: u64,
    pub violation: Option<SortViolation>,
}

/// Scan a sorted shard and report the first ordering violation, if any.
pub fn check_sorted(dir: &Path, index: u32) -> Result<CheckReport> {
    let path = shard::shard_path(dir, index);
    let file = File::open(&path)
        .with_context(|| format!("Failed to open shard file: {}", path.display()))?;
    let mut reader = BufReader::with_capacity(8 * 1024 * 1024, file);

    let mut buf = [0u8; 4];
    let mut prev_key: Option<u32> = None;
    let mut scanned = 0u64;
    loop {
        match reader.read_exact(&mut buf) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read shard file: {}", path.display()))
            }
        }
        let key = digest::key(u32::from_le_bytes(buf));
        if let Some(prev) = prev_key {
            if prev > key {
                return Ok(CheckReport {
                    entries: scanned + 1,
                    violation: Some(SortViolation {
                        index: scanned,
                        prev_key: prev,
                        key,
                    }),
                });
            }
        }
        prev_key = Some(key);
        scanned += 1;
    }
    Ok(CheckReport {
        entries: scanned,
        violation: None,
    })
}
