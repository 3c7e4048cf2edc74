//! Sorted-shard lookup: exponential probe, backward scan, full
//! verification.
//!
//! Only seeds are persisted after sorting, so every probe recomputes
//! the probed seed's key through the digest; the cost is O(log n)
//! digest reruns per query in exchange for a 4-byte record. The probe
//! finds the largest index whose key is at most the target using
//! descending power-of-two steps, then the scan walks backward across
//! the equal-key run verifying each candidate against the full
//! observed sequence. Correctness of the probe relies on the sorted
//! shard being in strictly ascending key order; the consistency
//! checker treats any violation as a defect.

use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

use crate::digest::{self, KEY_DRAWS, MAX_QUERY_DRAWS};
use crate::shard;

/// Query input rejected before any shard access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("query supplies {0} draws, expected 7 to 15")]
    BadLength(usize),
    #[error("draw {value} at position {index} is outside [0, 16]")]
    BadDraw { index: usize, value: u8 },
}

/// A seed whose draws reproduce the observed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub seed: u32,
    pub key: u32,
}

/// Reject malformed queries before touching any shard file.
pub fn validate(observed: &[u8]) -> Result<(), QueryError> {
    if observed.len() < KEY_DRAWS || observed.len() > MAX_QUERY_DRAWS {
        return Err(QueryError::BadLength(observed.len()));
    }
    if let Some((index, &value)) = observed
        .iter()
        .enumerate()
        .find(|&(_, &d)| u64::from(d) >= digest::DRAW_RADIX)
    {
        return Err(QueryError::BadDraw { index, value });
    }
    Ok(())
}

/// Find every seed in the index whose first `observed.len()` draws
/// equal `observed`. An empty result is a valid outcome; seeds that
/// share the 7-draw key but fail the longer comparison are silently
/// excluded.
pub fn search(dir: &Path, observed: &[u8]) -> Result<Vec<Match>> {
    validate(observed)?;

    let target = digest::encode(observed);
    let path = shard::shard_path(dir, shard::shard_index(target));
    let file = File::open(&path)
        .with_context(|| format!("Failed to open shard file: {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat shard file: {}", path.display()))?
        .len();
    if len == 0 {
        // An empty shard cannot be mapped, and has nothing to match.
        return Ok(Vec::new());
    }
    if len % 4 != 0 {
        bail!(
            "Shard file {} is truncated: {} bytes is not a whole number of seeds",
            path.display(),
            len
        );
    }
    // Safety: shard files are written once and replaced atomically by
    // the sorter; nothing mutates them in place while mapped.
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map shard file: {}", path.display()))?;
    let size = len / 4;

    let seed_at = |pos: u64| {
        let at = pos as usize * 4;
        u32::from_le_bytes([map[at], map[at + 1], map[at + 2], map[at + 3]])
    };

    // Largest index whose key is <= target.
    let mut pos = 0u64;
    for step in (0..32).rev() {
        let next = pos + (1u64 << step);
        if next < size && digest::key(seed_at(next)) <= target {
            pos = next;
        }
    }

    let mut matches = Vec::new();
    loop {
        let seed = seed_at(pos);
        if digest::key(seed) != target {
            break;
        }
        if digest::matches(seed, observed) {
            matches.push(Match { seed, key: target });
        }
        if pos == 0 {
            break;
        }
        pos -= 1;
    }
    Ok(matches)
}
