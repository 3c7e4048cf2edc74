//! seedtable - reverse index over the 32-bit SFMT seed space.
//!
//! Every 32-bit seed deterministically yields a sequence of draws in
//! [0, 16]; the first seven draws fold into a base-17 "observation
//! key". The index materializes every (seed, key) pair into 100
//! key-partitioned shard files, sorts each shard by key, and recovers
//! the candidate seeds for an observed draw sequence with an
//! exponential probe plus full-sequence verification.
//!
//! Data flows strictly generate -> sort -> query; the consistency
//! checker consumes sorted shards only and sits off the query path.

pub mod check;
pub mod digest;
pub mod generate;
pub mod query;
pub mod radix;
pub mod sfmt;
pub mod shard;
pub mod sort;

pub use digest::{draws, encode, key, WordSource};
pub use query::{search, Match, QueryError};
pub use sfmt::Sfmt;
pub use shard::{Entry, SHARD_COUNT};
