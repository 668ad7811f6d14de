//! Trace hash types
//!
//! Trace hashes are plain `u64`s and sets of them use `FxHashSet`, so keys
//! are stored inline and hashed with a single multiply.

use fxhash::FxHashSet;

/// Fingerprint of one indivisible unit of data read from a storage snapshot
pub type ReadTraceHash = u64;

/// All trace hashes touched by one logical read
pub type ReadTraceHashSet = FxHashSet<ReadTraceHash>;

/// Build a [`ReadTraceHashSet`] from any iterator of hashes
pub fn trace_set<I>(traces: I) -> ReadTraceHashSet
where
    I: IntoIterator<Item = ReadTraceHash>,
{
    traces.into_iter().collect()
}
