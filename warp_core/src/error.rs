//! The single error type for the container core, plus the shared
//! first-error-wins cell used by the parallel encode/decode fan-outs.
//!
//! Every failure surfaces as exactly one of these variants and is strictly
//! all-or-nothing: no partial stream or output buffer ever escapes a failed
//! call. A codec that fails on a single block is *not* represented here —
//! the encoder stores that block raw instead (see `encode`).

use std::sync::OnceLock;

use thiserror::Error;

use crate::format::MAX_BLOCK_SIZE;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested block size is zero or above `MAX_BLOCK_SIZE`.
    /// Checked before any work starts; nothing has been allocated.
    #[error("invalid block size {0}: must be in 1..={max}", max = MAX_BLOCK_SIZE)]
    InvalidConfiguration(usize),

    /// An input-proportional allocation failed. The whole call aborts and
    /// every buffer already produced by other workers is released.
    #[error("out of memory")]
    OutOfMemory,

    /// The stream failed header validation during the sequential scan.
    /// Detected before any decompression work is scheduled.
    #[error("corrupt stream: {0}")]
    CorruptStream(&'static str),

    /// A block decompressed to a length other than its declared original
    /// size (or the codec rejected its payload outright).
    #[error("decoded block size does not match its frame header")]
    DecodeMismatch,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Write-once error cell shared across a worker fan-out.
///
/// The first worker to record an error wins; later records are dropped.
/// The cell is monotonic — it is never cleared mid-operation — so readers
/// may poll it freely without locking.
#[derive(Debug, Default)]
pub struct FirstError(OnceLock<Error>);

impl FirstError {
    pub fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Record `err` unless another worker already recorded one.
    pub fn record(&self, err: Error) {
        let _ = self.0.set(err);
    }

    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }

    /// Consume the cell after the fan-in barrier.
    pub fn take(self) -> Option<Error> {
        self.0.into_inner()
    }
}
