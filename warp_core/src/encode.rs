//! Encode pipeline: block planning → parallel compression → frame assembly.
//!
//! Blocks are handed to rayon's work-stealing pool and may finish in any
//! order, but every block owns a pre-determined results slot, so the
//! assembled stream always reflects input order. The fan-out shares exactly
//! one piece of mutable state: the write-once error cell.

use rayon::prelude::*;

use crate::codec::Codec;
use crate::error::{Error, FirstError, Result};
use crate::format::{FrameHeader, DEFAULT_BLOCK_SIZE, HEADER_SIZE, MAX_BLOCK_SIZE};

/// One contiguous slice of the input, compressed independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockSpan {
    pub offset: usize,
    pub len: usize,
}

/// Output of one encode worker: the exact-sized payload for one block.
/// `payload.len()` is the frame's `comp_size`; equal to `orig_size` when the
/// block is stored raw.
struct BlockResult {
    orig_size: usize,
    payload: Vec<u8>,
}

/// Compress `input` into a warp stream.
///
/// `block_size` defaults to `min(1 MiB, input.len())` and must be in
/// `1..=MAX_BLOCK_SIZE`. Empty input produces an empty stream.
///
/// The stream does not record which codec produced it; `decode` must be
/// called with the same codec.
pub fn encode(input: &[u8], codec: &dyn Codec, block_size: Option<usize>) -> Result<Vec<u8>> {
    let block_size = block_size.unwrap_or_else(|| default_block_size(input.len()));
    let spans = plan_blocks(input.len(), block_size)?;

    // ── Fan-out: compress every block on the shared pool ───────────────────
    let failed = FirstError::new();
    let results: Vec<Option<BlockResult>> = spans
        .par_iter()
        .map(|span| {
            let raw = &input[span.offset..span.offset + span.len];
            match encode_block(codec, raw) {
                Ok(block) => Some(block),
                Err(err) => {
                    // This worker abandons its block; the rest run to
                    // completion and their payloads are dropped below.
                    failed.record(err);
                    None
                }
            }
        })
        .collect();

    // ── Fan-in: first error wins, no partial output ────────────────────────
    if let Some(err) = failed.take() {
        return Err(err);
    }
    let blocks: Vec<BlockResult> = results.into_iter().flatten().collect();
    assemble_frames(&blocks)
}

/// Default block size for an input of `input_len` bytes: `min(1 MiB, len)`.
/// The lower clamp only matters for empty input, which plans zero blocks.
fn default_block_size(input_len: usize) -> usize {
    input_len.clamp(1, DEFAULT_BLOCK_SIZE)
}

/// Split `input_len` bytes into `ceil(input_len / block_size)` contiguous,
/// non-overlapping spans. Only the last span may be short.
pub(crate) fn plan_blocks(input_len: usize, block_size: usize) -> Result<Vec<BlockSpan>> {
    if block_size == 0 || block_size > MAX_BLOCK_SIZE {
        return Err(Error::InvalidConfiguration(block_size));
    }
    let count = input_len.div_ceil(block_size);
    let mut spans = Vec::new();
    spans
        .try_reserve_exact(count)
        .map_err(|_| Error::OutOfMemory)?;
    for i in 0..count {
        let offset = i * block_size;
        spans.push(BlockSpan {
            offset,
            len: block_size.min(input_len - offset),
        });
    }
    Ok(spans)
}

/// Compress one block, falling back to raw storage whenever the codec fails
/// or does not strictly shrink the block.
fn encode_block(codec: &dyn Codec, raw: &[u8]) -> Result<BlockResult> {
    let bound = codec.max_compressed_len(raw.len());
    let mut payload = Vec::new();
    payload
        .try_reserve_exact(bound.max(raw.len()))
        .map_err(|_| Error::OutOfMemory)?;
    payload.resize(bound, 0);

    match codec.compress_block(raw, &mut payload) {
        Ok(n) if n < raw.len() => {
            payload.truncate(n);
            payload.shrink_to_fit();
        }
        // Expansion or a codec error both mean the block goes into the
        // stream unmodified.
        _ => {
            payload.clear();
            payload.extend_from_slice(raw);
            payload.shrink_to_fit();
        }
    }

    Ok(BlockResult {
        orig_size: raw.len(),
        payload,
    })
}

/// Serialize headers and payloads, in block order, into one output buffer.
/// Runs strictly after the fan-in barrier and only on a clean run.
fn assemble_frames(blocks: &[BlockResult]) -> Result<Vec<u8>> {
    let total: usize = blocks.iter().map(|b| HEADER_SIZE + b.payload.len()).sum();
    let mut out = Vec::new();
    out.try_reserve_exact(total).map_err(|_| Error::OutOfMemory)?;

    for block in blocks {
        let header = FrameHeader {
            orig_size: block.orig_size as u32,
            comp_size: block.payload.len() as u32,
        };
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&block.payload);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_splits_exactly() {
        let spans = plan_blocks(10, 4).unwrap();
        assert_eq!(
            spans,
            vec![
                BlockSpan { offset: 0, len: 4 },
                BlockSpan { offset: 4, len: 4 },
                BlockSpan { offset: 8, len: 2 },
            ]
        );
    }

    #[test]
    fn plan_single_block_when_size_covers_input() {
        let spans = plan_blocks(100, 100).unwrap();
        assert_eq!(spans, vec![BlockSpan { offset: 0, len: 100 }]);
        let spans = plan_blocks(100, 1000).unwrap();
        assert_eq!(spans, vec![BlockSpan { offset: 0, len: 100 }]);
    }

    #[test]
    fn plan_empty_input_plans_nothing() {
        assert!(plan_blocks(0, 4).unwrap().is_empty());
    }

    #[test]
    fn plan_rejects_zero_and_oversized_block() {
        assert_eq!(plan_blocks(10, 0), Err(Error::InvalidConfiguration(0)));
        assert_eq!(
            plan_blocks(10, MAX_BLOCK_SIZE + 1),
            Err(Error::InvalidConfiguration(MAX_BLOCK_SIZE + 1))
        );
        // The boundary itself is allowed.
        assert_eq!(plan_blocks(10, MAX_BLOCK_SIZE).unwrap().len(), 1);
    }

    #[test]
    fn default_block_size_tracks_small_inputs() {
        assert_eq!(default_block_size(500), 500);
        assert_eq!(default_block_size(DEFAULT_BLOCK_SIZE * 3), DEFAULT_BLOCK_SIZE);
        assert_eq!(default_block_size(0), 1);
    }
}
