//! The codec seam between the container and the byte-level compressor.

/// Core compression abstraction.
///
/// Each `Codec` implementation:
/// - Must compress/decompress individual blocks independently — no
///   cross-block state is permitted. This is the invariant that lets the
///   container fan blocks out across threads.
/// - Works in caller-provided destination buffers, so parallel workers can
///   target disjoint regions of a single allocation without copying.
pub trait Codec: Send + Sync {
    /// Human-readable codec name for CLI display.
    fn name(&self) -> &'static str;

    /// Worst-case compressed size for a block of `raw_len` bytes.
    ///
    /// `compress_block` is always handed a destination at least this large,
    /// so a conforming codec never runs out of room.
    fn max_compressed_len(&self, raw_len: usize) -> usize;

    /// Compress a single independent block into `dst`, returning the number
    /// of bytes written.
    ///
    /// An error here is not fatal to the stream: the encoder falls back to
    /// storing the block raw, exactly as it does when compression fails to
    /// shrink the block.
    fn compress_block(&self, raw: &[u8], dst: &mut [u8]) -> anyhow::Result<usize>;

    /// Decompress a single independent block into `dst`, returning the
    /// number of bytes written.
    ///
    /// `dst` is sized exactly to the block's declared original size; writing
    /// any other number of bytes is reported by the decoder as a mismatch.
    fn decompress_block(&self, compressed: &[u8], dst: &mut [u8]) -> anyhow::Result<usize>;
}
