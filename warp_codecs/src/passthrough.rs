use warp_core::Codec;

/// No-op codec: never shrinks a block, so every block takes the raw-store
/// path and the stream is the input plus one 8-byte header per block.
///
/// Useful for:
/// - Verifying the container round-trip independently of any codec.
/// - Data that is already compressed (e.g., JPEG, MP4) where further
///   compression would only burn CPU.
pub struct PassThroughCodec;

impl Codec for PassThroughCodec {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn max_compressed_len(&self, raw_len: usize) -> usize {
        raw_len
    }

    fn compress_block(&self, raw: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
        dst[..raw.len()].copy_from_slice(raw);
        Ok(raw.len())
    }

    fn decompress_block(&self, compressed: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
        dst[..compressed.len()].copy_from_slice(compressed);
        Ok(compressed.len())
    }
}
