use warp_core::Codec;

/// Zstandard block codec.
///
/// Each block is compressed independently at the configured level
/// (default: 3). Slower than LZ4 but denser; a good fit for text, JSON,
/// logs, and mixed structured data.
pub struct ZstdCodec {
    /// Compression level (1 = fast / larger, 22 = slow / smallest).
    pub level: i32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self { level: 3 }
    }
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn max_compressed_len(&self, raw_len: usize) -> usize {
        zstd::zstd_safe::compress_bound(raw_len)
    }

    fn compress_block(&self, raw: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
        let n = zstd::bulk::compress_to_buffer(raw, dst, self.level)?;
        Ok(n)
    }

    fn decompress_block(&self, compressed: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
        let n = zstd::bulk::decompress_to_buffer(compressed, dst)?;
        Ok(n)
    }
}
