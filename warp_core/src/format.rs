//! Wire-format constants and the block index.
//!
//! A warp stream is nothing but frames laid end to end:
//!
//! ```text
//! [FRAME 0] [FRAME 1] ... [FRAME N-1]
//! frame = [orig_size: u32 LE][comp_size: u32 LE][payload: comp_size bytes]
//! ```
//!
//! There is no magic number, version tag, or checksum — frame order encodes
//! the only structure, and `comp_size == orig_size` is the only signal that a
//! payload is stored raw. Producer and consumer must agree on the codec out
//! of band; the format is deliberately not self-describing.

/// Fixed size of each frame header in bytes: two little-endian u32 values.
pub const HEADER_SIZE: usize = 8;

/// Upper bound on the original size of a single block: 512 MiB.
/// Headers declaring more than this are rejected as corrupt.
pub const MAX_BLOCK_SIZE: usize = 512 * 1024 * 1024;

/// Default nominal raw bytes per block: 1 MiB.
/// Inputs smaller than this default to a single block.
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

// ── Frame header ───────────────────────────────────────────────────────────

/// The 8-byte `(orig_size, comp_size)` pair preceding each payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Original (uncompressed) size of the block.
    pub orig_size: u32,
    /// Stored payload size; equal to `orig_size` when the block is raw.
    pub comp_size: u32,
}

impl FrameHeader {
    /// Serialize to exactly `HEADER_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.orig_size.to_le_bytes());
        buf[4..8].copy_from_slice(&self.comp_size.to_le_bytes());
        buf
    }

    /// Deserialize from `HEADER_SIZE` bytes. Infallible: any bit pattern is
    /// a syntactically valid header; range checks live in the stream scan.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let [a, b, c, d, e, f, g, h] = *buf;
        Self {
            orig_size: u32::from_le_bytes([a, b, c, d]),
            comp_size: u32::from_le_bytes([e, f, g, h]),
        }
    }
}

// ── Block index ────────────────────────────────────────────────────────────

/// One entry in the block index — locates one frame's payload in the stream
/// and its destination range in the decoded output.
#[derive(Debug, Clone, Copy)]
pub struct BlockEntry {
    /// Byte offset of the payload (just past the header) in the stream.
    pub in_offset: usize,
    /// Byte offset of this block in the decoded output: the running sum of
    /// all preceding `orig_size` values.
    pub out_offset: usize,
    /// Stored payload size in bytes.
    pub comp_size: usize,
    /// Original (decoded) size in bytes.
    pub orig_size: usize,
}

impl BlockEntry {
    /// True when the payload is the original bytes, stored unmodified.
    #[inline]
    pub fn is_stored(&self) -> bool {
        self.comp_size == self.orig_size
    }
}

/// Index built by one sequential scan of a stream (see `scan_index`).
///
/// Entries appear in stream order; their `out_offset` ranges tile the
/// decoded output contiguously, which is what lets the decoder hand every
/// block a disjoint destination region.
#[derive(Debug, Clone)]
pub struct StreamIndex {
    pub entries: Vec<BlockEntry>,
    /// Total decompressed size: sum of all `orig_size` values.
    pub raw_size: usize,
}

impl StreamIndex {
    /// Number of frames in the stream.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.entries.len()
    }

    /// Total payload bytes (excluding the 8-byte headers).
    pub fn compressed_size(&self) -> usize {
        self.entries.iter().map(|e| e.comp_size).sum()
    }

    /// Number of blocks stored raw via the incompressible bypass.
    pub fn stored_blocks(&self) -> usize {
        self.entries.iter().filter(|e| e.is_stored()).count()
    }

    /// Compression ratio (raw / compressed payload bytes).
    pub fn ratio(&self) -> f64 {
        let compressed = self.compressed_size();
        if compressed == 0 {
            return 1.0;
        }
        self.raw_size as f64 / compressed as f64
    }
}
