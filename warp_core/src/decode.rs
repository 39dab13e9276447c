//! Decode pipeline: sequential stream scan → parallel block decompression.
//!
//! The scan is the only place untrusted input is interpreted; it validates
//! every header before any decompression work is scheduled. The parallel
//! phase then writes each block into its own disjoint region of one
//! pre-sized output buffer, so workers never contend.

use rayon::prelude::*;

use crate::codec::Codec;
use crate::error::{Error, FirstError, Result};
use crate::format::{BlockEntry, FrameHeader, StreamIndex, HEADER_SIZE, MAX_BLOCK_SIZE};

/// Decompress a warp stream produced by `encode` with the same codec.
///
/// Fails with `CorruptStream` on malformed headers, payload overrun, or
/// trailing bytes, and with `DecodeMismatch` when a block does not
/// decompress to its declared size. Payload-only bit corruption that keeps
/// every header plausible is undetectable — the format carries no checksum —
/// and may yield wrong bytes rather than an error.
pub fn decode(stream: &[u8], codec: &dyn Codec) -> Result<Vec<u8>> {
    let index = scan_index(stream)?;

    let mut out = Vec::new();
    out.try_reserve_exact(index.raw_size)
        .map_err(|_| Error::OutOfMemory)?;
    out.resize(index.raw_size, 0);

    // Carve the output into one disjoint writable region per block. The
    // index entries tile the buffer contiguously, so this consumes it all.
    let mut regions = Vec::new();
    regions
        .try_reserve_exact(index.entries.len())
        .map_err(|_| Error::OutOfMemory)?;
    let mut rest: &mut [u8] = &mut out;
    for entry in &index.entries {
        let (region, tail) = std::mem::take(&mut rest).split_at_mut(entry.orig_size);
        regions.push(region);
        rest = tail;
    }
    debug_assert!(rest.is_empty(), "index entries must tile the output exactly");

    // ── Fan-out: decompress every block on the shared pool ─────────────────
    let failed = FirstError::new();
    index
        .entries
        .par_iter()
        .zip(regions.par_iter_mut())
        .for_each(|(entry, region)| {
            // The output is already doomed once the cell is set; skip blocks
            // that have not started yet. Started blocks run to completion.
            if failed.is_set() {
                return;
            }
            let payload = &stream[entry.in_offset..entry.in_offset + entry.comp_size];
            if entry.is_stored() {
                region.copy_from_slice(payload);
            } else {
                match codec.decompress_block(payload, region) {
                    Ok(n) if n == entry.orig_size => {}
                    _ => failed.record(Error::DecodeMismatch),
                }
            }
        });

    // ── Fan-in: discard the buffer on any recorded failure ─────────────────
    drop(regions);
    match failed.take() {
        Some(err) => Err(err),
        None => Ok(out),
    }
}

/// Sequentially scan `stream` and build the block index without
/// decompressing anything.
///
/// Two passes: the first validates every header and counts frames, the
/// second fills an exact-capacity index, keeping parsing deterministic and
/// allocation-bounded regardless of the (untrusted) block count.
pub fn scan_index(stream: &[u8]) -> Result<StreamIndex> {
    // ── Pass 1: validate and count ─────────────────────────────────────────
    let mut count = 0usize;
    let mut pos = 0usize;
    while stream.len() - pos >= HEADER_SIZE {
        let header = read_header(stream, pos);
        let orig_size = header.orig_size as usize;
        let comp_size = header.comp_size as usize;
        if orig_size > MAX_BLOCK_SIZE {
            return Err(Error::CorruptStream("block size in header exceeds maximum"));
        }
        if comp_size > stream.len() - pos - HEADER_SIZE {
            return Err(Error::CorruptStream("frame payload overruns stream"));
        }
        pos += HEADER_SIZE + comp_size;
        count += 1;
    }
    if pos != stream.len() {
        return Err(Error::CorruptStream("trailing bytes after last frame"));
    }

    // ── Pass 2: fill the exact-sized index ─────────────────────────────────
    let mut entries = Vec::new();
    entries
        .try_reserve_exact(count)
        .map_err(|_| Error::OutOfMemory)?;
    let mut pos = 0usize;
    let mut out_offset = 0usize;
    for _ in 0..count {
        let header = read_header(stream, pos);
        let orig_size = header.orig_size as usize;
        let comp_size = header.comp_size as usize;
        entries.push(BlockEntry {
            in_offset: pos + HEADER_SIZE,
            out_offset,
            comp_size,
            orig_size,
        });
        pos += HEADER_SIZE + comp_size;
        out_offset += orig_size;
    }

    Ok(StreamIndex {
        entries,
        raw_size: out_offset,
    })
}

/// Read the header starting at `pos`. Callers guarantee `HEADER_SIZE` bytes
/// remain.
fn read_header(stream: &[u8], pos: usize) -> FrameHeader {
    let mut buf = [0u8; HEADER_SIZE];
    buf.copy_from_slice(&stream[pos..pos + HEADER_SIZE]);
    FrameHeader::from_bytes(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FrameHeader;

    /// Hand-build a stream of (orig, payload) frames.
    fn stream_of(frames: &[(u32, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (orig, payload) in frames {
            let header = FrameHeader {
                orig_size: *orig,
                comp_size: payload.len() as u32,
            };
            out.extend_from_slice(&header.to_bytes());
            out.extend_from_slice(payload);
        }
        out
    }

    #[test]
    fn scan_empty_stream() {
        let index = scan_index(&[]).unwrap();
        assert_eq!(index.block_count(), 0);
        assert_eq!(index.raw_size, 0);
    }

    #[test]
    fn scan_walks_offsets() {
        let stream = stream_of(&[(4, b"abcd"), (10, b"xy")]);
        let index = scan_index(&stream).unwrap();
        assert_eq!(index.block_count(), 2);
        assert_eq!(index.raw_size, 14);

        let first = index.entries[0];
        assert_eq!((first.in_offset, first.out_offset), (HEADER_SIZE, 0));
        assert!(first.is_stored());

        let second = index.entries[1];
        assert_eq!(second.in_offset, HEADER_SIZE + 4 + HEADER_SIZE);
        assert_eq!(second.out_offset, 4);
        assert_eq!((second.comp_size, second.orig_size), (2, 10));
        assert!(!second.is_stored());
    }

    #[test]
    fn scan_rejects_oversized_block_header() {
        let stream = stream_of(&[((MAX_BLOCK_SIZE + 1) as u32, b"x")]);
        assert!(matches!(
            scan_index(&stream),
            Err(Error::CorruptStream("block size in header exceeds maximum"))
        ));
    }

    #[test]
    fn scan_rejects_payload_overrun() {
        // Patch the header to claim 100 payload bytes when only 3 follow.
        let mut tampered = stream_of(&[(100, b"abc")]);
        tampered[4..8].copy_from_slice(&100u32.to_le_bytes());
        assert!(matches!(
            scan_index(&tampered),
            Err(Error::CorruptStream("frame payload overruns stream"))
        ));
    }

    #[test]
    fn scan_rejects_trailing_bytes() {
        let mut stream = stream_of(&[(4, b"abcd")]);
        stream.extend_from_slice(&[0, 1, 2]); // less than a header
        assert!(matches!(
            scan_index(&stream),
            Err(Error::CorruptStream("trailing bytes after last frame"))
        ));
    }
}
