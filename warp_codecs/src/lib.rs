mod lz4_codec;
mod passthrough;
mod zstd_codec;

pub use lz4_codec::Lz4Codec;
pub use passthrough::PassThroughCodec;
pub use zstd_codec::ZstdCodec;

use warp_core::Codec;

/// Resolve a codec from a CLI name.
///
/// A warp stream does not record which codec produced it, so the caller has
/// to name the same codec on both sides; this is the one lookup the CLI uses
/// for that.
pub fn codec_by_name(name: &str, zstd_level: i32) -> anyhow::Result<Box<dyn Codec>> {
    match name {
        "lz4" | "l" => Ok(Box::new(Lz4Codec)),
        "zstd" | "z" => Ok(Box::new(ZstdCodec::new(zstd_level))),
        "passthrough" | "pass" | "none" => Ok(Box::new(PassThroughCodec)),
        other => anyhow::bail!(
            "unknown codec '{}'. Valid options: lz4, zstd, passthrough",
            other
        ),
    }
}
