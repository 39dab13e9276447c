pub mod codec;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;

pub use codec::Codec;
pub use decode::{decode, scan_index};
pub use encode::encode;
pub use error::{Error, Result};
pub use format::{
    BlockEntry, FrameHeader, StreamIndex, DEFAULT_BLOCK_SIZE, HEADER_SIZE, MAX_BLOCK_SIZE,
};
