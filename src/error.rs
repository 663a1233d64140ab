use thiserror::Error;

/// Everything that can go wrong while parsing a GIF stream or
/// materializing one of its frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("signature is invalid, not a GIF87a/GIF89a stream")]
    BadSignature,

    #[error("data ended in the middle of a block")]
    TruncatedData,

    #[error("encountered unexpected block introducer 0x{0:02x}, this block is not supported")]
    MalformedBlock(u8),

    #[error("LZW minimum code size {0} is out of range")]
    InvalidCodeSize(u8),

    #[error("LZW code {code} references a dictionary slot that does not exist yet (next free slot is {next})")]
    InvalidLzwCode { code: u16, next: u16 },

    #[error("pixel index {index} exceeds the color table of {table_len} entries")]
    InvalidColorIndex { index: u8, table_len: usize },

    #[error("frame has no local color table and the stream has no global color table")]
    MissingColorTable,

    #[error("frame index {index} is out of range, the stream has {count} frames")]
    IndexOutOfRange { index: usize, count: usize },
}
