//! Decode-only GIF library: container parsing, LZW decompression, and
//! disposal-aware frame compositing.
//!
//! ```no_run
//! use gifdec::GifDecoder;
//!
//! # fn main() -> Result<(), gifdec::DecodeError> {
//! # let bytes: Vec<u8> = Vec::new();
//! let mut decoder = GifDecoder::new(&bytes)?;
//! for index in 0..decoder.frame_count() {
//!     let rgba = decoder.frame_at(index)?;
//!     let delay = decoder.delays()[index];
//!     // hand `rgba` and `delay` to whatever displays the animation
//! }
//! # Ok(())
//! # }
//! ```

mod bit_reader;
mod compositor;
mod decoder;
mod error;
mod lzw;
mod parser;
mod reader;
mod types;

pub use compositor::CachePolicy;
pub use decoder::GifDecoder;
pub use error::DecodeError;
pub use types::{DisposalMethod, FrameRecord, FrameRect, GifFile, LoopCount, Rgb};
