use crate::compositor::{CachePolicy, FrameCompositor};
use crate::error::DecodeError;
use crate::parser;
use crate::types::{DisposalMethod, FrameRect, GifFile, LoopCount};

/// Decodes a complete GIF87a/GIF89a byte buffer into composited frames.
///
/// All frame metadata is parsed up front; pixel data is decompressed and
/// composited on demand through [`GifDecoder::frame_at`]. One decoder owns
/// one canvas, so materialization calls must be serialized by the caller;
/// `frame_at` taking `&mut self` enforces that within safe Rust.
#[derive(Debug)]
pub struct GifDecoder {
    file: GifFile,
    compositor: FrameCompositor,
}

impl GifDecoder {
    /// Parses `data` with the default [`CachePolicy::MemoizeFrames`].
    pub fn new(data: &[u8]) -> Result<Self, DecodeError> {
        Self::with_policy(data, CachePolicy::default())
    }

    pub fn with_policy(data: &[u8], policy: CachePolicy) -> Result<Self, DecodeError> {
        let file = parser::parse(data)?;
        let compositor = FrameCompositor::new(&file, policy);
        Ok(GifDecoder { file, compositor })
    }

    pub fn frame_count(&self) -> usize {
        self.file.frames.len()
    }

    /// Per-frame delays in hundredths of a second, in frame order.
    pub fn delays(&self) -> Vec<u16> {
        self.file.frames.iter().map(|frame| frame.delay).collect()
    }

    pub fn disposal_methods(&self) -> Vec<DisposalMethod> {
        self.file
            .frames
            .iter()
            .map(|frame| frame.disposal)
            .collect()
    }

    /// Convenience view of [`GifDecoder::disposal_methods`]: whether each
    /// frame's region is cleared or reverted before the next frame.
    pub fn should_dispose(&self) -> Vec<bool> {
        self.file
            .frames
            .iter()
            .map(|frame| frame.disposal.should_dispose())
            .collect()
    }

    pub fn frame_rects(&self) -> Vec<FrameRect> {
        self.file.frames.iter().map(|frame| frame.rect).collect()
    }

    /// Materializes frame `index` as an RGBA buffer of
    /// `screen_width * screen_height * 4` bytes, row major.
    ///
    /// Frames can be requested in any order and repeatedly; the result is
    /// identical either way. A decode error in one frame's compressed data
    /// does not affect other frames or the parsed metadata.
    pub fn frame_at(&mut self, index: usize) -> Result<Vec<u8>, DecodeError> {
        if index >= self.file.frames.len() {
            return Err(DecodeError::IndexOutOfRange {
                index,
                count: self.file.frames.len(),
            });
        }
        self.compositor.materialize(&self.file, index)
    }

    pub fn screen_width(&self) -> u16 {
        self.file.screen_width
    }

    pub fn screen_height(&self) -> u16 {
        self.file.screen_height
    }

    /// True when the stream ended early or hit a malformed block;
    /// the frames parsed before that point are still usable.
    pub fn is_truncated(&self) -> bool {
        self.file.truncated
    }

    pub fn loop_count(&self) -> Option<LoopCount> {
        self.file.loop_count
    }

    /// The underlying parse result, for metadata consumers.
    pub fn file(&self) -> &GifFile {
        &self.file
    }
}
