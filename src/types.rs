/// One entry of a color table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// How a frame's drawn region is treated before the next frame is
/// composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalMethod {
    /// No disposal specified; behaves like [`DisposalMethod::DoNotDispose`].
    #[default]
    None,
    /// The frame stays on the canvas as the base for the next one.
    DoNotDispose,
    /// The frame's rectangle is cleared to the background color before the
    /// next frame draws.
    RestoreToBackgroundColor,
    /// The canvas reverts to its state from before this frame was drawn.
    RestoreToPrevious,
}

impl DisposalMethod {
    /// Maps the 3-bit packed field of a Graphic Control Extension.
    /// Reserved values fall back to `None`.
    pub(crate) fn from_bits(value: u8) -> Self {
        match value {
            1 => DisposalMethod::DoNotDispose,
            2 => DisposalMethod::RestoreToBackgroundColor,
            3 => DisposalMethod::RestoreToPrevious,
            _ => DisposalMethod::None,
        }
    }

    /// Whether the frame's region is cleared or reverted before the next
    /// frame, the binary view the original decoder contract exposed.
    pub fn should_dispose(self) -> bool {
        matches!(
            self,
            DisposalMethod::RestoreToBackgroundColor | DisposalMethod::RestoreToPrevious
        )
    }
}

/// The sub-rectangle of the logical screen a frame updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
}

impl FrameRect {
    pub(crate) fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// How often the animation is meant to repeat, from the NETSCAPE 2.0
/// application extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCount {
    Infinite,
    Number(u16),
}

/// Metadata and compressed pixel data for one image block.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub rect: FrameRect,
    /// Delay before the next frame, in hundredths of a second. Zero is
    /// valid and means "as fast as possible".
    pub delay: u16,
    pub disposal: DisposalMethod,
    pub transparent_index: Option<u8>,
    pub interlaced: bool,
    pub local_color_table: Option<Vec<Rgb>>,
    pub(crate) minimum_code_size: u8,
    /// The frame's LZW stream with the sub-block framing already removed.
    pub(crate) lzw_data: Vec<u8>,
}

/// The immutable result of parsing a GIF stream. Frame pixel data stays
/// compressed until a frame is materialized through the decoder.
#[derive(Debug, Clone)]
pub struct GifFile {
    pub screen_width: u16,
    pub screen_height: u16,
    pub global_color_table: Option<Vec<Rgb>>,
    pub background_color_index: u8,
    pub frames: Vec<FrameRecord>,
    pub loop_count: Option<LoopCount>,
    /// True when parsing stopped before the trailer (truncated or
    /// malformed input); `frames` holds everything parsed up to there.
    pub truncated: bool,
}
