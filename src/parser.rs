use crate::error::DecodeError;
use crate::reader::ByteReader;
use crate::types::{DisposalMethod, FrameRecord, FrameRect, GifFile, LoopCount};

use log::debug;

const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_DESCRIPTOR_LABEL: u8 = 0x2c;
const TRAILER_LABEL: u8 = 0x3b;

// Extension labels
const APPLICATION_EXTENSION: u8 = 0xff;
const COMMENT_EXTENSION: u8 = 0xfe;
const GRAPHIC_CONTROL_EXTENSION: u8 = 0xf9;
const PLAIN_TEXT_EXTENSION: u8 = 0x01;

/// Pending Graphic Control Extension values. They apply to exactly the
/// next image descriptor and reset to these defaults afterwards.
#[derive(Debug, Clone, Copy, Default)]
struct GraphicControl {
    delay: u16,
    disposal: DisposalMethod,
    transparent_index: Option<u8>,
}

#[derive(Debug)]
enum BlockState {
    Dispatch(Option<GraphicControl>),
    Extension(u8, Option<GraphicControl>),
    ImageDescriptor(Option<GraphicControl>),
    Done,
}

struct Parser<'a> {
    reader: ByteReader<'a>,
    screen_width: u16,
    screen_height: u16,
    frames: Vec<FrameRecord>,
    loop_count: Option<LoopCount>,
}

/// Walks the whole buffer once and extracts every frame's metadata and
/// compressed data eagerly; nothing is decompressed here.
///
/// Construction fails only when the stream is not a GIF at all or ends
/// before the logical screen descriptor is complete. Errors encountered
/// while iterating blocks stop parsing and return the frames collected so
/// far, with [`GifFile::truncated`] set.
pub(crate) fn parse(data: &[u8]) -> Result<GifFile, DecodeError> {
    let mut reader = ByteReader::new(data);

    let signature = reader
        .read_bytes(6)
        .map_err(|_| DecodeError::BadSignature)?;
    match signature {
        b"GIF87a" | b"GIF89a" => {}
        _ => return Err(DecodeError::BadSignature),
    }
    debug!("processed signature, got {}", String::from_utf8_lossy(signature));

    let screen_width = reader.read_u16()?;
    let screen_height = reader.read_u16()?;

    let packed_fields = reader.read_u8()?;
    let global_color_table_flag = packed_fields & 0b1000_0000 != 0;
    let global_color_table_entries = 1usize << ((packed_fields & 0b0000_0111) + 1);

    let background_color_index = reader.read_u8()?;
    let _pixel_aspect_ratio = reader.read_u8()?;

    debug!(
        "processed logical screen descriptor, {}x{}, global color table: {}",
        screen_width, screen_height, global_color_table_flag
    );

    let global_color_table = if global_color_table_flag {
        Some(reader.read_color_table(global_color_table_entries)?)
    } else {
        None
    };

    let mut parser = Parser {
        reader,
        screen_width,
        screen_height,
        frames: Vec::new(),
        loop_count: None,
    };
    let truncated = parser.parse_blocks();

    Ok(GifFile {
        screen_width,
        screen_height,
        global_color_table,
        background_color_index,
        frames: parser.frames,
        loop_count: parser.loop_count,
        truncated,
    })
}

impl<'a> Parser<'a> {
    /// Runs the block state machine until the trailer, buffer end, or the
    /// first structural error. Returns whether parsing stopped early.
    fn parse_blocks(&mut self) -> bool {
        let mut state = BlockState::Dispatch(None);

        loop {
            debug!("begin parsing state {:?}", state);

            state = match self.process_next_state(state) {
                Ok(BlockState::Done) => return false,
                Ok(next) => next,
                Err(err) => {
                    // Animated GIFs are often streamed or cut short; keep
                    // every frame parsed up to this point.
                    debug!("parsing stopped after {} frames: {}", self.frames.len(), err);
                    return true;
                }
            };
        }
    }

    fn process_next_state(&mut self, state: BlockState) -> Result<BlockState, DecodeError> {
        use BlockState::*;

        match state {
            Dispatch(control) => {
                // a stream that simply stops at a block boundary is
                // complete apart from its missing trailer
                if self.reader.is_empty() {
                    return Ok(Done);
                }

                let introducer = self.reader.read_u8()?;
                match introducer {
                    // extension introducer means that a label follows
                    // determining what exact type of extension it is.
                    EXTENSION_INTRODUCER => Ok(Extension(self.reader.read_u8()?, control)),
                    IMAGE_DESCRIPTOR_LABEL => Ok(ImageDescriptor(control)),
                    TRAILER_LABEL => Ok(Done),
                    label => Err(DecodeError::MalformedBlock(label)),
                }
            }
            Extension(label, control) => self.process_extension(label, control),
            ImageDescriptor(control) => {
                let left = self.reader.read_u16()?;
                let top = self.reader.read_u16()?;
                let width = self.reader.read_u16()?;
                let height = self.reader.read_u16()?;

                let packed_fields = self.reader.read_u8()?;
                let local_color_table_flag = packed_fields & 0b1000_0000 != 0;
                let interlaced = packed_fields & 0b0100_0000 != 0;
                let local_color_table_entries = 1usize << ((packed_fields & 0b0000_0111) + 1);

                // the logical screen bounds every frame rectangle
                if left as u32 + width as u32 > self.screen_width as u32
                    || top as u32 + height as u32 > self.screen_height as u32
                {
                    return Err(DecodeError::MalformedBlock(IMAGE_DESCRIPTOR_LABEL));
                }

                let local_color_table = if local_color_table_flag {
                    Some(self.reader.read_color_table(local_color_table_entries)?)
                } else {
                    None
                };

                let minimum_code_size = self.reader.read_u8()?;
                let lzw_data = self.reader.read_sub_blocks()?;

                let control = control.unwrap_or_default();
                self.frames.push(FrameRecord {
                    rect: FrameRect {
                        left,
                        top,
                        width,
                        height,
                    },
                    delay: control.delay,
                    disposal: control.disposal,
                    transparent_index: control.transparent_index,
                    interlaced,
                    local_color_table,
                    minimum_code_size,
                    lzw_data,
                });
                debug!("processed image descriptor, frame {}", self.frames.len() - 1);

                Ok(Dispatch(None))
            }
            Done => Ok(Done),
        }
    }

    fn process_extension(
        &mut self,
        label: u8,
        control: Option<GraphicControl>,
    ) -> Result<BlockState, DecodeError> {
        match label {
            GRAPHIC_CONTROL_EXTENSION => {
                // the fixed-size GCE body is always 4 bytes; anything else
                // would desynchronize the block stream
                let block_size = self.reader.read_u8()?;
                if block_size != 4 {
                    return Err(DecodeError::MalformedBlock(block_size));
                }

                let packed_fields = self.reader.read_u8()?;
                // packed fields definition
                // XXXYYYZW
                // XXX = reserved
                // YYY = disposal method
                // Z = user input flag
                // W = transparent color flag
                let disposal = DisposalMethod::from_bits((packed_fields >> 2) & 0b0000_0111);
                let transparent_color_flag = packed_fields & 0b0000_0001 != 0;

                let delay = self.reader.read_u16()?;
                let transparent_color_index = self.reader.read_u8()?;

                let block_terminator = self.reader.read_u8()?;
                if block_terminator != 0 {
                    return Err(DecodeError::MalformedBlock(block_terminator));
                }

                let control = GraphicControl {
                    delay,
                    disposal,
                    transparent_index: transparent_color_flag.then_some(transparent_color_index),
                };
                debug!("processed graphic control extension: {:?}", control);

                Ok(BlockState::Dispatch(Some(control)))
            }
            APPLICATION_EXTENSION => {
                let block_size = self.reader.read_u8()?;
                let header = self.reader.read_bytes(block_size.into())?;
                let data = self.reader.read_sub_blocks()?;

                if header.len() == 11
                    && &header[..8] == b"NETSCAPE"
                    && &header[8..] == b"2.0"
                    && data.len() == 3
                    && data[0] == 1
                {
                    let loop_number = u16::from_le_bytes([data[1], data[2]]);
                    self.loop_count = Some(match loop_number {
                        0 => LoopCount::Infinite,
                        number => LoopCount::Number(number),
                    });
                    debug!("processed NETSCAPE extension, loop count {:?}", self.loop_count);
                }

                Ok(BlockState::Dispatch(control))
            }
            COMMENT_EXTENSION | PLAIN_TEXT_EXTENSION => {
                self.reader.skip_sub_blocks()?;
                Ok(BlockState::Dispatch(control))
            }
            _ => {
                // unknown extensions still use the sub-block layout and can
                // be skipped without interpreting them
                debug!("skipping unknown extension 0x{:02x}", label);
                self.reader.skip_sub_blocks()?;
                Ok(BlockState::Dispatch(control))
            }
        }
    }
}
