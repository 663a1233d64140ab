//! In-memory GIF construction for tests: packs palette indices into a
//! valid LZW stream, frames them in sub-blocks, and assembles the
//! surrounding container structure.

pub const RED: [u8; 3] = [255, 0, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];
pub const BLACK: [u8; 3] = [0, 0, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Expands an RGB triple to the opaque RGBA pixel the decoder emits.
pub fn rgba(color: [u8; 3]) -> [u8; 4] {
    [color[0], color[1], color[2], 0xff]
}

#[derive(Clone)]
pub struct FrameSpec {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    /// Palette indices, row major. Must hold `width * height` entries.
    pub indices: Vec<u8>,
    pub delay: u16,
    /// Raw 3-bit disposal value as written into the GCE packed field.
    pub disposal: u8,
    pub transparent_index: Option<u8>,
    pub local_table: Option<Vec<[u8; 3]>>,
    pub interlaced: bool,
}

impl FrameSpec {
    pub fn full(width: u16, height: u16, index: u8) -> Self {
        FrameSpec {
            left: 0,
            top: 0,
            width,
            height,
            indices: vec![index; width as usize * height as usize],
            delay: 0,
            disposal: 0,
            transparent_index: None,
            local_table: None,
            interlaced: false,
        }
    }

    pub fn rect(left: u16, top: u16, width: u16, height: u16, index: u8) -> Self {
        FrameSpec {
            left,
            top,
            ..Self::full(width, height, index)
        }
    }

    pub fn delay(mut self, delay: u16) -> Self {
        self.delay = delay;
        self
    }

    pub fn disposal(mut self, disposal: u8) -> Self {
        self.disposal = disposal;
        self
    }
}

pub struct GifBuilder {
    width: u16,
    height: u16,
    global_table: Vec<[u8; 3]>,
    background_index: u8,
    loop_count: Option<u16>,
    frames: Vec<FrameSpec>,
}

impl GifBuilder {
    /// `global_table` length must be a power of two between 2 and 256.
    pub fn new(width: u16, height: u16, global_table: Vec<[u8; 3]>) -> Self {
        GifBuilder {
            width,
            height,
            global_table,
            background_index: 0,
            loop_count: None,
            frames: Vec::new(),
        }
    }

    pub fn background_index(mut self, index: u8) -> Self {
        self.background_index = index;
        self
    }

    pub fn loop_count(mut self, count: u16) -> Self {
        self.loop_count = Some(count);
        self
    }

    pub fn frame(mut self, spec: FrameSpec) -> Self {
        self.frames.push(spec);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.build_without_trailer();
        out.push(0x3b);
        out
    }

    pub fn build_without_trailer(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"GIF89a");
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());

        let size_exponent = table_size_exponent(self.global_table.len());
        out.push(0b1000_0000 | size_exponent);
        out.push(self.background_index);
        out.push(0); // pixel aspect ratio

        for color in &self.global_table {
            out.extend_from_slice(color);
        }

        if let Some(count) = self.loop_count {
            out.extend_from_slice(&[0x21, 0xff, 11]);
            out.extend_from_slice(b"NETSCAPE2.0");
            out.extend_from_slice(&[3, 1]);
            out.extend_from_slice(&count.to_le_bytes());
            out.push(0);
        }

        for frame in &self.frames {
            self.encode_frame(&mut out, frame);
        }
        out
    }

    fn encode_frame(&self, out: &mut Vec<u8>, frame: &FrameSpec) {
        // graphic control extension
        out.extend_from_slice(&[0x21, 0xf9, 4]);
        let mut packed = (frame.disposal & 0b111) << 2;
        if frame.transparent_index.is_some() {
            packed |= 1;
        }
        out.push(packed);
        out.extend_from_slice(&frame.delay.to_le_bytes());
        out.push(frame.transparent_index.unwrap_or(0));
        out.push(0);

        // image descriptor
        out.push(0x2c);
        out.extend_from_slice(&frame.left.to_le_bytes());
        out.extend_from_slice(&frame.top.to_le_bytes());
        out.extend_from_slice(&frame.width.to_le_bytes());
        out.extend_from_slice(&frame.height.to_le_bytes());

        let interlace_bit = if frame.interlaced { 0b0100_0000 } else { 0 };
        let table_len = match &frame.local_table {
            Some(table) => {
                out.push(0b1000_0000 | interlace_bit | table_size_exponent(table.len()));
                for color in table {
                    out.extend_from_slice(color);
                }
                table.len()
            }
            None => {
                out.push(interlace_bit);
                self.global_table.len()
            }
        };

        let minimum_code_size = minimum_code_size_for(table_len);
        out.push(minimum_code_size);

        let lzw = lzw_encode_literals(&frame.indices, minimum_code_size);
        for chunk in lzw.chunks(255) {
            out.push(chunk.len() as u8);
            out.extend_from_slice(chunk);
        }
        out.push(0);
    }
}

fn table_size_exponent(len: usize) -> u8 {
    assert!(len.is_power_of_two() && len >= 2, "bad color table size");
    (len.trailing_zeros() - 1) as u8
}

fn minimum_code_size_for(table_len: usize) -> u8 {
    (table_len.trailing_zeros() as u8).max(2)
}

/// Encodes indices as plain literal codes, emitting a clear code between
/// every pair so the dictionary never grows and the code width stays at
/// `minimum_code_size + 1` throughout. Any conforming decoder accepts it.
fn lzw_encode_literals(indices: &[u8], minimum_code_size: u8) -> Vec<u8> {
    let clear: u16 = 1 << minimum_code_size;
    let end_of_information = clear + 1;
    let width = minimum_code_size as u32 + 1;

    let mut writer = BitWriter::default();
    writer.push(clear, width);
    for &index in indices {
        writer.push(index as u16, width);
        writer.push(clear, width);
    }
    writer.push(end_of_information, width);
    writer.finish()
}

#[derive(Default)]
struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    nbits: u32,
}

impl BitWriter {
    fn push(&mut self, value: u16, width: u32) {
        self.acc |= (value as u32) << self.nbits;
        self.nbits += width;
        while self.nbits >= 8 {
            self.out.push((self.acc & 0xff) as u8);
            self.acc >>= 8;
            self.nbits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.out.push((self.acc & 0xff) as u8);
        }
        self.out
    }
}
