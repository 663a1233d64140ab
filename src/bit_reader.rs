/// Reads variable-width codes out of a byte stream, least significant
/// bit first, the way GIF packs its LZW codes.
pub(crate) struct BitReader<'a> {
    buf: &'a [u8],
    // index by bit instead of by byte
    position: usize,
    length: usize,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            position: 0,
            length: buf.len() * 8,
        }
    }

    /// Returns the next `count` bits, or `None` once fewer than `count`
    /// bits remain.
    pub(crate) fn read_bits(&mut self, count: u32) -> Option<u16> {
        let end_position = self.position + count as usize;
        if end_position > self.length {
            return None;
        }

        let mut value: u16 = 0;
        for (out_shift, i) in (self.position..end_position).enumerate() {
            let bit = (self.buf[i / 8] >> (i % 8)) & 1;
            value |= (bit as u16) << out_shift;
        }
        self.position = end_position;
        Some(value)
    }
}
