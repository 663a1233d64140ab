use crate::error::DecodeError;
use crate::types::Rgb;

/// Positioned reader over the raw GIF buffer.
///
/// Multi-byte numeric fields in GIF are little endian. Any read that would
/// run past the end of the buffer fails with [`DecodeError::TruncatedData`].
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.position >= self.buf.len()
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .buf
            .get(self.position)
            .ok_or(DecodeError::TruncatedData)?;
        self.position += 1;
        Ok(byte)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .position
            .checked_add(count)
            .ok_or(DecodeError::TruncatedData)?;
        let bytes = self
            .buf
            .get(self.position..end)
            .ok_or(DecodeError::TruncatedData)?;
        self.position = end;
        Ok(bytes)
    }

    pub(crate) fn read_color_table(&mut self, entries: usize) -> Result<Vec<Rgb>, DecodeError> {
        let bytes = self.read_bytes(entries * 3)?;
        Ok(bytes
            .chunks_exact(3)
            .map(|rgb| Rgb {
                r: rgb[0],
                g: rgb[1],
                b: rgb[2],
            })
            .collect())
    }

    /// Reassembles a sub-block sequence into one contiguous byte stream.
    ///
    /// Each sub-block is prefixed with a 1-byte length; a length of zero
    /// terminates the sequence. The reader is left just past the terminator.
    pub(crate) fn read_sub_blocks(&mut self) -> Result<Vec<u8>, DecodeError> {
        let mut block_size = self.read_u8()?;

        // there could be more than one block, but we do know we'll have at
        // least 1 sub-block. allocate capacity to account for it.
        let mut result = Vec::with_capacity(block_size.into());

        while block_size != 0 {
            result.extend_from_slice(self.read_bytes(block_size.into())?);
            block_size = self.read_u8()?;
        }

        Ok(result)
    }

    pub(crate) fn skip_sub_blocks(&mut self) -> Result<(), DecodeError> {
        let mut block_size = self.read_u8()?;
        while block_size != 0 {
            self.read_bytes(block_size.into())?;
            block_size = self.read_u8()?;
        }
        Ok(())
    }
}
