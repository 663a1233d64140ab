use crate::bit_reader::BitReader;
use crate::error::DecodeError;

const MAX_CODE_WIDTH: u32 = 12;
const MAX_TABLE_LEN: usize = 1 << MAX_CODE_WIDTH;

/// Decompresses one frame's LZW stream into palette indices.
///
/// `expected_len` is the frame's pixel count. Streams that end early are
/// padded with index 0 so a truncated GIF still renders partially; streams
/// that produce too much data are cut off at `expected_len`. Only a code
/// referencing a dictionary slot that does not exist yet is an error.
pub(crate) fn decode(
    data: &[u8],
    minimum_code_size: u8,
    expected_len: usize,
) -> Result<Vec<u8>, DecodeError> {
    if !(1..=8).contains(&minimum_code_size) {
        return Err(DecodeError::InvalidCodeSize(minimum_code_size));
    }

    let clear_code: u16 = 1 << minimum_code_size;
    let end_of_information = clear_code + 1;

    let mut table = init_code_table(minimum_code_size);
    let mut code_size = minimum_code_size as u32 + 1;
    let mut reader = BitReader::new(data);
    let mut indices: Vec<u8> = Vec::with_capacity(expected_len);
    // the previously consumed code, None at the start and right after a clear
    let mut prev: Option<u16> = None;

    loop {
        let Some(code) = reader.read_bits(code_size) else {
            break;
        };

        if code == clear_code {
            table = init_code_table(minimum_code_size);
            code_size = minimum_code_size as u32 + 1;
            prev = None;
            continue;
        }
        if code == end_of_information {
            break;
        }

        if (code as usize) < table.len() {
            let entry = table[code as usize].clone();
            indices.extend_from_slice(&entry);
            if let Some(prev_code) = prev {
                if table.len() < MAX_TABLE_LEN {
                    let mut next_entry = table[prev_code as usize].clone();
                    next_entry.push(entry[0]);
                    table.push(next_entry);
                }
            }
        } else if code as usize == table.len() {
            // the one code an encoder may emit before the decoder has it:
            // previous entry plus its own first index
            let Some(prev_code) = prev else {
                return Err(DecodeError::InvalidLzwCode {
                    code,
                    next: table.len() as u16,
                });
            };
            let mut entry = table[prev_code as usize].clone();
            entry.push(table[prev_code as usize][0]);
            indices.extend_from_slice(&entry);
            table.push(entry);
        } else {
            return Err(DecodeError::InvalidLzwCode {
                code,
                next: table.len() as u16,
            });
        }

        if table.len() == (1 << code_size) as usize && code_size < MAX_CODE_WIDTH {
            code_size += 1;
        }
        prev = Some(code);

        if indices.len() >= expected_len {
            break;
        }
    }

    indices.resize(expected_len, 0);
    Ok(indices)
}

fn init_code_table(minimum_code_size: u8) -> Vec<Vec<u8>> {
    let root_count = 1usize << minimum_code_size;
    let mut table: Vec<Vec<u8>> = (0..root_count).map(|i| vec![i as u8]).collect();
    // placeholder slots so the clear and end-of-information codes keep
    // their positions; they are intercepted before any lookup
    table.push(Vec::new());
    table.push(Vec::new());
    table
}
