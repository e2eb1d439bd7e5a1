use std::io::Read;

use crate::error::DecodeError;

// All container integers are big-endian. Readers are forward-only: nothing here seeks.

pub fn read_u8<R: Read>(reader: &mut R, context: &'static str) -> Result<u8, DecodeError> {
    let buf = read_array::<R, 1>(reader, context)?;
    Ok(buf[0])
}

pub fn read_u16_be<R: Read>(reader: &mut R, context: &'static str) -> Result<u16, DecodeError> {
    let buf = read_array::<R, 2>(reader, context)?;
    Ok(u16::from_be_bytes(buf))
}

pub fn read_u32_be<R: Read>(reader: &mut R, context: &'static str) -> Result<u32, DecodeError> {
    let buf = read_array::<R, 4>(reader, context)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_array<R: Read, const N: usize>(
    reader: &mut R,
    context: &'static str,
) -> Result<[u8; N], DecodeError> {
    let bytes = read_bytes(reader, N, context)?;
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes);
    Ok(buf)
}

/// Reads exactly `length` bytes.
///
/// The buffer grows with the data actually delivered, so a bogus length field
/// cannot force a huge up-front allocation.
pub fn read_bytes<R: Read>(
    reader: &mut R,
    length: usize,
    context: &'static str,
) -> Result<Vec<u8>, DecodeError> {
    let mut buffer = Vec::new();
    reader.take(length as u64).read_to_end(&mut buffer)?;

    if buffer.len() != length {
        return Err(DecodeError::truncated(context, length, buffer.len()));
    }

    Ok(buffer)
}

pub fn read_remaining<R: Read>(reader: &mut R) -> Result<Vec<u8>, DecodeError> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Borrow `length` bytes of an in-memory buffer starting at `pos`.
pub fn slice_at<'a>(
    data: &'a [u8],
    pos: usize,
    length: usize,
    context: &'static str,
) -> Result<&'a [u8], DecodeError> {
    let end = pos
        .checked_add(length)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            DecodeError::truncated(context, length, data.len().saturating_sub(pos))
        })?;

    Ok(&data[pos..end])
}

pub fn read_u32_be_at(data: &[u8], pos: usize, context: &'static str) -> Result<u32, DecodeError> {
    let bytes = slice_at(data, pos, 4, context)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
