use std::io::Read;

use log::{debug, trace};

use super::{AnimHeader, FormatDecoder, RawAnimation};
use crate::binary_utils::{read_remaining, read_u32_be_at, slice_at};
use crate::containers::{cipher, compression::lzo};
use crate::error::DecodeError;

/// Tag-18 layout: 32x32 or 64x64 animation. The whole body after the header is one
/// AES-CBC buffer holding length-prefixed LZO blocks, one per frame.
pub struct AnimMultiDecoder;

impl FormatDecoder for AnimMultiDecoder {
    fn decode_raw<R: Read>(reader: &mut R) -> Result<RawAnimation, DecodeError> {
        let header = AnimHeader::read_from(reader)?;
        let ciphertext = read_remaining(reader)?;
        let plaintext = cipher::decrypt(&ciphertext)?;

        let frames = split_frames(&plaintext, header.total_frames as usize, header.frame_size())?;
        debug!(
            "Multi-frame animation: {} frames of {}x{} tiles",
            frames.len(),
            header.row_count,
            header.column_count
        );

        Ok(RawAnimation {
            speed: header.speed,
            row_count: header.row_count,
            column_count: header.column_count,
            frames,
        })
    }
}

/// Walk the decrypted buffer: `[u32 BE length][length bytes of LZO]` per frame.
pub fn split_frames(
    data: &[u8],
    total_frames: usize,
    frame_size: usize,
) -> Result<Vec<Vec<u8>>, DecodeError> {
    let mut frames = Vec::with_capacity(total_frames);
    let mut pos = 0;

    for index in 0..total_frames {
        let compressed_len = read_u32_be_at(data, pos, "compressed frame length")? as usize;
        pos += 4;

        let block = slice_at(data, pos, compressed_len, "compressed frame")?;
        pos += compressed_len;

        trace!("Frame {}: {} compressed bytes", index, compressed_len);
        frames.push(lzo::decompress(block, frame_size)?);
    }

    Ok(frames)
}
