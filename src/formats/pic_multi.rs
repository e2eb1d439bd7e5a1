use std::io::Read;

use log::debug;

use super::{raw_frame_size, validate_grid, FormatDecoder, RawAnimation};
use crate::binary_utils::{read_remaining, read_u32_be, read_u8, slice_at};
use crate::containers::{cipher, compression::lzo};
use crate::error::DecodeError;

/// Still images carry no timing; this is the value the device app reports for them.
pub const STILL_IMAGE_SPEED: u16 = 40;

/// Tag-17 layout: a single still image of any tile grid. One LZO block sits at the
/// start of the decrypted body; anything after it is ignored.
pub struct PicMultiDecoder;

impl FormatDecoder for PicMultiDecoder {
    fn decode_raw<R: Read>(reader: &mut R) -> Result<RawAnimation, DecodeError> {
        let row_count = read_u8(reader, "image header")?;
        let column_count = read_u8(reader, "image header")?;
        let compressed_len = read_u32_be(reader, "image header")? as usize;
        validate_grid(row_count, column_count)?;

        let ciphertext = read_remaining(reader)?;
        let plaintext = cipher::decrypt(&ciphertext)?;

        let block = slice_at(&plaintext, 0, compressed_len, "compressed image")?;
        let frame = lzo::decompress(block, raw_frame_size(row_count, column_count))?;

        debug!(
            "Still image: {}x{} tiles, {} trailing bytes ignored",
            row_count,
            column_count,
            plaintext.len() - compressed_len
        );

        Ok(RawAnimation {
            speed: STILL_IMAGE_SPEED,
            row_count,
            column_count,
            frames: vec![frame],
        })
    }
}
