use std::io::Read;

use log::{debug, trace};

use super::bitpack::{self, FRAME_DIM};
use super::{AnimHeader, FormatDecoder, RawAnimation};
use crate::binary_utils::{read_bytes, read_u32_be};
use crate::error::DecodeError;
use crate::graphics::animation::TILE_DIM;

const GRID_TILES: u8 = (FRAME_DIM / TILE_DIM) as u8;

/// Tag-26 layout: 64x64 animation, unencrypted, each frame a length-prefixed
/// bit-packed palette frame read straight from the stream.
pub struct AnimMulti64Decoder;

impl FormatDecoder for AnimMulti64Decoder {
    fn decode_raw<R: Read>(reader: &mut R) -> Result<RawAnimation, DecodeError> {
        let header = AnimHeader::read_from(reader)?;
        if header.row_count != GRID_TILES || header.column_count != GRID_TILES {
            return Err(DecodeError::UnsupportedEncodingType(format!(
                "bit-packed frames are 64x64, header declares {}x{} tiles",
                header.row_count, header.column_count
            )));
        }

        let mut frames = Vec::with_capacity(header.total_frames as usize);
        for index in 0..header.total_frames {
            let size = read_u32_be(reader, "bit-packed frame length")? as usize;
            let data = read_bytes(reader, size, "bit-packed frame")?;
            trace!("Frame {}: {} bytes", index, size);

            frames.push(bitpack::decode_frame(&data)?);
        }
        debug!("64x64 bit-packed animation: {} frames", frames.len());

        Ok(RawAnimation {
            speed: header.speed,
            row_count: header.row_count,
            column_count: header.column_count,
            frames,
        })
    }
}
