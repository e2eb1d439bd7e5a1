//! Bit-packed palette frames used by the 64x64 animation layout.
//!
//! ```text
//! Frame buffer:
//!   0..5   unused header bytes
//!   5      encoding type (0x0C)
//!   6      palette size N (0 means a full 256-entry table)
//!   7      unused
//!   8..    N RGB triples
//!   ..     4096 packed indices, `bit_width` bits each
//! ```
//!
//! Indices are packed from the least significant bit of each byte upwards and spill
//! into the low bits of the next byte when they cross a byte boundary.

use log::trace;

use crate::binary_utils::slice_at;
use crate::error::DecodeError;
use crate::graphics::animation::Rgb;

pub const FRAME_HEADER_SIZE: usize = 8;
pub const ENCODING_TYPE_OFFSET: usize = 5;
pub const PALETTE_SIZE_OFFSET: usize = 6;
pub const SUPPORTED_ENCODING: u8 = 0x0C;
pub const MAX_BIT_WIDTH: u8 = 8;

pub const FRAME_DIM: usize = 64;
pub const FRAME_PIXELS: usize = FRAME_DIM * FRAME_DIM;

/// Colour written for the transparency sentinel.
pub const TRANSPARENT: Rgb = [0, 0, 0];

/// Bit-length scan over the palette size, as the device firmware performs it.
///
/// Walks the bits of `palette_size` from the least significant end with a 1-based
/// position counter. The first set bit records `position - 1`, every later set bit
/// records `position`. The result equals `ceil(log2(palette_size))`; in particular a
/// palette of exactly one colour yields 0.
pub fn scan_bit_width(palette_size: u8) -> u8 {
    let mut remaining = palette_size as u16;
    let mut position: u8 = 1;
    let mut width: Option<u8> = None;

    loop {
        if remaining & 1 != 0 {
            width = Some(match width {
                None => position - 1,
                Some(_) => position,
            });
        }

        let upper = remaining & 0xFFFE;
        position += 1;
        remaining = upper >> 1;
        if upper == 0 {
            break;
        }
    }

    width.unwrap_or(0)
}

/// Index width for a frame with `palette_size` embedded colours.
///
/// `0` is a known corrupt-frame case and is read as a full 8-bit table. A single
/// colour still needs one bit per pixel.
pub fn bit_width(palette_size: u8) -> u8 {
    if palette_size == 0 {
        return MAX_BIT_WIDTH;
    }
    scan_bit_width(palette_size).max(1)
}

/// Byte length of the embedded colour table.
pub fn colour_table_len(palette_size: u8) -> usize {
    if palette_size == 0 {
        256 * 3
    } else {
        palette_size as usize * 3
    }
}

/// Random-access reader over a stream of fixed-width packed indices.
#[derive(Debug, Clone)]
pub struct PackedIndices<'a> {
    data: &'a [u8],
    bit_width: u8,
}

impl<'a> PackedIndices<'a> {
    pub fn new(data: &'a [u8], bit_width: u8) -> Result<Self, DecodeError> {
        if bit_width == 0 || bit_width > MAX_BIT_WIDTH {
            return Err(DecodeError::UnsupportedEncodingType(format!(
                "bit width {} (supported: 1..={})",
                bit_width, MAX_BIT_WIDTH
            )));
        }
        Ok(Self { data, bit_width })
    }

    /// The all-ones value, reserved for transparent pixels.
    pub fn sentinel(&self) -> u8 {
        ((1u16 << self.bit_width) - 1) as u8
    }

    /// Bytes needed to hold `count` indices.
    pub fn bytes_for(count: usize, bit_width: u8) -> usize {
        (count * bit_width as usize).div_ceil(8)
    }

    /// Index number `pixel`.
    pub fn get(&self, pixel: usize) -> Result<u8, DecodeError> {
        let width = self.bit_width as usize;
        let bit_offset = pixel * width;
        let byte_pos = bit_offset / 8;
        let shift = bit_offset % 8;

        let low = *self
            .data
            .get(byte_pos)
            .ok_or_else(|| DecodeError::truncated("packed index", byte_pos + 1, self.data.len()))?;

        let mut value = (low as u16) >> shift;
        if shift + width > 8 {
            let high = *self.data.get(byte_pos + 1).ok_or_else(|| {
                DecodeError::truncated("packed index", byte_pos + 2, self.data.len())
            })?;
            value |= (high as u16) << (8 - shift);
        }

        let mask = (1u16 << width) - 1;
        Ok((value & mask) as u8)
    }
}

/// Decode one bit-packed frame into 64x64 raw RGB bytes in tile order.
pub fn decode_frame(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if data.len() < FRAME_HEADER_SIZE {
        return Err(DecodeError::truncated(
            "bit-packed frame header",
            FRAME_HEADER_SIZE,
            data.len(),
        ));
    }

    let encoding = data[ENCODING_TYPE_OFFSET];
    if encoding != SUPPORTED_ENCODING {
        return Err(DecodeError::UnsupportedEncodingType(format!(
            "encoding type {:#04x}",
            encoding
        )));
    }

    let palette_size = data[PALETTE_SIZE_OFFSET];
    let width = bit_width(palette_size);
    let indices_start = FRAME_HEADER_SIZE + colour_table_len(palette_size);
    trace!(
        "Bit-packed frame: {} colours, {}-bit indices",
        palette_size,
        width
    );

    // A frame that stops right after its colour table has no drawn pixels.
    if data.len() == indices_start {
        return Ok(TRANSPARENT.repeat(FRAME_PIXELS));
    }

    let packed = slice_at(
        data,
        indices_start,
        PackedIndices::bytes_for(FRAME_PIXELS, width),
        "packed pixel indices",
    )?;
    let indices = PackedIndices::new(packed, width)?;
    let sentinel = indices.sentinel();

    let mut output = Vec::with_capacity(FRAME_PIXELS * 3);
    for pixel in 0..FRAME_PIXELS {
        let index = indices.get(pixel)?;
        if index == sentinel {
            output.extend_from_slice(&TRANSPARENT);
        } else {
            let colour_pos = FRAME_HEADER_SIZE + index as usize * 3;
            output.extend_from_slice(slice_at(data, colour_pos, 3, "embedded colour table")?);
        }
    }

    Ok(output)
}
