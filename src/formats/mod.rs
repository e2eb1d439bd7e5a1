//! PixelBean container formats
//!
//! A container starts with a single format tag byte. Each tag selects one of four
//! structurally different layouts; every layout is decoded down to raw tile-ordered
//! RGB frames, which are then compacted into an [`Animation`].

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use crate::binary_utils::{read_u16_be, read_u8};
use crate::error::DecodeError;
use crate::graphics::animation::{Animation, TILE_DIM};
use crate::graphics::palette;

pub mod anim_multi;
pub mod anim_multi_64;
pub mod anim_single;
pub mod bitpack;
pub mod pic_multi;

use anim_multi::AnimMultiDecoder;
use anim_multi_64::AnimMulti64Decoder;
use anim_single::AnimSingleDecoder;
use pic_multi::PicMultiDecoder;

/// Known container layouts, keyed by their leading tag byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// 16x16 animation, AES only.
    AnimSingle = 9,
    /// Still image of any tile grid, AES + LZO.
    PicMultiple = 17,
    /// 32x32 or 64x64 animation, AES + LZO per frame.
    AnimMultiple = 18,
    /// 64x64 animation with bit-packed palette indices.
    AnimMultiple64 = 26,
}

impl FileFormat {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            9 => Some(FileFormat::AnimSingle),
            17 => Some(FileFormat::PicMultiple),
            18 => Some(FileFormat::AnimMultiple),
            26 => Some(FileFormat::AnimMultiple64),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Decode everything after the tag byte into raw frames.
    fn decode_raw<R: Read>(self, reader: &mut R) -> Result<RawAnimation, DecodeError> {
        match self {
            FileFormat::AnimSingle => AnimSingleDecoder::decode_raw(reader),
            FileFormat::PicMultiple => PicMultiDecoder::decode_raw(reader),
            FileFormat::AnimMultiple => AnimMultiDecoder::decode_raw(reader),
            FileFormat::AnimMultiple64 => AnimMulti64Decoder::decode_raw(reader),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::AnimSingle => write!(f, "AnimSingle"),
            FileFormat::PicMultiple => write!(f, "PicMultiple"),
            FileFormat::AnimMultiple => write!(f, "AnimMultiple"),
            FileFormat::AnimMultiple64 => write!(f, "AnimMultiple64"),
        }
    }
}

/// Header fields plus raw frames, as produced by one format decoder.
///
/// Each frame is `width * height * 3` bytes of RGB in tile order.
#[derive(Debug, Clone)]
pub struct RawAnimation {
    pub speed: u16,
    pub row_count: u8,
    pub column_count: u8,
    pub frames: Vec<Vec<u8>>,
}

/// Shared capability of the format layouts: turn the bytes after the tag into raw frames.
pub trait FormatDecoder {
    fn decode_raw<R: Read>(reader: &mut R) -> Result<RawAnimation, DecodeError>;
}

/// The five-byte header shared by the multi-frame animation layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimHeader {
    pub total_frames: u8,
    pub speed: u16,
    pub row_count: u8,
    pub column_count: u8,
}

impl AnimHeader {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
        let total_frames = read_u8(reader, "animation header")?;
        let speed = read_u16_be(reader, "animation header")?;
        let row_count = read_u8(reader, "animation header")?;
        let column_count = read_u8(reader, "animation header")?;

        let header = AnimHeader {
            total_frames,
            speed,
            row_count,
            column_count,
        };

        if header.total_frames == 0 {
            return Err(DecodeError::InvalidHeader(
                "animation declares zero frames".to_string(),
            ));
        }
        validate_grid(header.row_count, header.column_count)?;

        debug!("{:?}", header);
        Ok(header)
    }

    pub fn frame_size(&self) -> usize {
        raw_frame_size(self.row_count, self.column_count)
    }
}

/// Byte size of one raw RGB frame for a grid of tiles.
pub fn raw_frame_size(row_count: u8, column_count: u8) -> usize {
    row_count as usize * column_count as usize * TILE_DIM * TILE_DIM * 3
}

pub(crate) fn validate_grid(row_count: u8, column_count: u8) -> Result<(), DecodeError> {
    if row_count == 0 || column_count == 0 {
        return Err(DecodeError::InvalidHeader(format!(
            "grid of {}x{} tiles is empty",
            row_count, column_count
        )));
    }
    Ok(())
}

/// Decode a container from a forward-only byte source.
///
/// Consumes the tag byte, then exactly what the selected layout needs (the encrypted
/// layouts read to the end of the stream).
pub fn decode_stream<R: Read>(mut reader: R) -> Result<Animation, DecodeError> {
    let tag = read_u8(&mut reader, "format tag")?;
    let format = FileFormat::from_tag(tag).ok_or(DecodeError::UnsupportedFormatTag(tag))?;
    debug!("Decoding {} container (tag {})", format, tag);

    let raw = format.decode_raw(&mut reader)?;
    assemble(raw)
}

pub fn decode_bytes(data: &[u8]) -> Result<Animation, DecodeError> {
    decode_stream(data)
}

pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Animation, DecodeError> {
    let file = File::open(path)?;
    decode_stream(BufReader::new(file))
}

fn assemble(raw: RawAnimation) -> Result<Animation, DecodeError> {
    if raw.frames.is_empty() {
        return Err(DecodeError::InvalidHeader(
            "container holds no frames".to_string(),
        ));
    }

    let (palette, grids) = palette::compact(&raw.frames, raw.row_count, raw.column_count)?;
    Ok(Animation::new(
        raw.speed,
        raw.row_count,
        raw.column_count,
        palette,
        grids,
    ))
}
