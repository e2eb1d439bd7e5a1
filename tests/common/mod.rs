#![allow(dead_code)]

use aes::Aes128;
use cbc::cipher::{block_padding::NoPadding, BlockEncryptMut, KeyIvInit};
use pixelbean::containers::cipher::{AES_BLOCK_SIZE, AES_IV, AES_SECRET_KEY};
use pixelbean::formats::bitpack::{self, SUPPORTED_ENCODING};
use pixelbean::Rgb;
use rust_lzo::{worst_compress, LZOContext, LZOError};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;

pub const TILE: usize = 16;

/// Encrypt with the protocol key, zero-padding to the block size.
pub fn encrypt(plaintext: &[u8]) -> Vec<u8> {
    let mut buffer = plaintext.to_vec();
    let padded = buffer.len().div_ceil(AES_BLOCK_SIZE) * AES_BLOCK_SIZE;
    buffer.resize(padded, 0);

    Aes128CbcEnc::new(&AES_SECRET_KEY.into(), &AES_IV.into())
        .encrypt_padded_mut::<NoPadding>(&mut buffer, padded)
        .expect("block-aligned buffer");
    buffer
}

pub fn lzo_compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(worst_compress(data.len()));
    let mut ctx = LZOContext::new();
    assert!(matches!(ctx.compress(data, &mut out), LZOError::OK));
    out
}

/// Pixel coordinates in the order the device streams them: tile by tile, row-major
/// inside each tile.
pub fn tile_positions(rows: usize, cols: usize) -> Vec<(usize, usize)> {
    let mut positions = Vec::with_capacity(rows * cols * TILE * TILE);
    for tile_y in 0..rows {
        for tile_x in 0..cols {
            for y in 0..TILE {
                for x in 0..TILE {
                    positions.push((tile_x * TILE + x, tile_y * TILE + y));
                }
            }
        }
    }
    positions
}

/// Raw frame bytes in device tile order for a `rows x cols` tile grid.
pub fn tile_ordered(rows: usize, cols: usize, colour: impl Fn(usize, usize) -> Rgb) -> Vec<u8> {
    tile_positions(rows, cols)
        .into_iter()
        .flat_map(|(x, y)| colour(x, y))
        .collect()
}

/// Deterministic test picture with a handful of colours that changes per frame.
pub fn reference_colour(frame: usize, x: usize, y: usize) -> Rgb {
    let band = ((x / 4 + y / 8 + frame) % 6) as u8;
    [band * 40, 255 - band * 30, (x as u8).wrapping_mul(3) & 0xF0]
}

pub fn reference_frame(frame: usize, rows: usize, cols: usize) -> Vec<u8> {
    tile_ordered(rows, cols, |x, y| reference_colour(frame, x, y))
}

/// Tag 9: `[tag][unused][speed BE][ciphertext of back-to-back 16x16 frames]`.
pub fn anim_single(speed: u16, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![9u8, 0x00];
    out.extend_from_slice(&speed.to_be_bytes());
    out.extend(encrypt(&frames.concat()));
    out
}

/// Tag 18: five-byte header, then one AES buffer of length-prefixed LZO blocks.
pub fn anim_multi(speed: u16, rows: u8, cols: u8, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![18u8, frames.len() as u8];
    out.extend_from_slice(&speed.to_be_bytes());
    out.extend_from_slice(&[rows, cols]);

    let mut plaintext = Vec::new();
    for frame in frames {
        let block = lzo_compress(frame);
        plaintext.extend_from_slice(&(block.len() as u32).to_be_bytes());
        plaintext.extend(block);
    }
    out.extend(encrypt(&plaintext));
    out
}

/// Tag 17: `[rows][cols][block length BE]`, then AES over the LZO block and a caption.
pub fn pic_multi(rows: u8, cols: u8, frame: &[u8], caption: &[u8]) -> Vec<u8> {
    let block = lzo_compress(frame);
    let mut out = vec![17u8, rows, cols];
    out.extend_from_slice(&(block.len() as u32).to_be_bytes());

    let mut plaintext = block;
    plaintext.extend_from_slice(caption);
    out.extend(encrypt(&plaintext));
    out
}

/// One bit-packed frame: header, colour table, LSB-first packed indices.
pub fn bitpacked_frame(palette: &[Rgb], palette_size: u8, indices: &[u8]) -> Vec<u8> {
    let width = bitpack::bit_width(palette_size) as usize;
    let mut data = vec![0, 0, 0, 0, 0, SUPPORTED_ENCODING, palette_size, 0];
    for colour in palette {
        data.extend_from_slice(colour);
    }

    let mut packed = vec![0u8; (indices.len() * width).div_ceil(8)];
    for (i, &value) in indices.iter().enumerate() {
        for bit in 0..width {
            if (value >> bit) & 1 != 0 {
                let pos = i * width + bit;
                packed[pos / 8] |= 1 << (pos % 8);
            }
        }
    }
    data.extend(packed);
    data
}

/// Tag 26: five-byte header, then `[length BE][frame]` per bit-packed frame.
pub fn anim_multi_64(speed: u16, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![26u8, frames.len() as u8];
    out.extend_from_slice(&speed.to_be_bytes());
    out.extend_from_slice(&[4, 4]);
    for frame in frames {
        out.extend_from_slice(&(frame.len() as u32).to_be_bytes());
        out.extend_from_slice(frame);
    }
    out
}
