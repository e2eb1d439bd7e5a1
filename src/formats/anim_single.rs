use std::io::Read;

use log::{debug, trace};

use super::{FormatDecoder, RawAnimation};
use crate::binary_utils::read_remaining;
use crate::containers::cipher;
use crate::error::DecodeError;

/// One 16x16 RGB frame.
pub const FRAME_BYTES: usize = 16 * 16 * 3;

/// Bytes after the tag that precede the ciphertext: one unused byte and the speed.
pub const HEADER_SIZE: usize = 3;

/// Tag-9 layout: a 16x16 animation whose frames are stored back to back under AES.
pub struct AnimSingleDecoder;

/// Rebuild the cipher-aligned payload of a single-frame container.
///
/// The payload after the tag is realigned as the device firmware does it: a filler
/// byte stands in for the already consumed tag, then every byte moves four positions
/// to the left. The four leading bytes (filler, unused byte, speed) wrap around to
/// the tail and are cut off, leaving only the ciphertext.
pub fn realign_payload(body: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(body.len() + 1);
    content.push(0);
    content.extend_from_slice(body);

    if content.len() < 4 {
        return Vec::new();
    }

    content.rotate_left(4);
    content.truncate(content.len() - 4);
    content
}

impl FormatDecoder for AnimSingleDecoder {
    fn decode_raw<R: Read>(reader: &mut R) -> Result<RawAnimation, DecodeError> {
        let body = read_remaining(reader)?;
        if body.len() < HEADER_SIZE {
            return Err(DecodeError::truncated(
                "single-frame header",
                HEADER_SIZE,
                body.len(),
            ));
        }

        trace!("Single-frame header byte: {:#04x}", body[0]);
        let speed = u16::from_be_bytes([body[1], body[2]]);

        let ciphertext = realign_payload(&body);
        let plaintext = cipher::decrypt_units(&ciphertext, FRAME_BYTES)?;

        let frames: Vec<Vec<u8>> = plaintext
            .chunks_exact(FRAME_BYTES)
            .map(<[u8]>::to_vec)
            .collect();
        debug!("Single-frame animation: {} frames, speed {}", frames.len(), speed);

        Ok(RawAnimation {
            speed,
            row_count: 1,
            column_count: 1,
            frames,
        })
    }
}
