use log::trace;
use rust_lzo::{LZOContext, LZOError};

use crate::error::DecodeError;

// Frame blocks are raw LZO1X streams with no header; the uncompressed size is known
// from the grid dimensions, so the output buffer is sized up front and must be filled
// exactly.

/// Decompress one LZO1X block into exactly `uncompressed_size` bytes.
pub fn decompress(compressed: &[u8], uncompressed_size: usize) -> Result<Vec<u8>, DecodeError> {
    let mut output = vec![0u8; uncompressed_size];

    let (decoded, status) = LZOContext::decompress_to_slice(compressed, &mut output);
    let decoded_len = decoded.len();

    if !matches!(status, LZOError::OK) {
        return Err(DecodeError::DecompressionFailure(format!(
            "corrupt LZO block ({} compressed bytes, {} expected out)",
            compressed.len(),
            uncompressed_size
        )));
    }

    if decoded_len != uncompressed_size {
        return Err(DecodeError::DecompressionFailure(format!(
            "LZO block expanded to {} bytes, expected {}",
            decoded_len, uncompressed_size
        )));
    }

    trace!(
        "LZO block: {} -> {} bytes",
        compressed.len(),
        uncompressed_size
    );
    Ok(output)
}
