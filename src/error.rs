use std::io;

use thiserror::Error;

/// Errors produced while decoding a PixelBean container.
///
/// Every variant is terminal for the decode call that produced it; no partially
/// decoded animation is ever handed back.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported file format tag: {0}")]
    UnsupportedFormatTag(u8),

    #[error("unsupported bit-packed encoding: {0}")]
    UnsupportedEncodingType(String),

    #[error("truncated stream while reading {context}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("decompression failed: {0}")]
    DecompressionFailure(String),

    #[error("cipher length mismatch: {0}")]
    CipherLengthMismatch(String),

    #[error("invalid container header: {0}")]
    InvalidHeader(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    pub(crate) fn truncated(context: &'static str, needed: usize, available: usize) -> Self {
        DecodeError::TruncatedStream {
            context,
            needed,
            available,
        }
    }
}
