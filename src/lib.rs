//! `pixelbean` decodes the binary pixel-animation containers served by the Divoom
//! cloud gallery into a palette plus per-frame index grids.
//!
//! # Quick start
//!
//! ```
//! use pixelbean::{decode_bytes, DecodeError};
//!
//! // In a real pipeline the bytes come from the gallery download endpoint.
//! let err = decode_bytes(&[0xFF]).unwrap_err();
//! assert!(matches!(err, DecodeError::UnsupportedFormatTag(0xFF)));
//! ```
//!
//! Decoding never touches the network and never renders; see [`graphics::renderer`]
//! for turning an [`Animation`] into GIF or PNG files.

mod binary_utils;
pub mod containers;
pub mod error;
pub mod formats;
pub mod graphics;

pub use crate::error::DecodeError;
pub use crate::formats::{decode_bytes, decode_file, decode_stream, FileFormat};
pub use crate::graphics::{Animation, FrameGrid, Rgb};
