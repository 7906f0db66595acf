//! JPEG 1 (Baseline) Implementation (ISO/IEC 10918-1 / ITU-T T.81)
//!
//! This module implements MCU-at-a-time decoding of the classic DCT-based
//! baseline JPEG standard.
//!
//! Features:
//! - 8-bit grayscale and 3-component YCbCr (H1V1, H2V1, H1V2, H2V2).
//! - Huffman coding with tables from the stream.
//! - Support for Restart Markers (DRI/RSTm).
//! - Reduced mode producing one pixel per 8x8 block from the DC term.

pub mod color;
pub mod dct;
pub mod decoder;
pub mod huffman;
pub mod quantization;

pub use decoder::BaselineDecoder;
