pub mod byte_source;
pub mod constants;
pub mod error;
pub mod jpeg1;
pub mod jpeg_marker_code;
pub mod jpeg_stream_reader;
pub mod mcu_reassembler;
pub mod pixel;
pub mod stream_decoder;
pub mod traits;

pub use byte_source::{ArraySource, ByteSource, FileSource};
pub use error::{ErrorKind, JpegDecError};
pub use jpeg1::BaselineDecoder;
pub use mcu_reassembler::McuExtent;
pub use pixel::{Gray8, PixelFormat, Rgb565, Rgb565Swapped, Rgb888};
pub use stream_decoder::{DecodeOptions, DecoderState, JpegStreamDecoder};
pub use traits::McuDecoder;

use constants::{BLOCK_SIZE, MCU_PLANE_SIZE};

/// Layout of the MCUs in the scan. The colour variants name the luma
/// sampling factors; both chroma components are always sampled 1x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanType {
    Grayscale,
    YH1V1,
    YH2V1,
    YH1V2,
    YH2V2,
}

impl ScanType {
    /// Luma blocks per MCU, horizontally and vertically.
    pub fn luma_blocks(self) -> (usize, usize) {
        match self {
            Self::Grayscale | Self::YH1V1 => (1, 1),
            Self::YH2V1 => (2, 1),
            Self::YH1V2 => (1, 2),
            Self::YH2V2 => (2, 2),
        }
    }

    pub fn component_count(self) -> usize {
        match self {
            Self::Grayscale => 1,
            _ => 3,
        }
    }
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Grayscale => "grayscale",
            Self::YH1V1 => "YCbCr H1V1",
            Self::YH2V1 => "YCbCr H2V1",
            Self::YH1V2 => "YCbCr H1V2",
            Self::YH2V2 => "YCbCr H2V2",
        };
        f.write_str(name)
    }
}

/// Geometry of a decoded frame. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: usize,
    pub height: usize,
    pub mcu_width: usize,
    pub mcu_height: usize,
    pub mcus_per_row: usize,
    pub mcus_per_col: usize,
    pub component_count: usize,
    pub scan_type: ScanType,
}

impl ImageInfo {
    pub fn new(width: usize, height: usize, scan_type: ScanType) -> Self {
        let (h, v) = scan_type.luma_blocks();
        let mcu_width = h * BLOCK_SIZE;
        let mcu_height = v * BLOCK_SIZE;
        Self {
            width,
            height,
            mcu_width,
            mcu_height,
            mcus_per_row: width.div_ceil(mcu_width),
            mcus_per_col: height.div_ceil(mcu_height),
            component_count: scan_type.component_count(),
            scan_type,
        }
    }

    pub fn mcu_count(&self) -> usize {
        self.mcus_per_row * self.mcus_per_col
    }

    /// Rejects geometry that does not follow from `width`, `height` and
    /// `scan_type`. Decoders outside this crate can fill the fields freely.
    pub fn validate(&self) -> Result<(), JpegDecError> {
        if self.width == 0 || self.height == 0 {
            return Err(JpegDecError::InvalidDimensions);
        }
        if *self != Self::new(self.width, self.height, self.scan_type) {
            return Err(JpegDecError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Decoded samples of one MCU: up to four 8x8 blocks per plane in a fixed
/// 2x2 grid (see [`constants::block_offset`]). Grayscale scans use `r` only.
#[derive(Clone)]
pub struct McuPlanes {
    pub r: [u8; MCU_PLANE_SIZE],
    pub g: [u8; MCU_PLANE_SIZE],
    pub b: [u8; MCU_PLANE_SIZE],
}

impl Default for McuPlanes {
    fn default() -> Self {
        Self::new()
    }
}

impl McuPlanes {
    pub fn new() -> Self {
        Self {
            r: [0; MCU_PLANE_SIZE],
            g: [0; MCU_PLANE_SIZE],
            b: [0; MCU_PLANE_SIZE],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McuStatus {
    Decoded,
    NoMoreBlocks,
}
