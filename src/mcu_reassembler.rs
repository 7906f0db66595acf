//! Copies the blocks of one decoded MCU into a raster buffer.
//!
//! The destination holds exactly one MCU. Blocks that straddle the right or
//! bottom image edge are clipped, blocks entirely outside are skipped, and
//! everything outside the valid extent is reset to the default pixel.

use crate::constants::{BLOCK_SIZE, block_offset};
use crate::pixel::PixelFormat;
use crate::{ImageInfo, McuPlanes};

/// Valid part of an MCU, in output pixels, counted from its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct McuExtent {
    pub cols: usize,
    pub rows: usize,
}

impl McuExtent {
    pub fn pixel_count(&self) -> usize {
        self.cols * self.rows
    }
}

#[inline]
fn convert<P: PixelFormat>(info: &ImageInfo, planes: &McuPlanes, offset: usize) -> P::Pixel {
    if info.component_count == 1 {
        P::from_gray(planes.r[offset])
    } else {
        P::from_rgb(planes.r[offset], planes.g[offset], planes.b[offset])
    }
}

/// Places MCU `(mcu_x, mcu_y)` at full resolution. `dst` must hold
/// `mcu_height` rows of `row_pitch` pixels.
pub fn place_mcu<P: PixelFormat>(
    info: &ImageInfo,
    planes: &McuPlanes,
    mcu_x: usize,
    mcu_y: usize,
    dst: &mut [P::Pixel],
    row_pitch: usize,
) -> McuExtent {
    let origin_x = mcu_x * info.mcu_width;
    let origin_y = mcu_y * info.mcu_height;
    let extent = McuExtent {
        cols: info.width.saturating_sub(origin_x).min(info.mcu_width),
        rows: info.height.saturating_sub(origin_y).min(info.mcu_height),
    };
    if extent.cols < info.mcu_width || extent.rows < info.mcu_height {
        dst.fill(P::Pixel::default());
    }

    let blocks_x = info.mcu_width / BLOCK_SIZE;
    let blocks_y = info.mcu_height / BLOCK_SIZE;
    for by in 0..blocks_y {
        let rows_valid = extent.rows.saturating_sub(by * BLOCK_SIZE).min(BLOCK_SIZE);
        for bx in 0..blocks_x {
            let cols_valid = extent.cols.saturating_sub(bx * BLOCK_SIZE).min(BLOCK_SIZE);
            let src = block_offset(bx, by);
            for row in 0..rows_valid {
                let line = (by * BLOCK_SIZE + row) * row_pitch + bx * BLOCK_SIZE;
                let samples = src + row * BLOCK_SIZE;
                for col in 0..cols_valid {
                    dst[line + col] = convert::<P>(info, planes, samples + col);
                }
            }
        }
    }
    extent
}

/// Places MCU `(mcu_x, mcu_y)` in reduced mode: one pixel per block, taken
/// from the block's first sample. A block contributes only when its origin
/// lies inside the image.
pub fn place_mcu_reduced<P: PixelFormat>(
    info: &ImageInfo,
    planes: &McuPlanes,
    mcu_x: usize,
    mcu_y: usize,
    dst: &mut [P::Pixel],
    row_pitch: usize,
) -> McuExtent {
    let blocks_x = info.mcu_width / BLOCK_SIZE;
    let blocks_y = info.mcu_height / BLOCK_SIZE;
    let left = info.width.saturating_sub(mcu_x * info.mcu_width);
    let top = info.height.saturating_sub(mcu_y * info.mcu_height);
    let extent = McuExtent {
        cols: left.div_ceil(BLOCK_SIZE).min(blocks_x),
        rows: top.div_ceil(BLOCK_SIZE).min(blocks_y),
    };
    if extent.cols < blocks_x || extent.rows < blocks_y {
        dst.fill(P::Pixel::default());
    }

    for by in 0..extent.rows {
        for bx in 0..extent.cols {
            dst[by * row_pitch + bx] = convert::<P>(info, planes, block_offset(bx, by));
        }
    }
    extent
}
