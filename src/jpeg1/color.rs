//! YCbCr to RGB conversion and the writers that fill MCU planes.

use crate::constants::{BLOCK_DIM, BLOCK_SIZE, block_offset};
use crate::McuPlanes;

// ITU-R BT.601 (JFIF) factors in 16-bit fixed point.
const CR_TO_R: i32 = 91881;
const CB_TO_G: i32 = -22554;
const CR_TO_G: i32 = -46802;
const CB_TO_B: i32 = 116130;
const ROUND: i32 = 1 << 15;

#[inline]
fn clamp(x: i32) -> u8 {
    x.clamp(0, 255) as u8
}

/// Converts one JFIF YCbCr sample to RGB.
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> (u8, u8, u8) {
    let y = y as i32;
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;
    let r = y + ((CR_TO_R * cr + ROUND) >> 16);
    let g = y + ((CB_TO_G * cb + CR_TO_G * cr + ROUND) >> 16);
    let b = y + ((CB_TO_B * cb + ROUND) >> 16);
    (clamp(r), clamp(g), clamp(b))
}

/// Copies a grayscale block into the R plane.
pub fn write_gray_block(planes: &mut McuPlanes, samples: &[u8; BLOCK_DIM]) {
    planes.r[..BLOCK_DIM].copy_from_slice(samples);
}

/// Converts a full-resolution colour MCU. `luma` holds `h * v` blocks in
/// scan order, the single chroma blocks are upsampled by replication.
pub fn write_colour_mcu(
    planes: &mut McuPlanes,
    luma: &[[u8; BLOCK_DIM]],
    h: usize,
    v: usize,
    cb: &[u8; BLOCK_DIM],
    cr: &[u8; BLOCK_DIM],
) {
    for by in 0..v {
        for bx in 0..h {
            let block = &luma[by * h + bx];
            let base = block_offset(bx, by);
            for row in 0..BLOCK_SIZE {
                let chroma_row = ((by * BLOCK_SIZE + row) / v) * BLOCK_SIZE;
                for col in 0..BLOCK_SIZE {
                    let ci = chroma_row + (bx * BLOCK_SIZE + col) / h;
                    let (r, g, b) = ycbcr_to_rgb(block[row * BLOCK_SIZE + col], cb[ci], cr[ci]);
                    let dst = base + row * BLOCK_SIZE + col;
                    planes.r[dst] = r;
                    planes.g[dst] = g;
                    planes.b[dst] = b;
                }
            }
        }
    }
}

/// Reduced mode: one pixel per luma block, stored as the first sample of
/// the block's slot.
pub fn write_colour_mcu_reduced(planes: &mut McuPlanes, luma: &[u8], h: usize, v: usize, cb: u8, cr: u8) {
    for by in 0..v {
        for bx in 0..h {
            let (r, g, b) = ycbcr_to_rgb(luma[by * h + bx], cb, cr);
            let dst = block_offset(bx, by);
            planes.r[dst] = r;
            planes.g[dst] = g;
            planes.b[dst] = b;
        }
    }
}
