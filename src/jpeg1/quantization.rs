//! Dequantization for JPEG 1.
//! Quantization tables are kept in the zigzag order they are transmitted in.

use crate::constants::{BLOCK_DIM, ZIGZAG_ORDER};

/// A DQT table, entries in zigzag order.
pub type QuantizationTable = [u16; BLOCK_DIM];

/// De-quantizes coefficients given in zigzag order and writes them to
/// `output` in natural (row-major) order.
pub fn dequantize_block(coefficients: &[i32; BLOCK_DIM], table: &QuantizationTable, output: &mut [i32; BLOCK_DIM]) {
    for k in 0..BLOCK_DIM {
        output[ZIGZAG_ORDER[k]] = coefficients[k].saturating_mul(table[k] as i32);
    }
}
