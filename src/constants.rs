pub const BLOCK_SIZE: usize = 8;
pub const BLOCK_DIM: usize = BLOCK_SIZE * BLOCK_SIZE;

// MCU planes hold at most four blocks, arranged as a 2x2 grid.
pub const MAX_BLOCKS_PER_ROW: usize = 2;
pub const MAX_BLOCKS_PER_MCU: usize = 4;
pub const MCU_PLANE_SIZE: usize = MAX_BLOCKS_PER_MCU * BLOCK_DIM;

// Bytes requested from a ByteSource per refill of the staging buffer.
pub const INPUT_BUFFER_SIZE: usize = 256;

pub const MAX_QUANTIZATION_TABLES: usize = 4;
pub const MAX_HUFFMAN_TABLES: usize = 4;
pub const MAX_HUFFMAN_CODE_LENGTH: usize = 16;
pub const MAX_HUFFMAN_VALUES: usize = 256;

pub const SUPPORTED_BITS_PER_SAMPLE: u8 = 8;

// The size in bytes of the segment length field.
pub const SEGMENT_LENGTH_SIZE: usize = 2;

/// Zigzag scan pattern for 8x8 blocks: natural index of the k-th coefficient.
pub const ZIGZAG_ORDER: [usize; BLOCK_DIM] = [
    0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Byte offset of block `(bx, by)` inside an MCU plane.
#[inline]
pub const fn block_offset(bx: usize, by: usize) -> usize {
    (by * MAX_BLOCKS_PER_ROW + bx) * BLOCK_DIM
}
