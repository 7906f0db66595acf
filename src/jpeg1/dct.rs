//! Inverse Discrete Cosine Transform for JPEG 1.
//!
//! Integer implementation of the IJG "islow" algorithm: a separable
//! row/column pass with 13-bit fixed-point constants. Rows or columns whose
//! AC terms are all zero take a shortcut, so flat blocks are exact.

use crate::constants::{BLOCK_DIM, BLOCK_SIZE};

// Intermediates are 64-bit: dequantized coefficients are not range-limited.
const CONST_BITS: i64 = 13;
const PASS1_BITS: i64 = 2;

const FIX_0_298631336: i64 = 2446;
const FIX_0_390180644: i64 = 3196;
const FIX_0_541196100: i64 = 4433;
const FIX_0_765366865: i64 = 6270;
const FIX_0_899976223: i64 = 7373;
const FIX_1_175875602: i64 = 9633;
const FIX_1_501321110: i64 = 12299;
const FIX_1_847759065: i64 = 15137;
const FIX_1_961570560: i64 = 16069;
const FIX_2_053119869: i64 = 16819;
const FIX_2_562915447: i64 = 20995;
const FIX_3_072711026: i64 = 25172;

#[inline]
fn descale(x: i64, n: i64) -> i64 {
    (x + (1 << (n - 1))) >> n
}

#[inline]
fn clamp_sample(x: i64) -> u8 {
    (x + 128).clamp(0, 255) as u8
}

/// Sample value of a block whose only non-zero coefficient is the
/// dequantized DC term. Matches what [`idct_8x8`] produces for such a block.
#[inline]
pub fn dc_only_sample(dc: i32) -> u8 {
    clamp_sample(descale((dc as i64) << PASS1_BITS, PASS1_BITS + 3))
}

/// One 8-point butterfly; returns the outputs in natural order, still scaled.
#[inline]
fn idct_1d(d: [i64; BLOCK_SIZE]) -> [i64; BLOCK_SIZE] {
    let z1 = (d[2] + d[6]) * FIX_0_541196100;
    let tmp2 = z1 + d[6] * -FIX_1_847759065;
    let tmp3 = z1 + d[2] * FIX_0_765366865;
    let tmp0 = (d[0] + d[4]) << CONST_BITS;
    let tmp1 = (d[0] - d[4]) << CONST_BITS;
    let (t10, t13) = (tmp0 + tmp3, tmp0 - tmp3);
    let (t11, t12) = (tmp1 + tmp2, tmp1 - tmp2);

    let (z1, z2, z3, z4) = (d[7] + d[1], d[5] + d[3], d[7] + d[3], d[5] + d[1]);
    let z5 = (z3 + z4) * FIX_1_175875602;
    let mut o0 = d[7] * FIX_0_298631336;
    let mut o1 = d[5] * FIX_2_053119869;
    let mut o2 = d[3] * FIX_3_072711026;
    let mut o3 = d[1] * FIX_1_501321110;
    let z1 = z1 * -FIX_0_899976223;
    let z2 = z2 * -FIX_2_562915447;
    let z3 = z3 * -FIX_1_961570560 + z5;
    let z4 = z4 * -FIX_0_390180644 + z5;
    o0 += z1 + z3;
    o1 += z2 + z4;
    o2 += z2 + z3;
    o3 += z1 + z4;

    [
        t10 + o3,
        t11 + o2,
        t12 + o1,
        t13 + o0,
        t13 - o0,
        t12 - o1,
        t11 - o2,
        t10 - o3,
    ]
}

/// Transforms dequantized coefficients (natural order) into level-shifted
/// 8-bit samples.
pub fn idct_8x8(input: &[i32; BLOCK_DIM], output: &mut [u8; BLOCK_DIM]) {
    let mut workspace = [0i64; BLOCK_DIM];

    for row in 0..BLOCK_SIZE {
        let b = row * BLOCK_SIZE;
        let d: [i64; BLOCK_SIZE] = std::array::from_fn(|i| input[b + i] as i64);
        if d[1..].iter().all(|&c| c == 0) {
            workspace[b..b + BLOCK_SIZE].fill(d[0] << PASS1_BITS);
            continue;
        }
        let out = idct_1d(d);
        for (i, v) in out.into_iter().enumerate() {
            workspace[b + i] = descale(v, CONST_BITS - PASS1_BITS);
        }
    }

    for col in 0..BLOCK_SIZE {
        let d: [i64; BLOCK_SIZE] = std::array::from_fn(|i| workspace[col + i * BLOCK_SIZE]);
        if d[1..].iter().all(|&c| c == 0) {
            let v = clamp_sample(descale(d[0], PASS1_BITS + 3));
            for i in 0..BLOCK_SIZE {
                output[col + i * BLOCK_SIZE] = v;
            }
            continue;
        }
        let out = idct_1d(d);
        for (i, v) in out.into_iter().enumerate() {
            output[col + i * BLOCK_SIZE] = clamp_sample(descale(v, CONST_BITS + PASS1_BITS + 3));
        }
    }
}
