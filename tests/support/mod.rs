//! Minimal baseline JPEG writer used to build test streams.
//!
//! Float FDCT, the ITU-T T.81 Annex K luminance Huffman tables for every
//! component, optional restart markers and any of the supported sampling
//! layouts. Not tuned for compression.

#![allow(dead_code)]

use std::f32::consts::PI;

pub const ZIGZAG_ORDER: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27, 20, 13, 6, 7, 14, 21,
    28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58, 59, 52, 45, 38, 31, 39, 46, 53, 60, 61,
    54, 47, 55, 62, 63,
];

pub const STD_LUMINANCE_DC_LENGTHS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
pub const STD_LUMINANCE_DC_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
pub const STD_LUMINANCE_AC_LENGTHS: [u8; 16] = [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 125];
pub const STD_LUMINANCE_AC_VALUES: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14,
    0x32, 0x81, 0x91, 0xa1, 0x08, 0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09,
    0x0a, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a,
    0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65,
    0x66, 0x67, 0x68, 0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88,
    0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9,
    0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca,
    0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea,
    0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa,
];

/// Standard luminance quantization table (quality 50), natural order.
pub const STD_LUMINANCE_QUANT_TABLE: [u8; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69, 56, 14, 17, 22, 29,
    51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81, 104, 113, 92, 49, 64, 78, 87, 103, 121, 120,
    101, 72, 92, 95, 98, 112, 100, 103, 99,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    Gray,
    H1V1,
    H2V1,
    H1V2,
    H2V2,
}

impl Sampling {
    pub fn luma_factors(self) -> (usize, usize) {
        match self {
            Sampling::Gray | Sampling::H1V1 => (1, 1),
            Sampling::H2V1 => (2, 1),
            Sampling::H1V2 => (1, 2),
            Sampling::H2V2 => (2, 2),
        }
    }

    pub fn component_count(self) -> usize {
        if self == Sampling::Gray { 1 } else { 3 }
    }
}

/// Full-resolution source planes: one for grayscale, Y/Cb/Cr otherwise.
pub struct SourceImage {
    pub width: usize,
    pub height: usize,
    pub planes: Vec<Vec<u8>>,
}

impl SourceImage {
    pub fn gray(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> Self {
        let mut plane = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                plane.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            planes: vec![plane],
        }
    }

    pub fn flat_ycbcr(width: usize, height: usize, y: u8, cb: u8, cr: u8) -> Self {
        Self {
            width,
            height,
            planes: vec![vec![y; width * height], vec![cb; width * height], vec![cr; width * height]],
        }
    }

    /// Sample with edge replication for positions in the MCU padding.
    fn sample(&self, plane: usize, x: usize, y: usize) -> f32 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.planes[plane][y * self.width + x] as f32
    }
}

#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub sampling: Sampling,
    /// Quantization table in natural order, used for every component.
    pub quant_table: [u8; 64],
    pub restart_interval: u16,
    /// Emit a progressive SOF2 marker instead of SOF0 (header only).
    pub progressive_marker: bool,
    /// Extra APPn/COM segments written before the frame header.
    pub with_metadata: bool,
}

impl WriterOptions {
    pub fn new(sampling: Sampling) -> Self {
        Self {
            sampling,
            quant_table: [1; 64],
            restart_interval: 0,
            progressive_marker: false,
            with_metadata: false,
        }
    }

    pub fn quant_table(mut self, table: [u8; 64]) -> Self {
        self.quant_table = table;
        self
    }

    pub fn restart_interval(mut self, interval: u16) -> Self {
        self.restart_interval = interval;
        self
    }

    pub fn progressive_marker(mut self) -> Self {
        self.progressive_marker = true;
        self
    }

    pub fn with_metadata(mut self) -> Self {
        self.with_metadata = true;
        self
    }
}

struct HuffmanCodes {
    codes: [(u16, u8); 256],
}

impl HuffmanCodes {
    fn from_dht(lengths: &[u8; 16], values: &[u8]) -> Self {
        let mut codes = [(0u16, 0u8); 256];
        let mut code = 0u16;
        let mut k = 0;
        for (i, &count) in lengths.iter().enumerate() {
            for _ in 0..count {
                codes[values[k] as usize] = (code, i as u8 + 1);
                code += 1;
                k += 1;
            }
            code <<= 1;
        }
        Self { codes }
    }

    fn write(&self, writer: &mut BitWriter, symbol: u8) {
        let (code, length) = self.codes[symbol as usize];
        assert!(length > 0, "symbol {:#04x} has no code", symbol);
        writer.write_bits(code, length);
    }
}

struct BitWriter {
    out: Vec<u8>,
    bit_buffer: u32,
    bits_in_buffer: u32,
}

impl BitWriter {
    fn new(out: Vec<u8>) -> Self {
        Self {
            out,
            bit_buffer: 0,
            bits_in_buffer: 0,
        }
    }

    fn write_bits(&mut self, value: u16, length: u8) {
        if length == 0 {
            return;
        }
        let length = length as u32;
        self.bit_buffer = (self.bit_buffer << length) | (value as u32 & ((1 << length) - 1));
        self.bits_in_buffer += length;
        while self.bits_in_buffer >= 8 {
            self.bits_in_buffer -= 8;
            let byte = (self.bit_buffer >> self.bits_in_buffer) as u8;
            self.out.push(byte);
            if byte == 0xFF {
                self.out.push(0x00);
            }
            self.bit_buffer &= (1 << self.bits_in_buffer) - 1;
        }
    }

    /// Pads the last byte with ones.
    fn flush(&mut self) {
        if self.bits_in_buffer > 0 {
            let pad = 8 - self.bits_in_buffer;
            self.write_bits((1 << pad) - 1, pad as u8);
        }
    }

    fn into_inner(mut self) -> Vec<u8> {
        self.flush();
        self.out
    }
}

fn category(value: i32) -> u8 {
    (32 - value.unsigned_abs().leading_zeros()) as u8
}

fn magnitude_bits(value: i32, category: u8) -> u16 {
    if value >= 0 {
        value as u16
    } else {
        (value + (1 << category) - 1) as u16
    }
}

fn fdct_8x8(input: &[f32; 64], output: &mut [f32; 64]) {
    for u in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0f32;
            for x in 0..8 {
                for y in 0..8 {
                    let cos_x = (((2 * x + 1) * u) as f32 * PI / 16.0).cos();
                    let cos_y = (((2 * y + 1) * v) as f32 * PI / 16.0).cos();
                    sum += input[x * 8 + y] * cos_x * cos_y;
                }
            }
            let cu = if u == 0 { 1.0 / 2.0f32.sqrt() } else { 1.0 };
            let cv = if v == 0 { 1.0 / 2.0f32.sqrt() } else { 1.0 };
            output[u * 8 + v] = 0.25 * cu * cv * sum;
        }
    }
}

fn segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
}

fn dht_payload(class_id: u8, lengths: &[u8; 16], values: &[u8]) -> Vec<u8> {
    let mut payload = vec![class_id];
    payload.extend_from_slice(lengths);
    payload.extend_from_slice(values);
    payload
}

/// Encodes `image` as a baseline JPEG stream.
pub fn encode(image: &SourceImage, options: &WriterOptions) -> Vec<u8> {
    let sampling = options.sampling;
    let components = sampling.component_count();
    assert_eq!(image.planes.len(), components);
    let (h, v) = sampling.luma_factors();

    let mut out = vec![0xFF, 0xD8];
    if options.with_metadata {
        segment(&mut out, 0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
        segment(&mut out, 0xFE, b"written by the test support encoder");
        segment(&mut out, 0xE1, &[0xFFu8; 40]);
    }

    let mut dqt = vec![0u8];
    for k in 0..64 {
        dqt.push(options.quant_table[ZIGZAG_ORDER[k]]);
    }
    segment(&mut out, 0xDB, &dqt);

    let mut sof = vec![8];
    sof.extend_from_slice(&(image.height as u16).to_be_bytes());
    sof.extend_from_slice(&(image.width as u16).to_be_bytes());
    sof.push(components as u8);
    for c in 0..components {
        let factors = if c == 0 { ((h as u8) << 4) | v as u8 } else { 0x11 };
        sof.extend_from_slice(&[c as u8 + 1, factors, 0]);
    }
    segment(&mut out, if options.progressive_marker { 0xC2 } else { 0xC0 }, &sof);

    let mut dht = dht_payload(0x00, &STD_LUMINANCE_DC_LENGTHS, &STD_LUMINANCE_DC_VALUES);
    dht.extend(dht_payload(0x10, &STD_LUMINANCE_AC_LENGTHS, &STD_LUMINANCE_AC_VALUES));
    segment(&mut out, 0xC4, &dht);
    let mut dht = dht_payload(0x01, &STD_LUMINANCE_DC_LENGTHS, &STD_LUMINANCE_DC_VALUES);
    dht.extend(dht_payload(0x11, &STD_LUMINANCE_AC_LENGTHS, &STD_LUMINANCE_AC_VALUES));
    segment(&mut out, 0xC4, &dht);

    if options.restart_interval > 0 {
        segment(&mut out, 0xDD, &options.restart_interval.to_be_bytes());
    }

    let mut sos = vec![components as u8];
    for c in 0..components {
        sos.extend_from_slice(&[c as u8 + 1, if c == 0 { 0x00 } else { 0x11 }]);
    }
    sos.extend_from_slice(&[0, 63, 0]);
    segment(&mut out, 0xDA, &sos);

    let dc_codes = HuffmanCodes::from_dht(&STD_LUMINANCE_DC_LENGTHS, &STD_LUMINANCE_DC_VALUES);
    let ac_codes = HuffmanCodes::from_dht(&STD_LUMINANCE_AC_LENGTHS, &STD_LUMINANCE_AC_VALUES);
    let mut writer = BitWriter::new(out);

    let mcu_w = h * 8;
    let mcu_h = v * 8;
    let mcus_x = image.width.div_ceil(mcu_w);
    let mcus_y = image.height.div_ceil(mcu_h);
    let mut predictors = [0i32; 3];
    let mut restart_index = 0u8;

    for mcu in 0..mcus_x * mcus_y {
        if options.restart_interval > 0 && mcu > 0 && mcu % options.restart_interval as usize == 0 {
            writer.flush();
            writer.out.extend_from_slice(&[0xFF, 0xD0 + restart_index]);
            restart_index = (restart_index + 1) & 7;
            predictors = [0; 3];
        }
        let mx = (mcu % mcus_x) * mcu_w;
        let my = (mcu / mcus_x) * mcu_h;

        for c in 0..components {
            if c == 0 {
                for by in 0..v {
                    for bx in 0..h {
                        let block = std::array::from_fn(|i| {
                            image.sample(0, mx + bx * 8 + i % 8, my + by * 8 + i / 8)
                        });
                        encode_block(&mut writer, &block, options, &mut predictors[0], &dc_codes, &ac_codes);
                    }
                }
            } else {
                // One chroma sample per h x v luma pixels.
                let block = std::array::from_fn(|i| {
                    let mut sum = 0.0;
                    for dy in 0..v {
                        for dx in 0..h {
                            sum += image.sample(c, mx + (i % 8) * h + dx, my + (i / 8) * v + dy);
                        }
                    }
                    sum / (h * v) as f32
                });
                encode_block(&mut writer, &block, options, &mut predictors[c], &dc_codes, &ac_codes);
            }
        }
    }

    let mut out = writer.into_inner();
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

fn encode_block(
    writer: &mut BitWriter,
    samples: &[f32; 64],
    options: &WriterOptions,
    predictor: &mut i32,
    dc_codes: &HuffmanCodes,
    ac_codes: &HuffmanCodes,
) {
    let shifted: [f32; 64] = std::array::from_fn(|i| samples[i] - 128.0);
    let mut coefficients = [0f32; 64];
    fdct_8x8(&shifted, &mut coefficients);

    let quantized: [i32; 64] = std::array::from_fn(|k| {
        let natural = ZIGZAG_ORDER[k];
        (coefficients[natural] / options.quant_table[natural] as f32).round() as i32
    });

    let diff = quantized[0] - *predictor;
    *predictor = quantized[0];
    let cat = category(diff);
    dc_codes.write(writer, cat);
    writer.write_bits(magnitude_bits(diff, cat), cat);

    let mut run = 0u8;
    for &value in &quantized[1..] {
        if value == 0 {
            run += 1;
            continue;
        }
        while run >= 16 {
            ac_codes.write(writer, 0xF0);
            run -= 16;
        }
        let cat = category(value);
        ac_codes.write(writer, (run << 4) | cat);
        writer.write_bits(magnitude_bits(value, cat), cat);
        run = 0;
    }
    if run > 0 {
        ac_codes.write(writer, 0x00);
    }
}

/// Builds a grayscale image whose 8x8 blocks are each flat.
pub fn flat_block_gray(width: usize, height: usize, value_of_block: impl Fn(usize, usize) -> u8) -> SourceImage {
    SourceImage::gray(width, height, |x, y| value_of_block(x / 8, y / 8))
}

/// Offset of the first entropy-coded byte, just past the SOS segment.
pub fn scan_data_offset(data: &[u8]) -> usize {
    let sos = data
        .windows(2)
        .position(|w| w == [0xFF, 0xDA])
        .expect("stream has a start of scan marker");
    let length = u16::from_be_bytes([data[sos + 2], data[sos + 3]]) as usize;
    sos + 2 + length
}
