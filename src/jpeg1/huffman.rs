//! Huffman decoding for baseline JPEG.
//! Tables are built from DHT segments, bits are pulled one byte at a time
//! from the staging buffer with byte-stuffing (FF00) removed.

use crate::byte_source::ByteSource;
use crate::constants::MAX_HUFFMAN_CODE_LENGTH;
use crate::error::JpegDecError;
use crate::jpeg_marker_code::JPEG_MARKER_START_BYTE;
use crate::jpeg_stream_reader::StreamInput;

/// Canonical Huffman table in the min-code/max-code form of ISO/IEC 10918-1
/// Annex F.2.2.3.
#[derive(Clone)]
pub struct HuffmanTable {
    pub lengths: [u8; MAX_HUFFMAN_CODE_LENGTH],
    pub values: Vec<u8>,
    pub min_code: [i32; MAX_HUFFMAN_CODE_LENGTH],
    pub max_code: [i32; MAX_HUFFMAN_CODE_LENGTH],
    pub val_ptr: [i32; MAX_HUFFMAN_CODE_LENGTH],
}

impl HuffmanTable {
    /// Builds a table from JPEG DHT lengths and values.
    ///
    /// Fails when the code lengths overflow their bit width, which a
    /// well-formed table can never do.
    pub fn build_from_dht(lengths: &[u8; MAX_HUFFMAN_CODE_LENGTH], values: &[u8]) -> Result<Self, JpegDecError> {
        let total: usize = lengths.iter().map(|&n| n as usize).sum();
        if total == 0 || total != values.len() {
            return Err(JpegDecError::InvalidHuffmanTable);
        }

        let mut table = Self {
            lengths: *lengths,
            values: values.to_vec(),
            min_code: [0; MAX_HUFFMAN_CODE_LENGTH],
            max_code: [-1; MAX_HUFFMAN_CODE_LENGTH],
            val_ptr: [0; MAX_HUFFMAN_CODE_LENGTH],
        };

        let mut code = 0i32;
        let mut val_idx = 0i32;
        for i in 0..MAX_HUFFMAN_CODE_LENGTH {
            let n_codes = lengths[i] as i32;
            if n_codes > 0 {
                table.val_ptr[i] = val_idx;
                table.min_code[i] = code;
                code += n_codes;
                val_idx += n_codes;
                if code > (1 << (i + 1)) {
                    return Err(JpegDecError::InvalidHuffmanTable);
                }
                table.max_code[i] = code - 1;
            }
            code <<= 1;
        }
        Ok(table)
    }

    /// Decodes the next symbol from the given JpegBitReader.
    pub fn decode<S: ByteSource + ?Sized>(&self, reader: &mut JpegBitReader<'_, S>) -> Result<u8, JpegDecError> {
        let mut code = 0i32;
        for i in 0..MAX_HUFFMAN_CODE_LENGTH {
            code = (code << 1) | reader.read_bit()? as i32;
            if code <= self.max_code[i] {
                let idx = self.val_ptr[i] + (code - self.min_code[i]);
                return Ok(self.values[idx as usize]);
            }
        }
        Err(JpegDecError::InvalidHuffmanCode)
    }
}

/// Reads entropy-coded bits from a [`StreamInput`].
///
/// The bit position lives in the input itself, so a reader can be created
/// per MCU without losing state between calls.
pub struct JpegBitReader<'a, S: ?Sized> {
    input: &'a mut StreamInput,
    source: &'a mut S,
}

impl<'a, S: ByteSource + ?Sized> JpegBitReader<'a, S> {
    pub fn new(input: &'a mut StreamInput, source: &'a mut S) -> Self {
        Self { input, source }
    }

    pub fn read_bit(&mut self) -> Result<u8, JpegDecError> {
        if self.input.bits_left == 0 {
            self.input.bit_buffer = self.read_byte_unstuffed()?;
            self.input.bits_left = 8;
        }
        self.input.bits_left -= 1;
        Ok((self.input.bit_buffer >> self.input.bits_left) & 1)
    }

    pub fn read_bits(&mut self, count: u8) -> Result<u16, JpegDecError> {
        let mut value = 0u16;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u16;
        }
        Ok(value)
    }

    /// Discards the partially consumed byte and reads a restart marker.
    /// Returns the marker code byte.
    pub fn read_restart_marker(&mut self) -> Result<u8, JpegDecError> {
        self.input.align_to_byte();
        let mut byte = self.input.read_u8(&mut *self.source)?;
        if byte != JPEG_MARKER_START_BYTE {
            return Err(JpegDecError::RestartMarkerNotFound);
        }
        while byte == JPEG_MARKER_START_BYTE {
            byte = self.input.read_u8(&mut *self.source)?;
        }
        Ok(byte)
    }

    fn read_byte_unstuffed(&mut self) -> Result<u8, JpegDecError> {
        let byte = self.input.read_u8(&mut *self.source)?;
        if byte == JPEG_MARKER_START_BYTE {
            let next_byte = self.input.read_u8(&mut *self.source)?;
            if next_byte != 0x00 {
                // A marker inside entropy-coded data that the decoder did
                // not ask for: the scan is truncated or damaged.
                return Err(JpegDecError::UnexpectedMarker);
            }
        }
        Ok(byte)
    }
}

/// Sign-extends a `category`-bit magnitude (ISO/IEC 10918-1 F.2.2.1).
pub fn extend(bits: u16, category: u8) -> i32 {
    if category == 0 {
        return 0;
    }
    let threshold = 1i32 << (category - 1);
    let bits = bits as i32;
    if bits >= threshold {
        bits
    } else {
        bits - (1 << category) + 1
    }
}
