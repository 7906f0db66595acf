//! Marker-segment parsing over a pulled byte stream.
//!
//! The reader never holds more than one staging buffer of input. It parses
//! everything up to and including the first start-of-scan segment; the
//! entropy-coded data that follows is consumed through the same
//! [`StreamInput`] by the block decoder.

use crate::byte_source::ByteSource;
use crate::constants::{
    BLOCK_DIM, INPUT_BUFFER_SIZE, MAX_HUFFMAN_CODE_LENGTH, MAX_HUFFMAN_TABLES,
    MAX_HUFFMAN_VALUES, MAX_QUANTIZATION_TABLES, SEGMENT_LENGTH_SIZE, SUPPORTED_BITS_PER_SAMPLE,
};
use crate::error::JpegDecError;
use crate::jpeg1::huffman::HuffmanTable;
use crate::jpeg1::quantization::QuantizationTable;
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};
use crate::ScanType;

/// Staging buffer between a [`ByteSource`] and the parsers, plus the bit
/// position used while reading entropy-coded data.
pub struct StreamInput {
    buffer: [u8; INPUT_BUFFER_SIZE],
    position: usize,
    length: usize,
    pub(crate) bit_buffer: u8,
    pub(crate) bits_left: u8,
}

impl Default for StreamInput {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamInput {
    pub fn new() -> Self {
        Self {
            buffer: [0; INPUT_BUFFER_SIZE],
            position: 0,
            length: 0,
            bit_buffer: 0,
            bits_left: 0,
        }
    }

    pub fn read_u8<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<u8, JpegDecError> {
        if self.position >= self.length {
            self.length = source.fill(&mut self.buffer);
            self.position = 0;
            if self.length == 0 {
                return Err(JpegDecError::UnexpectedEndOfStream);
            }
        }
        let val = self.buffer[self.position];
        self.position += 1;
        Ok(val)
    }

    pub fn read_u16<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<u16, JpegDecError> {
        let b1 = self.read_u8(source)? as u16;
        let b2 = self.read_u8(source)? as u16;
        Ok((b1 << 8) | b2)
    }

    pub fn skip<S: ByteSource + ?Sized>(&mut self, source: &mut S, count: usize) -> Result<(), JpegDecError> {
        for _ in 0..count {
            self.read_u8(source)?;
        }
        Ok(())
    }

    /// Drops the bits left over from the current entropy-coded byte.
    pub fn align_to_byte(&mut self) {
        self.bits_left = 0;
        self.bit_buffer = 0;
    }
}

#[derive(Debug, Clone, Default)]
pub struct JpegComponent {
    pub id: u8,
    pub h_samp_factor: u8,
    pub v_samp_factor: u8,
    pub quant_table_dest: u8,
    pub dc_table_dest: u8,
    pub ac_table_dest: u8,
}

pub struct JpegStreamReader {
    pub input: StreamInput,
    pub width: u16,
    pub height: u16,
    pub bits_per_sample: u8,
    pub components: Vec<JpegComponent>,
    pub quantization_tables: [Option<QuantizationTable>; MAX_QUANTIZATION_TABLES],
    pub huffman_tables_dc: [Option<HuffmanTable>; MAX_HUFFMAN_TABLES],
    pub huffman_tables_ac: [Option<HuffmanTable>; MAX_HUFFMAN_TABLES],
    pub restart_interval: u16,
    pub scan_component_indices: Vec<usize>,
}

impl Default for JpegStreamReader {
    fn default() -> Self {
        Self::new()
    }
}

impl JpegStreamReader {
    pub fn new() -> Self {
        Self {
            input: StreamInput::new(),
            width: 0,
            height: 0,
            bits_per_sample: 0,
            components: Vec::new(),
            quantization_tables: [None; MAX_QUANTIZATION_TABLES],
            huffman_tables_dc: [const { None }; MAX_HUFFMAN_TABLES],
            huffman_tables_ac: [const { None }; MAX_HUFFMAN_TABLES],
            restart_interval: 0,
            scan_component_indices: Vec::new(),
        }
    }

    /// Parses SOI and all segments up to and including the first SOS.
    pub fn read_header<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<(), JpegDecError> {
        self.read_start_of_image(source)?;

        loop {
            let marker_byte = self.read_next_marker(source)?;
            let Ok(marker) = JpegMarkerCode::try_from(marker_byte) else {
                // APPn, COM, JPGn and reserved markers.
                self.skip_segment(source)?;
                continue;
            };

            match marker {
                JpegMarkerCode::StartOfFrameBaseline | JpegMarkerCode::StartOfFrameExtendedSequential => {
                    if !self.components.is_empty() {
                        return Err(JpegDecError::DuplicateStartOfFrameMarker);
                    }
                    self.read_start_of_frame_segment(source)?;
                }
                JpegMarkerCode::StartOfFrameProgressive => {
                    return Err(JpegDecError::ProgressiveNotSupported);
                }
                JpegMarkerCode::StartOfFrameArithmeticSequential
                | JpegMarkerCode::StartOfFrameArithmeticProgressive
                | JpegMarkerCode::StartOfFrameArithmeticLossless
                | JpegMarkerCode::StartOfFrameArithmeticDifferentialSequential
                | JpegMarkerCode::StartOfFrameArithmeticDifferentialProgressive
                | JpegMarkerCode::StartOfFrameArithmeticDifferentialLossless
                | JpegMarkerCode::DefineArithmeticCoding => {
                    return Err(JpegDecError::ArithmeticCodingNotSupported);
                }
                JpegMarkerCode::StartOfFrameLossless
                | JpegMarkerCode::StartOfFrameDifferentialSequential
                | JpegMarkerCode::StartOfFrameDifferentialProgressive
                | JpegMarkerCode::StartOfFrameDifferentialLossless => {
                    return Err(JpegDecError::FrameTypeNotSupported);
                }
                JpegMarkerCode::DefineHuffmanTable => {
                    self.read_dht_segment(source)?;
                }
                JpegMarkerCode::DefineQuantizationTable => {
                    self.read_dqt_segment(source)?;
                }
                JpegMarkerCode::DefineRestartInterval => {
                    self.read_dri_segment(source)?;
                }
                JpegMarkerCode::StartOfScan => {
                    if self.components.is_empty() {
                        return Err(JpegDecError::StartOfFrameMarkerNotFound);
                    }
                    self.read_start_of_scan_segment(source)?;
                    break;
                }
                JpegMarkerCode::EndOfImage => {
                    return Err(if self.components.is_empty() {
                        JpegDecError::StartOfFrameMarkerNotFound
                    } else {
                        JpegDecError::UnexpectedMarker
                    });
                }
                JpegMarkerCode::StartOfImage | JpegMarkerCode::DefineNumberOfLines => {
                    return Err(JpegDecError::UnexpectedMarker);
                }
                m if m.is_standalone() => {}
                _ => {
                    self.skip_segment(source)?;
                }
            }
        }
        Ok(())
    }

    fn read_start_of_image<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<(), JpegDecError> {
        let first = self
            .input
            .read_u8(source)
            .map_err(|_| JpegDecError::StartOfImageMarkerNotFound)?;
        let second = self
            .input
            .read_u8(source)
            .map_err(|_| JpegDecError::StartOfImageMarkerNotFound)?;
        if first != JPEG_MARKER_START_BYTE || second != u8::from(JpegMarkerCode::StartOfImage) {
            return Err(JpegDecError::StartOfImageMarkerNotFound);
        }
        Ok(())
    }

    /// Skips to the next marker and returns its code. Garbage between
    /// segments and fill bytes (0xFF runs) are tolerated.
    fn read_next_marker<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<u8, JpegDecError> {
        loop {
            let mut byte = self.input.read_u8(source)?;
            if byte != JPEG_MARKER_START_BYTE {
                continue;
            }
            while byte == JPEG_MARKER_START_BYTE {
                byte = self.input.read_u8(source)?;
            }
            if byte != 0 {
                return Ok(byte);
            }
        }
    }

    /// Reads a segment length and returns the number of payload bytes.
    fn read_segment_length<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<usize, JpegDecError> {
        let length = self.input.read_u16(source)? as usize;
        if length < SEGMENT_LENGTH_SIZE {
            return Err(JpegDecError::InvalidMarkerSegmentSize);
        }
        Ok(length - SEGMENT_LENGTH_SIZE)
    }

    pub fn skip_segment<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<(), JpegDecError> {
        let length = self.read_segment_length(source)?;
        self.input.skip(source, length)
    }

    fn read_start_of_frame_segment<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<(), JpegDecError> {
        let length = self.read_segment_length(source)?;
        self.bits_per_sample = self.input.read_u8(source)?;
        self.height = self.input.read_u16(source)?;
        self.width = self.input.read_u16(source)?;
        let component_count = self.input.read_u8(source)? as usize;

        if self.bits_per_sample != SUPPORTED_BITS_PER_SAMPLE {
            return Err(JpegDecError::PrecisionNotSupported);
        }
        if self.width == 0 || self.height == 0 {
            return Err(JpegDecError::InvalidDimensions);
        }
        if component_count != 1 && component_count != 3 {
            return Err(JpegDecError::ComponentCountNotSupported);
        }
        if length != 6 + component_count * 3 {
            return Err(JpegDecError::InvalidStartOfFrame);
        }

        for _ in 0..component_count {
            let id = self.input.read_u8(source)?;
            let sampling = self.input.read_u8(source)?;
            let tq = self.input.read_u8(source)?;
            let component = JpegComponent {
                id,
                h_samp_factor: sampling >> 4,
                v_samp_factor: sampling & 0x0F,
                quant_table_dest: tq,
                dc_table_dest: 0,
                ac_table_dest: 0,
            };
            if !(1..=4).contains(&component.h_samp_factor) || !(1..=4).contains(&component.v_samp_factor) {
                return Err(JpegDecError::InvalidStartOfFrame);
            }
            if tq as usize >= MAX_QUANTIZATION_TABLES {
                return Err(JpegDecError::InvalidQuantizationTableIndex);
            }
            if self.components.iter().any(|c| c.id == id) {
                return Err(JpegDecError::InvalidStartOfFrame);
            }
            self.components.push(component);
        }

        // Rejects unsupported sampling layouts early.
        self.scan_type()?;
        Ok(())
    }

    /// Scan type implied by the frame's component count and sampling factors.
    pub fn scan_type(&self) -> Result<ScanType, JpegDecError> {
        match self.components.as_slice() {
            [_] => Ok(ScanType::Grayscale),
            [luma, cb, cr] => {
                if (cb.h_samp_factor, cb.v_samp_factor) != (1, 1) || (cr.h_samp_factor, cr.v_samp_factor) != (1, 1) {
                    return Err(JpegDecError::SamplingFactorsNotSupported);
                }
                match (luma.h_samp_factor, luma.v_samp_factor) {
                    (1, 1) => Ok(ScanType::YH1V1),
                    (2, 1) => Ok(ScanType::YH2V1),
                    (1, 2) => Ok(ScanType::YH1V2),
                    (2, 2) => Ok(ScanType::YH2V2),
                    _ => Err(JpegDecError::SamplingFactorsNotSupported),
                }
            }
            _ => Err(JpegDecError::ComponentCountNotSupported),
        }
    }

    fn read_start_of_scan_segment<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<(), JpegDecError> {
        let length = self.read_segment_length(source)?;
        let components_in_scan = self.input.read_u8(source)? as usize;
        if components_in_scan == 0 || components_in_scan > self.components.len() {
            return Err(JpegDecError::InvalidStartOfScan);
        }
        if components_in_scan != self.components.len() {
            return Err(JpegDecError::ScanNotSupported);
        }
        if length != 4 + components_in_scan * 2 {
            return Err(JpegDecError::InvalidStartOfScan);
        }

        self.scan_component_indices.clear();
        for _ in 0..components_in_scan {
            let id = self.input.read_u8(source)?;
            let selector = self.input.read_u8(source)?;
            let dc_dest = selector >> 4;
            let ac_dest = selector & 0x0F;
            if dc_dest as usize >= MAX_HUFFMAN_TABLES || ac_dest as usize >= MAX_HUFFMAN_TABLES {
                return Err(JpegDecError::InvalidHuffmanTableIndex);
            }

            let idx = self
                .components
                .iter()
                .position(|c| c.id == id)
                .ok_or(JpegDecError::UnknownComponentId)?;
            if self.scan_component_indices.contains(&idx) {
                return Err(JpegDecError::InvalidStartOfScan);
            }
            let component = &mut self.components[idx];
            component.dc_table_dest = dc_dest;
            component.ac_table_dest = ac_dest;
            self.scan_component_indices.push(idx);
        }

        let ss = self.input.read_u8(source)?;
        let se = self.input.read_u8(source)?;
        let ah_al = self.input.read_u8(source)?;
        if ss != 0 || se != 63 || ah_al != 0 {
            return Err(JpegDecError::InvalidStartOfScan);
        }

        for &idx in &self.scan_component_indices {
            let c = &self.components[idx];
            if self.huffman_tables_dc[c.dc_table_dest as usize].is_none()
                || self.huffman_tables_ac[c.ac_table_dest as usize].is_none()
            {
                return Err(JpegDecError::UndefinedHuffmanTable);
            }
            if self.quantization_tables[c.quant_table_dest as usize].is_none() {
                return Err(JpegDecError::UndefinedQuantizationTable);
            }
        }

        Ok(())
    }

    pub fn read_dqt_segment<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<(), JpegDecError> {
        let mut remaining = self.read_segment_length(source)?;
        while remaining > 0 {
            let pq_tq = self.input.read_u8(source)?;
            let precision = pq_tq >> 4;
            let id = (pq_tq & 0x0F) as usize;
            if id >= MAX_QUANTIZATION_TABLES {
                return Err(JpegDecError::InvalidQuantizationTableIndex);
            }
            let entry_size = match precision {
                0 => 1,
                1 => 2,
                _ => return Err(JpegDecError::InvalidMarkerSegmentSize),
            };
            let table_size = 1 + BLOCK_DIM * entry_size;
            if remaining < table_size {
                return Err(JpegDecError::InvalidMarkerSegmentSize);
            }

            // Entries stay in zigzag order, as stored in the stream.
            let mut table = [0u16; BLOCK_DIM];
            for entry in table.iter_mut() {
                *entry = if entry_size == 1 {
                    self.input.read_u8(source)? as u16
                } else {
                    self.input.read_u16(source)?
                };
            }
            self.quantization_tables[id] = Some(table);
            remaining -= table_size;
        }
        Ok(())
    }

    pub fn read_dht_segment<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<(), JpegDecError> {
        let mut remaining = self.read_segment_length(source)?;
        while remaining > 0 {
            if remaining < 1 + MAX_HUFFMAN_CODE_LENGTH {
                return Err(JpegDecError::InvalidMarkerSegmentSize);
            }
            let tc_th = self.input.read_u8(source)?;
            let class = tc_th >> 4;
            let id = (tc_th & 0x0F) as usize;
            if id >= MAX_HUFFMAN_TABLES || class > 1 {
                return Err(JpegDecError::InvalidHuffmanTableIndex);
            }

            let mut lengths = [0u8; MAX_HUFFMAN_CODE_LENGTH];
            let mut total_values = 0usize;
            for length in lengths.iter_mut() {
                *length = self.input.read_u8(source)?;
                total_values += *length as usize;
            }
            remaining -= 1 + MAX_HUFFMAN_CODE_LENGTH;

            if total_values > MAX_HUFFMAN_VALUES || remaining < total_values {
                return Err(JpegDecError::InvalidHuffmanTable);
            }

            let mut values = vec![0u8; total_values];
            for value in values.iter_mut() {
                *value = self.input.read_u8(source)?;
            }
            remaining -= total_values;

            let table = HuffmanTable::build_from_dht(&lengths, &values)?;
            if class == 0 {
                self.huffman_tables_dc[id] = Some(table);
            } else {
                self.huffman_tables_ac[id] = Some(table);
            }
        }
        Ok(())
    }

    pub fn read_dri_segment<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<(), JpegDecError> {
        let length = self.read_segment_length(source)?;
        if length != 2 {
            return Err(JpegDecError::InvalidRestartInterval);
        }
        self.restart_interval = self.input.read_u16(source)?;
        Ok(())
    }
}
