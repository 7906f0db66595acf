//! JPEG 1 Baseline Decoder implementation.
//!
//! Decodes one MCU per call from a pulled byte stream: entropy decoding,
//! dequantization, IDCT and colour conversion into [`McuPlanes`]. In reduced
//! mode only the DC term of each block is used.

use crate::byte_source::ByteSource;
use crate::constants::{BLOCK_DIM, MAX_BLOCKS_PER_MCU};
use crate::error::JpegDecError;
use crate::jpeg1::color::{write_colour_mcu, write_colour_mcu_reduced, write_gray_block};
use crate::jpeg1::dct::{dc_only_sample, idct_8x8};
use crate::jpeg1::huffman::{HuffmanTable, JpegBitReader, extend};
use crate::jpeg1::quantization::dequantize_block;
use crate::jpeg_marker_code::{JPEG_RESTART_MARKER_BASE, JPEG_RESTART_MARKER_RANGE};
use crate::jpeg_stream_reader::JpegStreamReader;
use crate::traits::McuDecoder;
use crate::{ImageInfo, McuPlanes, McuStatus, ScanType};

// Largest DC difference category for 8-bit samples.
const MAX_DC_CATEGORY: u8 = 11;

pub struct BaselineDecoder {
    reader: JpegStreamReader,
    info: ImageInfo,
    reduce: bool,
    dc_predictors: [i32; 3],
    restarts_left: u16,
    next_restart_index: u8,
    mcus_left: usize,
    planes: McuPlanes,
    luma: [[u8; BLOCK_DIM]; MAX_BLOCKS_PER_MCU],
    chroma: [[u8; BLOCK_DIM]; 2],
}

impl BaselineDecoder {
    /// Parses the stream headers up to the first scan.
    pub fn new<S: ByteSource + ?Sized>(source: &mut S, reduce: bool) -> Result<Self, JpegDecError> {
        let mut reader = JpegStreamReader::new();
        reader.read_header(source)?;
        let scan_type = reader.scan_type()?;
        let info = ImageInfo::new(reader.width as usize, reader.height as usize, scan_type);
        log::debug!(
            "baseline frame {}x{} {}, restart interval {}",
            info.width,
            info.height,
            scan_type,
            reader.restart_interval
        );

        Ok(Self {
            restarts_left: reader.restart_interval,
            reader,
            info,
            reduce,
            dc_predictors: [0; 3],
            next_restart_index: 0,
            mcus_left: info.mcu_count(),
            planes: McuPlanes::new(),
            luma: [[0; BLOCK_DIM]; MAX_BLOCKS_PER_MCU],
            chroma: [[0; BLOCK_DIM]; 2],
        })
    }

    pub fn restart_interval(&self) -> u16 {
        self.reader.restart_interval
    }

    fn process_restart<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<(), JpegDecError> {
        let marker = JpegBitReader::new(&mut self.reader.input, source).read_restart_marker()?;
        if marker != JPEG_RESTART_MARKER_BASE + self.next_restart_index {
            return Err(JpegDecError::RestartMarkerNotFound);
        }
        self.next_restart_index = (self.next_restart_index + 1) % JPEG_RESTART_MARKER_RANGE;
        self.dc_predictors = [0; 3];
        self.restarts_left = self.reader.restart_interval;
        Ok(())
    }

    fn convert_mcu(&mut self) {
        let (h, v) = self.info.scan_type.luma_blocks();
        match (self.info.scan_type, self.reduce) {
            (ScanType::Grayscale, false) => write_gray_block(&mut self.planes, &self.luma[0]),
            (ScanType::Grayscale, true) => self.planes.r[0] = self.luma[0][0],
            (_, false) => write_colour_mcu(
                &mut self.planes,
                &self.luma[..h * v],
                h,
                v,
                &self.chroma[0],
                &self.chroma[1],
            ),
            (_, true) => {
                let dc: [u8; MAX_BLOCKS_PER_MCU] = std::array::from_fn(|i| self.luma[i][0]);
                write_colour_mcu_reduced(&mut self.planes, &dc[..h * v], h, v, self.chroma[0][0], self.chroma[1][0]);
            }
        }
    }
}

impl McuDecoder for BaselineDecoder {
    fn image_info(&self) -> &ImageInfo {
        &self.info
    }

    fn decode_mcu(&mut self, source: &mut dyn ByteSource) -> Result<McuStatus, JpegDecError> {
        if self.mcus_left == 0 {
            return Ok(McuStatus::NoMoreBlocks);
        }
        if self.reader.restart_interval > 0 {
            if self.restarts_left == 0 {
                self.process_restart(&mut *source)?;
            }
            self.restarts_left -= 1;
        }

        let (h, v) = self.info.scan_type.luma_blocks();
        let reader = &mut self.reader;
        let mut bits = JpegBitReader::new(&mut reader.input, &mut *source);
        let mut coefficients = [0i32; BLOCK_DIM];
        let mut dequantized = [0i32; BLOCK_DIM];

        for &ci in &reader.scan_component_indices {
            let component = &reader.components[ci];
            let dc_table = reader.huffman_tables_dc[component.dc_table_dest as usize]
                .as_ref()
                .ok_or(JpegDecError::UndefinedHuffmanTable)?;
            let ac_table = reader.huffman_tables_ac[component.ac_table_dest as usize]
                .as_ref()
                .ok_or(JpegDecError::UndefinedHuffmanTable)?;
            let quant = reader.quantization_tables[component.quant_table_dest as usize]
                .as_ref()
                .ok_or(JpegDecError::UndefinedQuantizationTable)?;
            let block_count = if ci == 0 { h * v } else { 1 };

            for n in 0..block_count {
                decode_block(&mut bits, dc_table, ac_table, &mut self.dc_predictors[ci], &mut coefficients)?;
                let target = if ci == 0 { &mut self.luma[n] } else { &mut self.chroma[ci - 1] };
                if self.reduce {
                    target[0] = dc_only_sample(coefficients[0].saturating_mul(quant[0] as i32));
                } else {
                    dequantize_block(&coefficients, quant, &mut dequantized);
                    idct_8x8(&dequantized, target);
                }
            }
        }

        self.convert_mcu();
        self.mcus_left -= 1;
        Ok(McuStatus::Decoded)
    }

    fn planes(&self) -> &McuPlanes {
        &self.planes
    }
}

/// Decodes one block's coefficients in zigzag order (ISO/IEC 10918-1 F.2.2).
fn decode_block<S: ByteSource + ?Sized>(
    bits: &mut JpegBitReader<'_, S>,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    predictor: &mut i32,
    coefficients: &mut [i32; BLOCK_DIM],
) -> Result<(), JpegDecError> {
    coefficients.fill(0);

    let category = dc_table.decode(bits)?;
    if category > MAX_DC_CATEGORY {
        return Err(JpegDecError::CoefficientOverflow);
    }
    let diff = extend(bits.read_bits(category)?, category);
    *predictor = predictor.wrapping_add(diff);
    coefficients[0] = *predictor;

    let mut k = 1;
    while k < BLOCK_DIM {
        let rs = ac_table.decode(bits)?;
        let run = (rs >> 4) as usize;
        let size = rs & 0x0F;
        if size == 0 {
            if run != 15 {
                // End of block.
                break;
            }
            k += 16;
            continue;
        }
        k += run;
        if k >= BLOCK_DIM {
            return Err(JpegDecError::CoefficientOverflow);
        }
        coefficients[k] = extend(bits.read_bits(size)?, size);
        k += 1;
    }
    Ok(())
}
