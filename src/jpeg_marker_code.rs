use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Marker codes of ISO/IEC 10918-1 (ITU-T T.81) that the stream reader
/// needs to tell apart. Any other marker is skipped by its segment length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum JpegMarkerCode {
    /// SOF0: Baseline DCT, Huffman coding.
    StartOfFrameBaseline = 0xC0,
    /// SOF1: Extended sequential DCT, Huffman coding.
    StartOfFrameExtendedSequential = 0xC1,
    /// SOF2: Progressive DCT, Huffman coding.
    StartOfFrameProgressive = 0xC2,
    /// SOF3: Lossless (sequential), Huffman coding.
    StartOfFrameLossless = 0xC3,

    /// DHT: Defines one or more Huffman tables.
    DefineHuffmanTable = 0xC4,

    /// SOF5: Differential sequential DCT, Huffman coding.
    StartOfFrameDifferentialSequential = 0xC5,
    /// SOF6: Differential progressive DCT, Huffman coding.
    StartOfFrameDifferentialProgressive = 0xC6,
    /// SOF7: Differential lossless, Huffman coding.
    StartOfFrameDifferentialLossless = 0xC7,

    /// SOF9: Extended sequential DCT, arithmetic coding.
    StartOfFrameArithmeticSequential = 0xC9,
    /// SOF10: Progressive DCT, arithmetic coding.
    StartOfFrameArithmeticProgressive = 0xCA,
    /// SOF11: Lossless, arithmetic coding.
    StartOfFrameArithmeticLossless = 0xCB,

    /// DAC: Defines arithmetic coding conditioning.
    DefineArithmeticCoding = 0xCC,

    /// SOF13..SOF15: Differential frames, arithmetic coding.
    StartOfFrameArithmeticDifferentialSequential = 0xCD,
    StartOfFrameArithmeticDifferentialProgressive = 0xCE,
    StartOfFrameArithmeticDifferentialLossless = 0xCF,

    /// RST0..RST7: Restart markers inside entropy-coded data.
    Restart0 = 0xD0,
    Restart1 = 0xD1,
    Restart2 = 0xD2,
    Restart3 = 0xD3,
    Restart4 = 0xD4,
    Restart5 = 0xD5,
    Restart6 = 0xD6,
    Restart7 = 0xD7,

    /// SOI: Marks the start of an image.
    StartOfImage = 0xD8,

    /// EOI: Marks the end of an image.
    EndOfImage = 0xD9,

    /// SOS: Marks the start of scan.
    StartOfScan = 0xDA,

    /// DQT: Defines one or more quantization tables.
    DefineQuantizationTable = 0xDB,

    /// DNL: Defines the number of lines in a scan.
    DefineNumberOfLines = 0xDC,

    /// DRI: Defines the restart interval used in succeeding scans.
    DefineRestartInterval = 0xDD,

    /// TEM: Temporary private use in arithmetic coding, has no segment.
    Temporary = 0x01,
}

impl JpegMarkerCode {
    /// Markers that stand alone, without a length-prefixed segment.
    pub fn is_standalone(self) -> bool {
        matches!(
            self,
            Self::Temporary
                | Self::Restart0
                | Self::Restart1
                | Self::Restart2
                | Self::Restart3
                | Self::Restart4
                | Self::Restart5
                | Self::Restart6
                | Self::Restart7
                | Self::StartOfImage
                | Self::EndOfImage
        )
    }
}

pub const JPEG_MARKER_START_BYTE: u8 = 0xFF;
pub const JPEG_RESTART_MARKER_BASE: u8 = 0xD0;
pub const JPEG_RESTART_MARKER_RANGE: u8 = 8;
