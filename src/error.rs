use num_enum::IntoPrimitive;
use thiserror::Error;

/// Coarse classification of a [`JpegDecError`].
///
/// Callers that only need to know whether to retry with another file, show a
/// "format not supported" message or give up can match on this instead of the
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The named file or array could not be opened, or it is empty.
    ResourceUnavailable,
    /// The stream is a valid JPEG that uses a mode this decoder does not handle.
    UnsupportedStream,
    /// Malformed headers or entropy-coded data.
    CorruptStream,
    /// The MCU output buffer could not be allocated.
    OutOfMemory,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum JpegDecError {
    #[error("Resource unavailable")]
    ResourceUnavailable = 1,
    #[error("Source is empty")]
    EmptySource = 2,
    #[error("Not enough memory")]
    NotEnoughMemory = 3,

    #[error("Start of image marker not found")]
    StartOfImageMarkerNotFound = 10,
    #[error("Unexpected end of stream")]
    UnexpectedEndOfStream = 11,
    #[error("Unexpected marker in stream")]
    UnexpectedMarker = 12,
    #[error("Invalid marker segment size")]
    InvalidMarkerSegmentSize = 13,
    #[error("Invalid Huffman table")]
    InvalidHuffmanTable = 14,
    #[error("Huffman table index out of range")]
    InvalidHuffmanTableIndex = 15,
    #[error("Quantization table index out of range")]
    InvalidQuantizationTableIndex = 16,
    #[error("Undefined quantization table")]
    UndefinedQuantizationTable = 17,
    #[error("Undefined Huffman table")]
    UndefinedHuffmanTable = 18,
    #[error("Invalid start of frame segment")]
    InvalidStartOfFrame = 19,
    #[error("Invalid image dimensions")]
    InvalidDimensions = 20,
    #[error("Invalid start of scan segment")]
    InvalidStartOfScan = 21,
    #[error("Unknown component ID in scan")]
    UnknownComponentId = 22,
    #[error("Invalid Huffman code")]
    InvalidHuffmanCode = 23,
    #[error("Restart marker not found")]
    RestartMarkerNotFound = 24,
    #[error("Coefficient index out of range")]
    CoefficientOverflow = 25,
    #[error("Start of frame marker not found")]
    StartOfFrameMarkerNotFound = 26,
    #[error("Duplicate start of frame marker")]
    DuplicateStartOfFrameMarker = 27,
    #[error("Invalid define restart interval segment")]
    InvalidRestartInterval = 28,

    #[error("Progressive JPEG is not supported")]
    ProgressiveNotSupported = 40,
    #[error("Arithmetic coding is not supported")]
    ArithmeticCodingNotSupported = 41,
    #[error("Only 8-bit sample precision is supported")]
    PrecisionNotSupported = 42,
    #[error("Only 1 or 3 components are supported")]
    ComponentCountNotSupported = 43,
    #[error("Sampling factors not supported")]
    SamplingFactorsNotSupported = 44,
    #[error("Non-interleaved colour scans are not supported")]
    ScanNotSupported = 45,
    #[error("Frame type not supported")]
    FrameTypeNotSupported = 46,
}

impl JpegDecError {
    pub fn kind(self) -> ErrorKind {
        match self {
            Self::ResourceUnavailable | Self::EmptySource => ErrorKind::ResourceUnavailable,
            Self::NotEnoughMemory => ErrorKind::OutOfMemory,
            Self::ProgressiveNotSupported
            | Self::ArithmeticCodingNotSupported
            | Self::PrecisionNotSupported
            | Self::ComponentCountNotSupported
            | Self::SamplingFactorsNotSupported
            | Self::ScanNotSupported
            | Self::FrameTypeNotSupported => ErrorKind::UnsupportedStream,
            _ => ErrorKind::CorruptStream,
        }
    }

    /// Numeric code of the error, stable across releases.
    pub fn code(self) -> u8 {
        self.into()
    }
}
