//! MCU streaming session: pulls one MCU at a time from a block decoder and
//! hands it to the caller in the selected pixel format.
//!
//! ```no_run
//! use mcujpeg_rs::{JpegStreamDecoder, Rgb565};
//!
//! let data = std::fs::read("photo.jpg").unwrap();
//! let mut jpeg = JpegStreamDecoder::<Rgb565>::new();
//! jpeg.decode_array(&data).unwrap();
//! while jpeg.read() {
//!     let x = jpeg.mcu_x() * jpeg.mcu_width();
//!     let y = jpeg.mcu_y() * jpeg.mcu_height();
//!     let extent = jpeg.mcu_extent();
//!     // push jpeg.image() (row pitch jpeg.row_pitch()) to the display at (x, y)
//!     # let _ = (x, y, extent);
//! }
//! ```

use std::io::Read;
use std::path::Path;

use crate::byte_source::{ArraySource, ByteSource, FileSource};
use crate::constants::BLOCK_SIZE;
use crate::error::JpegDecError;
use crate::jpeg1::BaselineDecoder;
use crate::mcu_reassembler::{McuExtent, place_mcu, place_mcu_reduced};
use crate::pixel::{PixelFormat, Rgb565};
use crate::traits::McuDecoder;
use crate::{ImageInfo, McuStatus, ScanType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Emit one pixel per 8x8 block instead of full resolution.
    pub reduce: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reduce(mut self, reduce: bool) -> Self {
        self.reduce = reduce;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Idle,
    Initializing,
    Streaming,
    Exhausted,
    Failed,
}

/// A decode session. Starting a new decode aborts the previous one.
pub struct JpegStreamDecoder<'a, P: PixelFormat = Rgb565> {
    options: DecodeOptions,
    state: DecoderState,
    last_error: Option<JpegDecError>,
    source: Option<Box<dyn ByteSource + 'a>>,
    decoder: Option<Box<dyn McuDecoder + 'a>>,
    info: Option<ImageInfo>,
    width: usize,
    height: usize,
    // Position of the MCU waiting in the decoder.
    cursor_x: usize,
    cursor_y: usize,
    // Position of the MCU currently in `image`.
    mcu_x: usize,
    mcu_y: usize,
    pending: bool,
    image: Vec<P::Pixel>,
    row_pitch: usize,
    extent: McuExtent,
}

impl<P: PixelFormat> Default for JpegStreamDecoder<'_, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, P: PixelFormat> JpegStreamDecoder<'a, P> {
    pub fn new() -> Self {
        Self::with_options(DecodeOptions::default())
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self {
            options,
            state: DecoderState::Idle,
            last_error: None,
            source: None,
            decoder: None,
            info: None,
            width: 0,
            height: 0,
            cursor_x: 0,
            cursor_y: 0,
            mcu_x: 0,
            mcu_y: 0,
            pending: false,
            image: Vec::new(),
            row_pitch: 0,
            extent: McuExtent::default(),
        }
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Takes effect at the next decode start.
    pub fn set_options(&mut self, options: DecodeOptions) {
        self.options = options;
    }

    /// Starts decoding an in-memory JPEG image.
    pub fn decode_array(&mut self, data: &'a [u8]) -> Result<(), JpegDecError> {
        if data.is_empty() {
            self.abort();
            return Err(self.fail(JpegDecError::EmptySource));
        }
        self.decode_source(Box::new(ArraySource::new(data)))
    }

    /// Starts decoding the file at `path`.
    pub fn decode_file<Q: AsRef<Path>>(&mut self, path: Q) -> Result<(), JpegDecError> {
        match FileSource::open(path) {
            Ok(source) => self.decode_source(Box::new(source)),
            Err(e) => {
                self.abort();
                Err(self.fail(e))
            }
        }
    }

    /// Starts decoding `size` bytes pulled from `reader`.
    pub fn decode_reader<R: Read + 'a>(&mut self, reader: R, size: u64) -> Result<(), JpegDecError> {
        if size == 0 {
            self.abort();
            return Err(self.fail(JpegDecError::EmptySource));
        }
        self.decode_source(Box::new(FileSource::new(reader, size)))
    }

    /// Starts decoding a caller-provided byte source with the built-in
    /// baseline decoder.
    pub fn decode_source(&mut self, mut source: Box<dyn ByteSource + 'a>) -> Result<(), JpegDecError> {
        self.abort();
        self.last_error = None;
        self.state = DecoderState::Initializing;
        match BaselineDecoder::new(&mut *source, self.options.reduce) {
            Ok(decoder) => self.begin(Box::new(decoder), source),
            Err(e) => {
                drop(source);
                Err(self.fail(e))
            }
        }
    }

    /// Starts a session with an already initialised block decoder.
    pub fn decode_with(
        &mut self,
        decoder: Box<dyn McuDecoder + 'a>,
        source: Box<dyn ByteSource + 'a>,
    ) -> Result<(), JpegDecError> {
        self.abort();
        self.last_error = None;
        self.state = DecoderState::Initializing;
        self.begin(decoder, source)
    }

    fn begin(&mut self, decoder: Box<dyn McuDecoder + 'a>, source: Box<dyn ByteSource + 'a>) -> Result<(), JpegDecError> {
        let info = *decoder.image_info();
        if let Err(e) = info.validate() {
            drop(decoder);
            drop(source);
            return Err(self.fail(e));
        }
        self.source = Some(source);
        self.decoder = Some(decoder);
        self.info = Some(info);

        let (out_w, out_h) = if self.options.reduce {
            (info.mcu_width / BLOCK_SIZE, info.mcu_height / BLOCK_SIZE)
        } else {
            (info.mcu_width, info.mcu_height)
        };
        if self.options.reduce {
            self.width = info.mcus_per_row * out_w;
            self.height = info.mcus_per_col * out_h;
        } else {
            self.width = info.width;
            self.height = info.height;
        }
        self.row_pitch = out_w;

        let mut image = Vec::new();
        if image.try_reserve_exact(out_w * out_h).is_err() {
            return Err(self.fail(JpegDecError::NotEnoughMemory));
        }
        image.resize(out_w * out_h, P::Pixel::default());
        self.image = image;

        log::debug!(
            "decoding {}x{} {} ({}x{} MCUs of {}x{}){}",
            info.width,
            info.height,
            info.scan_type,
            info.mcus_per_row,
            info.mcus_per_col,
            info.mcu_width,
            info.mcu_height,
            if self.options.reduce { ", reduced" } else { "" }
        );

        self.state = DecoderState::Streaming;
        self.decode_next();
        match self.state {
            DecoderState::Failed => Err(self.last_error.unwrap_or(JpegDecError::UnexpectedEndOfStream)),
            _ => Ok(()),
        }
    }

    /// Pulls the next MCU out of the block decoder.
    fn decode_next(&mut self) {
        let (Some(decoder), Some(source)) = (self.decoder.as_mut(), self.source.as_mut()) else {
            self.pending = false;
            return;
        };
        match decoder.decode_mcu(source.as_mut()) {
            Ok(McuStatus::Decoded) => self.pending = true,
            Ok(McuStatus::NoMoreBlocks) => {
                log::trace!("no more blocks");
                self.pending = false;
                self.state = DecoderState::Exhausted;
                self.close_source();
            }
            Err(e) => {
                self.fail(e);
            }
        }
    }

    /// True when the next [`read`](Self::read) produces an MCU.
    pub fn available(&self) -> bool {
        self.state == DecoderState::Streaming && self.pending
    }

    /// Converts the pending MCU into [`image`](Self::image) and decodes the
    /// one after it. Returns false once the image is exhausted or failed.
    pub fn read(&mut self) -> bool {
        if !self.available() {
            if matches!(self.state, DecoderState::Exhausted | DecoderState::Failed) {
                self.release();
            }
            return false;
        }
        let (Some(info), Some(decoder)) = (self.info, self.decoder.as_ref()) else {
            return false;
        };
        if self.cursor_y >= info.mcus_per_col {
            self.state = DecoderState::Exhausted;
            self.release();
            return false;
        }

        let planes = decoder.planes();
        self.extent = if self.options.reduce {
            place_mcu_reduced::<P>(&info, planes, self.cursor_x, self.cursor_y, &mut self.image, self.row_pitch)
        } else {
            place_mcu::<P>(&info, planes, self.cursor_x, self.cursor_y, &mut self.image, self.row_pitch)
        };
        self.mcu_x = self.cursor_x;
        self.mcu_y = self.cursor_y;
        log::trace!(
            "MCU ({}, {}) extent {}x{}",
            self.mcu_x,
            self.mcu_y,
            self.extent.cols,
            self.extent.rows
        );

        self.cursor_x += 1;
        if self.cursor_x == info.mcus_per_row {
            self.cursor_x = 0;
            self.cursor_y += 1;
        }
        self.decode_next();
        true
    }

    /// Ends the session and releases its resources. Safe to call at any
    /// time, any number of times.
    pub fn abort(&mut self) {
        self.release();
        self.state = DecoderState::Idle;
        self.info = None;
        self.pending = false;
        self.width = 0;
        self.height = 0;
        self.cursor_x = 0;
        self.cursor_y = 0;
        self.mcu_x = 0;
        self.mcu_y = 0;
        self.row_pitch = 0;
        self.extent = McuExtent::default();
    }

    fn fail(&mut self, error: JpegDecError) -> JpegDecError {
        log::warn!("JPEG decode failed: {} (code {})", error, error.code());
        self.last_error = Some(error);
        self.state = DecoderState::Failed;
        self.pending = false;
        self.close_source();
        error
    }

    fn close_source(&mut self) {
        self.decoder = None;
        self.source = None;
    }

    fn release(&mut self) {
        self.close_source();
        self.image = Vec::new();
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn last_error(&self) -> Option<JpegDecError> {
        self.last_error
    }

    pub fn image_info(&self) -> Option<&ImageInfo> {
        self.info.as_ref()
    }

    /// Decoded width: the image width, or the reduced width in reduced mode.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn components(&self) -> usize {
        self.info.map_or(0, |i| i.component_count)
    }

    pub fn scan_type(&self) -> Option<ScanType> {
        self.info.map(|i| i.scan_type)
    }

    pub fn mcus_per_row(&self) -> usize {
        self.info.map_or(0, |i| i.mcus_per_row)
    }

    pub fn mcus_per_col(&self) -> usize {
        self.info.map_or(0, |i| i.mcus_per_col)
    }

    /// Full-resolution MCU width, also in reduced mode.
    pub fn mcu_width(&self) -> usize {
        self.info.map_or(0, |i| i.mcu_width)
    }

    pub fn mcu_height(&self) -> usize {
        self.info.map_or(0, |i| i.mcu_height)
    }

    /// Column of the MCU in [`image`](Self::image).
    pub fn mcu_x(&self) -> usize {
        self.mcu_x
    }

    /// Row of the MCU in [`image`](Self::image).
    pub fn mcu_y(&self) -> usize {
        self.mcu_y
    }

    /// The last MCU produced by [`read`](Self::read), row-major.
    pub fn image(&self) -> &[P::Pixel] {
        &self.image
    }

    /// Pixels per row of [`image`](Self::image).
    pub fn row_pitch(&self) -> usize {
        self.row_pitch
    }

    pub fn mcu_extent(&self) -> McuExtent {
        self.extent
    }
}
