use crate::byte_source::ByteSource;
use crate::error::JpegDecError;
use crate::{ImageInfo, McuPlanes, McuStatus};

/// A block decoder that produces one MCU per call.
///
/// The decoder never owns its input: the byte source is passed to every call,
/// so the caller decides when it is closed.
pub trait McuDecoder {
    fn image_info(&self) -> &ImageInfo;

    /// Decodes the next MCU into [`McuDecoder::planes`], or reports that the
    /// scan is complete.
    fn decode_mcu(&mut self, source: &mut dyn ByteSource) -> Result<McuStatus, JpegDecError>;

    /// Planes of the MCU decoded last. Valid until the next `decode_mcu`.
    fn planes(&self) -> &McuPlanes;
}
