//! Pixel formats produced by the MCU reassembler.

/// Converts decoded samples into the representation a display expects.
/// Conversions are total: every input maps to a pixel.
pub trait PixelFormat {
    type Pixel: Copy + Default;

    fn from_gray(y: u8) -> Self::Pixel;
    fn from_rgb(r: u8, g: u8, b: u8) -> Self::Pixel;
}

/// 8-bit luminance. Colour input is reduced with integer BT.601 weights.
#[derive(Debug, Clone, Copy)]
pub struct Gray8;

impl PixelFormat for Gray8 {
    type Pixel = u8;

    #[inline]
    fn from_gray(y: u8) -> u8 {
        y
    }

    #[inline]
    fn from_rgb(r: u8, g: u8, b: u8) -> u8 {
        ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
    }
}

/// Packed 5/6/5 RGB in native `u16` order.
#[derive(Debug, Clone, Copy)]
pub struct Rgb565;

#[inline]
fn pack_565(r: u8, g: u8, b: u8) -> u16 {
    (((r & 0xF8) as u16) << 8) | (((g & 0xFC) as u16) << 3) | (b >> 3) as u16
}

impl PixelFormat for Rgb565 {
    type Pixel = u16;

    #[inline]
    fn from_gray(y: u8) -> u16 {
        pack_565(y, y, y)
    }

    #[inline]
    fn from_rgb(r: u8, g: u8, b: u8) -> u16 {
        pack_565(r, g, b)
    }
}

/// Packed 5/6/5 RGB with its two bytes exchanged, for displays that take
/// the high byte first over a little-endian bus.
#[derive(Debug, Clone, Copy)]
pub struct Rgb565Swapped;

impl PixelFormat for Rgb565Swapped {
    type Pixel = u16;

    #[inline]
    fn from_gray(y: u8) -> u16 {
        pack_565(y, y, y).swap_bytes()
    }

    #[inline]
    fn from_rgb(r: u8, g: u8, b: u8) -> u16 {
        pack_565(r, g, b).swap_bytes()
    }
}

/// 24-bit RGB, one byte per channel.
#[derive(Debug, Clone, Copy)]
pub struct Rgb888;

impl PixelFormat for Rgb888 {
    type Pixel = [u8; 3];

    #[inline]
    fn from_gray(y: u8) -> [u8; 3] {
        [y, y, y]
    }

    #[inline]
    fn from_rgb(r: u8, g: u8, b: u8) -> [u8; 3] {
        [r, g, b]
    }
}
