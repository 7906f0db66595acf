//! Pull-based byte sources feeding the block decoder.
//!
//! A source hands out up to `buf.len()` bytes per call and reports how many
//! it delivered; `0` means end of stream. Sources never fail: read errors of
//! the backing storage are logged and reported as end of stream, the block
//! decoder then turns the missing bytes into a decode error.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::JpegDecError;

pub trait ByteSource {
    /// Copies up to `buf.len()` bytes into `buf` and returns the count.
    fn fill(&mut self, buf: &mut [u8]) -> usize;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        (**self).fill(buf)
    }
}

/// Source backed by an in-memory JPEG image, e.g. one linked into flash.
pub struct ArraySource<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ArraySource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl ByteSource for ArraySource<'_> {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        n
    }
}

/// Source backed by a sequential reader of known length: a file on an SD
/// card, a flash filesystem handle or a plain [`File`].
///
/// Reads never go past `size` bytes even if the reader has more data.
pub struct FileSource<R> {
    reader: R,
    size: u64,
    offset: u64,
}

impl<R: Read> FileSource<R> {
    pub fn new(reader: R, size: u64) -> Self {
        Self {
            reader,
            size,
            offset: 0,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl FileSource<File> {
    /// Opens `path` and uses its current length as the stream size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, JpegDecError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            log::warn!("cannot open {}: {}", path.display(), e);
            JpegDecError::ResourceUnavailable
        })?;
        let size = file
            .metadata()
            .map_err(|e| {
                log::warn!("cannot stat {}: {}", path.display(), e);
                JpegDecError::ResourceUnavailable
            })?
            .len();
        if size == 0 {
            return Err(JpegDecError::EmptySource);
        }
        Ok(Self::new(file, size))
    }
}

impl<R: Read> ByteSource for FileSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        let left = self.size.saturating_sub(self.offset);
        let want = (buf.len() as u64).min(left) as usize;
        let mut filled = 0;
        while filled < want {
            match self.reader.read(&mut buf[filled..want]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("read failed at offset {}: {}", self.offset + filled as u64, e);
                    break;
                }
            }
        }
        self.offset += filled as u64;
        filled
    }
}
