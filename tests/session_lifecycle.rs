//! Session state handling across sources: files, readers, aborts and
//! restarts.

use std::io::{Cursor, Write};

use mcujpeg_rs::{
    ArraySource, DecodeOptions, DecoderState, ErrorKind, Gray8, JpegDecError, JpegStreamDecoder, Rgb565,
};
use tempfile::NamedTempFile;

mod support;
use support::{Sampling, SourceImage, WriterOptions, encode, flat_block_gray};

fn sample_stream() -> Vec<u8> {
    let image = SourceImage::gray(24, 16, |x, y| (40 + x * 3 + y * 2) as u8);
    encode(&image, &WriterOptions::new(Sampling::Gray).restart_interval(2))
}

fn collect_mcus(jpeg: &mut JpegStreamDecoder<'_, Gray8>) -> Vec<Vec<u8>> {
    let mut mcus = Vec::new();
    while jpeg.read() {
        mcus.push(jpeg.image().to_vec());
    }
    mcus
}

#[test]
fn test_file_source_matches_array_source() {
    let data = sample_stream();
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(&data).expect("write");
    file.flush().expect("flush");

    let mut from_array = JpegStreamDecoder::<Gray8>::new();
    from_array.decode_array(&data).expect("array decode");
    let expected = collect_mcus(&mut from_array);
    assert_eq!(expected.len(), 6);

    let mut from_file = JpegStreamDecoder::<Gray8>::new();
    from_file.decode_file(file.path()).expect("file decode");
    assert_eq!((from_file.width(), from_file.height()), (24, 16));
    assert_eq!(collect_mcus(&mut from_file), expected);
    assert_eq!(from_file.state(), DecoderState::Exhausted);
}

#[test]
fn test_reader_source_matches_array_source() {
    let data = sample_stream();

    let mut from_array = JpegStreamDecoder::<Gray8>::new();
    from_array.decode_array(&data).expect("array decode");
    let expected = collect_mcus(&mut from_array);

    let mut from_reader = JpegStreamDecoder::<Gray8>::new();
    from_reader
        .decode_reader(Cursor::new(data.clone()), data.len() as u64)
        .expect("reader decode");
    assert_eq!(collect_mcus(&mut from_reader), expected);

    let mut from_source = JpegStreamDecoder::<Gray8>::new();
    from_source
        .decode_source(Box::new(ArraySource::new(&data)))
        .expect("source decode");
    assert_eq!(collect_mcus(&mut from_source), expected);
}

#[test]
fn test_empty_and_missing_files() {
    let empty = NamedTempFile::new().expect("temp file");
    let mut jpeg = JpegStreamDecoder::<Rgb565>::new();

    assert_eq!(jpeg.decode_file(empty.path()), Err(JpegDecError::EmptySource));
    assert_eq!(jpeg.state(), DecoderState::Failed);

    let dir = tempfile::tempdir().expect("temp dir");
    let err = jpeg.decode_file(dir.path().join("missing.jpg")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
    assert!(!jpeg.available());
    assert!(!jpeg.read());
}

#[test]
fn test_reader_shorter_than_declared_size_fails() {
    let data = sample_stream();
    let short = data[..data.len() - 20].to_vec();

    let mut jpeg = JpegStreamDecoder::<Gray8>::new();
    jpeg.decode_reader(Cursor::new(short), data.len() as u64)
        .expect("header is intact");
    let mcus = collect_mcus(&mut jpeg);
    assert!(mcus.len() < 6);
    assert_eq!(jpeg.state(), DecoderState::Failed);
    assert_eq!(jpeg.last_error(), Some(JpegDecError::UnexpectedEndOfStream));
}

#[test]
fn test_abort_twice_and_after_exhaustion() {
    let data = sample_stream();
    let mut jpeg = JpegStreamDecoder::<Gray8>::new();

    jpeg.abort();
    assert_eq!(jpeg.state(), DecoderState::Idle);

    jpeg.decode_array(&data).expect("decode");
    assert!(jpeg.read());
    jpeg.abort();
    jpeg.abort();
    assert_eq!(jpeg.state(), DecoderState::Idle);
    assert!(!jpeg.available());
    assert!(jpeg.image().is_empty());

    jpeg.decode_array(&data).expect("decode");
    while jpeg.read() {}
    assert_eq!(jpeg.state(), DecoderState::Exhausted);
    jpeg.abort();
    jpeg.abort();
    assert_eq!(jpeg.state(), DecoderState::Idle);
}

#[test]
fn test_session_restarts_after_failure() {
    let data = sample_stream();
    let garbage = [0xFFu8, 0xD8, 0xFF, 0xC2, 0x00];
    let mut jpeg = JpegStreamDecoder::<Gray8>::new();

    assert!(jpeg.decode_array(&garbage).is_err());
    assert_eq!(jpeg.state(), DecoderState::Failed);

    jpeg.decode_array(&data).expect("decode");
    assert_eq!(jpeg.state(), DecoderState::Streaming);
    assert_eq!(jpeg.last_error(), None);
    assert_eq!(collect_mcus(&mut jpeg).len(), 6);
}

#[test]
fn test_cursor_wraps_at_row_end() {
    let image = flat_block_gray(24, 16, |bx, by| (bx * 10 + by * 100) as u8 + 20);
    let data = encode(&image, &WriterOptions::new(Sampling::Gray));
    let mut jpeg = JpegStreamDecoder::<Gray8>::with_options(DecodeOptions::new());
    jpeg.decode_array(&data).expect("decode");

    let mut positions = Vec::new();
    while jpeg.read() {
        positions.push((jpeg.mcu_x(), jpeg.mcu_y(), jpeg.image()[0]));
    }
    assert_eq!(
        positions,
        vec![(0, 0, 20), (1, 0, 30), (2, 0, 40), (0, 1, 120), (1, 1, 130), (2, 1, 140)]
    );
}
