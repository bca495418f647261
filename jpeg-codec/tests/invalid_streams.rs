//! Decoder robustness against truncated and malformed streams.

use jpeg_codec::errors::DecodeErrors;
use jpeg_codec::JpegDecoder;

#[test]
fn empty_stream_is_rejected() {
    let mut decoder = JpegDecoder::new(&[]);
    assert!(decoder.decode_headers().is_err());
}

#[test]
fn stream_without_an_soi_marker_is_rejected() {
    let mut decoder = JpegDecoder::new(&[0x00, 0x01, 0x02]);
    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, DecodeErrors::Format(_)));
}

#[test]
fn soi_followed_by_eoi_with_no_frame_is_rejected() {
    let mut decoder = JpegDecoder::new(&[0xFF, 0xD8, 0xFF, 0xD9]);
    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, DecodeErrors::Truncated(_)));
}

#[test]
fn truncated_frame_header_is_rejected() {
    // SOI, SOF0, then a length field claiming more bytes than are present.
    let mut decoder = JpegDecoder::new(&[0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x20]);
    assert!(decoder.decode_headers().is_err());
}

#[test]
fn progressive_frames_are_reported_as_unsupported_rather_than_misparsed() {
    let mut decoder = JpegDecoder::new(&[0xFF, 0xD8, 0xFF, 0xC2, 0x00, 0x0B]);
    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, DecodeErrors::Unsupported(_)));
}

#[test]
fn sos_before_sof_is_rejected() {
    let mut decoder = JpegDecoder::new(&[
        0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x00, 0x00, 0x00, 0x3F, 0x00,
    ]);
    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, DecodeErrors::Format(_)));
}

#[test]
fn frame_with_zero_components_is_rejected() {
    // SOF0 with num_components = 0: precision, height, width, then 0x00.
    let mut decoder = JpegDecoder::new(&[
        0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x08, 0x08, 0x00, 0x10, 0x00, 0x10, 0x00,
    ]);
    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, DecodeErrors::InvalidParameter(_)));
}

#[test]
fn frame_wider_than_the_configured_limit_is_rejected() {
    use jpeg_core::options::DecoderOptions;

    // 0x1000 x 0x1000 frame, 1 component.
    let data = [
        0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x10, 0x00, 0x10, 0x00, 0x01, 0x01, 0x11, 0x00,
    ];
    let options = DecoderOptions::new_safe()
        .set_max_width(16)
        .set_max_height(16);
    let mut decoder = JpegDecoder::new_with_options(&data, options);
    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, DecodeErrors::LimitExceeded(_)));
}
