//! Encode/decode integration tests, exercising sampling, padding, restart
//! intervals and optimized Huffman tables end to end.

use jpeg_codec::encoder;
use jpeg_codec::JpegDecoder;
use jpeg_core::bit_depth::BitDepth;
use jpeg_core::colorspace::ColorSpace;
use jpeg_core::options::{DecoderOptions, EncoderOptions};

fn checkerboard(width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            out[y * width + x] = if (x / 4 + y / 4) % 2 == 0 { 20 } else { 230 };
        }
    }
    out
}

/// Deterministic pseudo-random noise (xorshift32), not a smooth gradient:
/// every block quantizes to a different, mostly-nonzero AC coefficient
/// pattern, which is what actually stresses the Huffman optimizer's AC
/// symbol statistics across most of the 162-symbol alphabet.
fn noisy_luma(width: usize, height: usize, seed: u32) -> Vec<u8> {
    let mut state = seed | 1;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    (0..width * height).map(|_| (next() % 256) as u8).collect()
}

fn gradient_rgb(width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height * 3];
    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) * 3;
            out[i] = (x * 255 / width.max(1)) as u8;
            out[i + 1] = (y * 255 / height.max(1)) as u8;
            out[i + 2] = ((x + y) * 255 / (width + height).max(1)) as u8;
        }
    }
    out
}

#[test]
fn grayscale_round_trips_close_to_the_source() {
    let (width, height) = (32, 24);
    let pixels = checkerboard(width, height);

    let options = EncoderOptions::new(width, height, ColorSpace::Luma, BitDepth::Eight);
    let jpeg = encoder::encode(&pixels, &options).expect("encode should succeed");

    let decoder_options = DecoderOptions::new_safe().set_out_colorspace(ColorSpace::Luma);
    let mut decoder = JpegDecoder::new_with_options(&jpeg, decoder_options);
    let info = decoder.decode_headers().unwrap();
    assert_eq!(
        (info.width, info.height, info.components),
        (width, height, 1)
    );

    let decoded = decoder.decode().expect("decode should succeed");
    assert_eq!(decoded.len(), width * height);

    let max_diff = pixels
        .iter()
        .zip(decoded.iter())
        .map(|(a, b)| (*a as i32 - *b as i32).abs())
        .max()
        .unwrap();
    assert!(
        max_diff < 40,
        "lossy round trip drifted too far: {max_diff}"
    );
}

#[test]
fn rgb_420_round_trips_on_dimensions_not_a_multiple_of_the_mcu_size() {
    // 50x37 forces both odd width/height padding and 4:2:0 chroma rounding.
    let (width, height) = (50, 37);
    let pixels = gradient_rgb(width, height);

    let options =
        EncoderOptions::new(width, height, ColorSpace::RGB, BitDepth::Eight).set_quality(90);
    let jpeg = encoder::encode(&pixels, &options).expect("encode should succeed");

    let mut decoder = JpegDecoder::new(&jpeg);
    let info = decoder.decode_headers().unwrap();
    assert_eq!(
        (info.width, info.height, info.components),
        (width, height, 3)
    );

    let decoded = decoder.decode().expect("decode should succeed");
    assert_eq!(decoded.len(), width * height * 3);

    let max_diff = pixels
        .iter()
        .zip(decoded.iter())
        .map(|(a, b)| (*a as i32 - *b as i32).abs())
        .max()
        .unwrap();
    assert!(
        max_diff < 60,
        "lossy round trip drifted too far: {max_diff}"
    );
}

#[test]
fn restart_intervals_reset_dc_predictors_correctly() {
    let (width, height) = (64, 64);
    let pixels = gradient_rgb(width, height);

    let options = EncoderOptions::new(width, height, ColorSpace::RGB, BitDepth::Eight)
        .set_restart_interval(2);
    let jpeg = encoder::encode(&pixels, &options).expect("encode should succeed");

    let mut decoder = JpegDecoder::new(&jpeg);
    let decoded = decoder.decode().expect("decode should succeed");

    let max_diff = pixels
        .iter()
        .zip(decoded.iter())
        .map(|(a, b)| (*a as i32 - *b as i32).abs())
        .max()
        .unwrap();
    assert!(
        max_diff < 60,
        "restart interval decoding drifted too far: {max_diff}"
    );
}

#[test]
fn optimized_huffman_tables_decode_identically_to_default_tables() {
    let (width, height) = (40, 24);
    let pixels = gradient_rgb(width, height);

    let default_options = EncoderOptions::new(width, height, ColorSpace::RGB, BitDepth::Eight);
    let default_jpeg = encoder::encode(&pixels, &default_options).unwrap();

    let optimized_options = default_options.set_optimize_huffman(true);
    let optimized_jpeg = encoder::encode(&pixels, &optimized_options).unwrap();

    // Optimized tables are tailored to the image's own symbol statistics, so
    // the stream should be no larger than the default-table encoding.
    assert!(optimized_jpeg.len() <= default_jpeg.len());

    let default_decoded = JpegDecoder::new(&default_jpeg).decode().unwrap();
    let optimized_decoded = JpegDecoder::new(&optimized_jpeg).decode().unwrap();
    assert_eq!(default_decoded, optimized_decoded);
}

#[test]
fn optimized_huffman_handles_high_entropy_images_without_panicking() {
    // Large and noisy enough that the AC frequency table is long-tailed
    // across most of the 162 possible AC symbols, which is what actually
    // drives some Huffman codes deep enough to need length limiting.
    let (width, height) = (256, 256);
    let pixels = noisy_luma(width, height, 0xC0FF_EE42);

    let options = EncoderOptions::new(width, height, ColorSpace::Luma, BitDepth::Eight)
        .set_optimize_huffman(true);
    let jpeg = encoder::encode(&pixels, &options).expect("encode should succeed");

    let decoder_options = DecoderOptions::new_safe().set_out_colorspace(ColorSpace::Luma);
    let mut decoder = JpegDecoder::new_with_options(&jpeg, decoder_options);
    let decoded = decoder.decode().expect("decode should succeed");
    assert_eq!(decoded.len(), width * height);
}

#[test]
fn ycbcr_output_colorspace_skips_the_final_color_conversion() {
    let (width, height) = (16, 16);
    let pixels = gradient_rgb(width, height);

    let options = EncoderOptions::new(width, height, ColorSpace::RGB, BitDepth::Eight);
    let jpeg = encoder::encode(&pixels, &options).unwrap();

    let decoder_options = DecoderOptions::new_safe().set_out_colorspace(ColorSpace::YCbCr);
    let mut decoder = JpegDecoder::new_with_options(&jpeg, decoder_options);
    let ycbcr = decoder.decode().unwrap();

    // mid gray (128, 128) chroma in the middle of the gradient should be
    // nowhere near as saturated as raw RGB would be.
    assert_eq!(ycbcr.len(), width * height * 3);
}

#[test]
fn encoder_rejects_a_pixel_buffer_of_the_wrong_length() {
    let options = EncoderOptions::new(8, 8, ColorSpace::Luma, BitDepth::Eight);
    let err = encoder::encode(&[0u8; 10], &options).unwrap_err();
    assert!(matches!(
        err,
        jpeg_codec::errors::EncodeErrors::LengthMismatch(64, 10)
    ));
}
