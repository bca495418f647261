//! This crate provides a baseline sequential JPEG (ITU-T T.81) codec.
//!
//! # Features
//!  - A canonical Huffman coder, including the Annex K.2 optimizer used to
//!    build image-specific tables instead of the default MJPEG ones
//!  - A bit-sequential entropy codec with byte stuffing and restart marker
//!    support
//!  - A from-scratch (non fixed-point) forward/inverse DCT and YCbCr/RGB
//!    colour conversion
//!
//! # Usage
//! Add jpeg-codec to the dependencies in the project Cargo.toml.
//!
//! # Examples
//!
//! ## Decode a JPEG stream to RGB.
//! ```no_run
//! use jpeg_codec::JpegDecoder;
//!
//! let data = std::fs::read("a_jpeg_file.jpg").unwrap();
//! let mut decoder = JpegDecoder::new(&data);
//! let pixels = decoder.decode().unwrap();
//! ```
//!
//! ## Encode raw RGB samples.
//! ```no_run
//! use jpeg_core::colorspace::ColorSpace;
//! use jpeg_core::bit_depth::BitDepth;
//! use jpeg_core::options::EncoderOptions;
//!
//! let options = EncoderOptions::new(320, 200, ColorSpace::RGB, BitDepth::Eight).set_quality(85);
//! let pixels = vec![0u8; 320 * 200 * 3];
//! let jpeg_bytes = jpeg_codec::encoder::encode(&pixels, &options).unwrap();
//! ```

#![warn(clippy::correctness, clippy::perf, clippy::pedantic, clippy::panic)]
#![allow(
    clippy::needless_return,
    clippy::similar_names,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

pub use crate::decoder::{ImageInfo, JpegDecoder};

mod bitstream;
mod coeff;
mod color;
mod component;
mod dct;
mod decoder;
mod default_tables;
pub mod encoder;
pub mod errors;
mod headers;
mod huffman;
mod huffman_optimizer;
mod marker;
mod quant;
mod writer;
mod zigzag;
