#![allow(clippy::uninlined_format_args)]

use std::fmt::{Debug, Formatter};

use jpeg_core::bytestream::ZByteIoError;

/// Errors that may occur while decoding a jpeg stream.
pub enum DecodeErrors {
    /// The underlying byte stream ended before a complete image was parsed
    Truncated(&'static str),
    /// A marker segment or codeword did not follow the stream syntax
    Format(String),
    /// The stream uses a mode this codec does not implement
    /// (progressive, lossless, arithmetic coding, 12-bit precision, ...)
    Unsupported(&'static str),
    /// A field carried an out of range or contradictory value
    InvalidParameter(String),
    /// A Huffman codeword did not match any table entry
    InvalidCode(&'static str),
    /// Image dimensions or component count exceed what `DecoderOptions` allows
    LimitExceeded(String),
    IoError(ZByteIoError),
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated(msg) => writeln!(f, "truncated stream: {msg}"),
            Self::Format(msg) => writeln!(f, "malformed jpeg stream: {msg}"),
            Self::Unsupported(msg) => writeln!(f, "unsupported jpeg feature: {msg}"),
            Self::InvalidParameter(msg) => writeln!(f, "invalid parameter: {msg}"),
            Self::InvalidCode(msg) => writeln!(f, "invalid huffman code: {msg}"),
            Self::LimitExceeded(msg) => writeln!(f, "limit exceeded: {msg}"),
            Self::IoError(err) => writeln!(f, "I/O error: {err:?}"),
        }
    }
}

impl From<ZByteIoError> for DecodeErrors {
    fn from(value: ZByteIoError) -> Self {
        Self::IoError(value)
    }
}

impl std::fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for DecodeErrors {}

/// Errors that may occur while encoding an image to a jpeg stream.
pub enum EncodeErrors {
    /// One of the dimensions is zero
    ZeroDimension(&'static str),
    /// The colorspace of the input isn't supported by the encoder
    UnsupportedColorspace(jpeg_core::colorspace::ColorSpace),
    /// The data buffer length does not match width * height * components
    LengthMismatch(usize, usize),
    /// The `bits`/`values` pair the optimizer derived from observed symbol
    /// frequencies didn't form a valid Huffman table
    InvalidHuffmanTable(DecodeErrors),
    Generic(&'static str),
    IoError(ZByteIoError),
}

impl Debug for EncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension(param) => writeln!(f, "the {param} is zero"),
            Self::UnsupportedColorspace(c) => {
                writeln!(f, "jpeg encoder cannot encode images in colorspace {c:?}")
            }
            Self::LengthMismatch(expected, found) => {
                writeln!(f, "expected input of length {expected} but found {found}")
            }
            Self::InvalidHuffmanTable(err) => {
                writeln!(f, "failed to build an optimized huffman table: {err:?}")
            }
            Self::Generic(msg) => writeln!(f, "{msg}"),
            Self::IoError(err) => writeln!(f, "I/O error: {err:?}"),
        }
    }
}

impl From<ZByteIoError> for EncodeErrors {
    fn from(value: ZByteIoError) -> Self {
        Self::IoError(value)
    }
}

impl std::fmt::Display for EncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for EncodeErrors {}
