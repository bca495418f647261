use std::fmt::{Debug, Formatter};

use jpeg_core::bit_depth::BitDepth;
use jpeg_core::bytestream::{ZByteIoError, ZByteReader};
use jpeg_core::colorspace::ColorSpace;
use jpeg_core::options::DecoderOptions;

/// Decoding result: either 8 or 16 bit samples, depending on the image's
/// declared maximum value.
pub enum DecodingResult {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

pub enum PnmDecodeErrors {
    Generic(String),
    InvalidHeader(String),
    LargeDimensions(usize, usize),
    IoError(ZByteIoError),
}

impl From<ZByteIoError> for PnmDecodeErrors {
    fn from(value: ZByteIoError) -> Self {
        Self::IoError(value)
    }
}

impl Debug for PnmDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generic(msg) => writeln!(f, "{msg}"),
            Self::InvalidHeader(msg) => writeln!(f, "invalid pnm header: {msg}"),
            Self::LargeDimensions(max, found) => {
                writeln!(f, "dimension {found} exceeds the configured maximum of {max}")
            }
            Self::IoError(err) => writeln!(f, "I/O error: {err:?}"),
        }
    }
}

/// A PGM/PPM/PAM decoder.
pub struct PnmDecoder<'a> {
    reader: ZByteReader<'a>,
    options: DecoderOptions,
    width: usize,
    height: usize,
    colorspace: ColorSpace,
    bit_depth: BitDepth,
    decoded_headers: bool,
}

impl<'a> PnmDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::new_with_options(data, DecoderOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> Self {
        Self {
            reader: ZByteReader::new(data),
            options,
            width: 0,
            height: 0,
            colorspace: ColorSpace::Unknown,
            bit_depth: BitDepth::Eight,
            decoded_headers: false,
        }
    }

    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            Some((self.width, self.height))
        } else {
            None
        }
    }

    pub const fn colorspace(&self) -> Option<ColorSpace> {
        if self.decoded_headers {
            Some(self.colorspace)
        } else {
            None
        }
    }

    pub const fn bit_depth(&self) -> Option<BitDepth> {
        if self.decoded_headers {
            Some(self.bit_depth)
        } else {
            None
        }
    }

    pub fn decode_headers(&mut self) -> Result<(), PnmDecodeErrors> {
        let p = self.reader.read_u8()?;
        let version = self.reader.read_u8()?;

        if p != b'P' {
            return Err(PnmDecodeErrors::InvalidHeader(format!(
                "expected 'P' as the first byte, found '{}'",
                p as char
            )));
        }

        match version {
            b'5' => self.decode_p5_p6_header(ColorSpace::Luma)?,
            b'6' => self.decode_p5_p6_header(ColorSpace::RGB)?,
            b'7' => self.decode_p7_header()?,
            other => {
                return Err(PnmDecodeErrors::InvalidHeader(format!(
                    "unsupported pnm version 'P{}', only P5, P6 and P7 are supported",
                    other as char
                )))
            }
        }

        Ok(())
    }

    fn check_dimensions(&self, width: usize, height: usize) -> Result<(), PnmDecodeErrors> {
        if width > self.options.get_max_width() {
            return Err(PnmDecodeErrors::LargeDimensions(self.options.get_max_width(), width));
        }
        if height > self.options.get_max_height() {
            return Err(PnmDecodeErrors::LargeDimensions(self.options.get_max_height(), height));
        }
        Ok(())
    }

    fn decode_p5_p6_header(&mut self, colorspace: ColorSpace) -> Result<(), PnmDecodeErrors> {
        self.colorspace = colorspace;

        skip_whitespace(&mut self.reader)?;
        self.width = read_integer(&mut self.reader)?;
        skip_whitespace(&mut self.reader)?;
        self.height = read_integer(&mut self.reader)?;
        self.check_dimensions(self.width, self.height)?;

        skip_whitespace(&mut self.reader)?;
        let max_value = read_integer(&mut self.reader)?;
        // a single whitespace byte separates the header from the raster
        self.reader.read_u8()?;

        if max_value > usize::from(u16::MAX) {
            return Err(PnmDecodeErrors::Generic(format!("max value {max_value} exceeds 65535")));
        }
        self.bit_depth = if max_value > 255 { BitDepth::Sixteen } else { BitDepth::Eight };
        self.decoded_headers = true;
        log::debug!("colorspace: {:?}", self.colorspace);
        log::debug!("width: {}, height: {}", self.width, self.height);
        log::debug!("bit depth: {:?}", self.bit_depth);
        Ok(())
    }

    fn decode_p7_header(&mut self) -> Result<(), PnmDecodeErrors> {
        let (mut seen_width, mut seen_height, mut seen_depth, mut seen_maxval, mut seen_tupltype) =
            (false, false, false, false, false);

        loop {
            skip_whitespace(&mut self.reader)?;
            let token = read_token(&mut self.reader)?;

            match token.as_slice() {
                b"WIDTH" => {
                    skip_whitespace(&mut self.reader)?;
                    self.width = read_integer(&mut self.reader)?;
                    self.check_dimensions(self.width, self.height)?;
                    seen_width = true;
                }
                b"HEIGHT" => {
                    skip_whitespace(&mut self.reader)?;
                    self.height = read_integer(&mut self.reader)?;
                    self.check_dimensions(self.width, self.height)?;
                    seen_height = true;
                }
                b"DEPTH" => {
                    skip_whitespace(&mut self.reader)?;
                    let depth = read_integer(&mut self.reader)?;
                    if depth > 4 {
                        return Err(PnmDecodeErrors::InvalidHeader(format!("depth {depth} exceeds 4")));
                    }
                    seen_depth = true;
                }
                b"MAXVAL" => {
                    skip_whitespace(&mut self.reader)?;
                    let max_value = read_integer(&mut self.reader)?;
                    if max_value > usize::from(u16::MAX) {
                        return Err(PnmDecodeErrors::Generic(format!("max value {max_value} exceeds 65535")));
                    }
                    self.bit_depth = if max_value > 255 { BitDepth::Sixteen } else { BitDepth::Eight };
                    seen_maxval = true;
                }
                b"TUPLTYPE" => {
                    skip_whitespace(&mut self.reader)?;
                    let tuple_type = read_token(&mut self.reader)?;
                    self.colorspace = match tuple_type.as_slice() {
                        b"RGB_ALPHA" => ColorSpace::RGBA,
                        b"RGB" => ColorSpace::RGB,
                        b"GRAYSCALE_ALPHA" => ColorSpace::LumaA,
                        b"GRAYSCALE" => ColorSpace::Luma,
                        other => {
                            return Err(PnmDecodeErrors::InvalidHeader(format!(
                                "unsupported tuple type {}",
                                String::from_utf8_lossy(other)
                            )))
                        }
                    };
                    seen_tupltype = true;
                }
                b"ENDHDR" => break,
                other => {
                    return Err(PnmDecodeErrors::InvalidHeader(format!(
                        "unknown header field {}",
                        String::from_utf8_lossy(other)
                    )))
                }
            }
        }

        if !(seen_width && seen_height && seen_depth && seen_maxval && seen_tupltype) {
            return Err(PnmDecodeErrors::InvalidHeader("missing required P7 header field".into()));
        }
        self.decoded_headers = true;
        log::debug!("colorspace: {:?}", self.colorspace);
        log::debug!("width: {}, height: {}", self.width, self.height);
        log::debug!("bit depth: {:?}", self.bit_depth);
        Ok(())
    }

    pub fn decode(&mut self) -> Result<DecodingResult, PnmDecodeErrors> {
        if !self.decoded_headers {
            self.decode_headers()?;
        }
        if self.width == 0 || self.height == 0 {
            return Err(PnmDecodeErrors::Generic("zero dimensions are not allowed".into()));
        }

        let sample_count = self.width * self.height * self.colorspace.num_components();
        match self.bit_depth {
            BitDepth::Eight => {
                let bytes = self.reader.read_slice(sample_count)?;
                Ok(DecodingResult::U8(bytes.to_vec()))
            }
            BitDepth::Sixteen => {
                let mut out = Vec::with_capacity(sample_count);
                for _ in 0..sample_count {
                    out.push(self.reader.read_u16_be()?);
                }
                Ok(DecodingResult::U16(out))
            }
        }
    }
}

fn skip_whitespace(reader: &mut ZByteReader) -> Result<(), PnmDecodeErrors> {
    while let Some(byte) = reader.peek_u8() {
        if byte == b'#' {
            while reader.peek_u8().is_some_and(|b| b != b'\n') {
                reader.read_u8()?;
            }
        } else if byte.is_ascii_whitespace() {
            reader.read_u8()?;
        } else {
            break;
        }
    }
    Ok(())
}

fn read_integer(reader: &mut ZByteReader) -> Result<usize, PnmDecodeErrors> {
    let mut value = 0usize;
    let mut saw_digit = false;
    while let Some(byte) = reader.peek_u8() {
        if byte.is_ascii_digit() {
            value = value * 10 + usize::from(byte - b'0');
            saw_digit = true;
            reader.read_u8()?;
        } else {
            break;
        }
    }
    if !saw_digit {
        return Err(PnmDecodeErrors::InvalidHeader("expected an integer".into()));
    }
    Ok(value)
}

fn read_token(reader: &mut ZByteReader) -> Result<Vec<u8>, PnmDecodeErrors> {
    let mut token = Vec::new();
    while let Some(byte) = reader.peek_u8() {
        if byte.is_ascii_whitespace() {
            break;
        }
        token.push(byte);
        reader.read_u8()?;
    }
    if token.is_empty() {
        return Err(PnmDecodeErrors::InvalidHeader("expected a header token".into()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_p5_grayscale_image() {
        let data = b"P5\n2 1\n255\n\x10\x20";
        let mut decoder = PnmDecoder::new(data);
        decoder.decode_headers().unwrap();
        assert_eq!(decoder.dimensions(), Some((2, 1)));
        assert_eq!(decoder.colorspace(), Some(ColorSpace::Luma));
        let DecodingResult::U8(bytes) = decoder.decode().unwrap() else {
            panic!("expected 8 bit output")
        };
        assert_eq!(bytes, vec![0x10, 0x20]);
    }

    #[test]
    fn decodes_a_p6_rgb_image_with_a_comment() {
        let data = b"P6\n# a comment\n1 1\n255\n\x01\x02\x03";
        let mut decoder = PnmDecoder::new(data);
        let DecodingResult::U8(bytes) = decoder.decode().unwrap() else {
            panic!("expected 8 bit output")
        };
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn rejects_an_unsupported_version() {
        let data = b"P3\n1 1\n255\n1 2 3";
        let mut decoder = PnmDecoder::new(data);
        assert!(decoder.decode_headers().is_err());
    }
}
