use std::fmt::{Debug, Formatter};

use jpeg_core::bit_depth::BitType;
use jpeg_core::bytestream::ZByteWriter;
use jpeg_core::colorspace::ColorSpace;
use jpeg_core::options::EncoderOptions;

pub enum PnmEncodeErrors {
    UnsupportedColorspace(ColorSpace),
    LengthMismatch(usize, usize),
}

impl Debug for PnmEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedColorspace(c) => writeln!(f, "pnm cannot encode colorspace {c:?}"),
            Self::LengthMismatch(expected, found) => {
                writeln!(f, "expected input of length {expected} but found {found}")
            }
        }
    }
}

enum PnmVersion {
    P5,
    P6,
    P7,
}

fn version_for(colorspace: ColorSpace) -> Option<PnmVersion> {
    match colorspace {
        ColorSpace::Luma => Some(PnmVersion::P5),
        ColorSpace::RGB => Some(PnmVersion::P6),
        ColorSpace::LumaA | ColorSpace::RGBA => Some(PnmVersion::P7),
        _ => None,
    }
}

fn tuple_type_for(colorspace: ColorSpace) -> &'static str {
    match colorspace {
        ColorSpace::Luma => "GRAYSCALE",
        ColorSpace::RGB => "RGB",
        ColorSpace::LumaA => "GRAYSCALE_ALPHA",
        ColorSpace::RGBA => "RGB_ALPHA",
        _ => unreachable!("tuple_type_for is only called for colorspaces version_for accepts"),
    }
}

/// A PGM/PPM/PAM encoder, taking raw samples in `options.colorspace()`.
pub struct PnmEncoder<'a> {
    data: &'a [u8],
    options: EncoderOptions,
}

impl<'a> PnmEncoder<'a> {
    pub fn new(data: &'a [u8], options: EncoderOptions) -> Self {
        Self { data, options }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PnmEncodeErrors> {
        let colorspace = self.options.colorspace();
        let version =
            version_for(colorspace).ok_or(PnmEncodeErrors::UnsupportedColorspace(colorspace))?;

        let expected = self.options.width()
            * self.options.height()
            * colorspace.num_components()
            * self.options.depth().size_of();
        if self.data.len() != expected {
            return Err(PnmEncodeErrors::LengthMismatch(expected, self.data.len()));
        }

        let mut writer = ZByteWriter::with_capacity(expected + 64);
        let header = match version {
            PnmVersion::P5 | PnmVersion::P6 => format!(
                "{}\n{}\n{}\n{}\n",
                if matches!(version, PnmVersion::P5) { "P5" } else { "P6" },
                self.options.width(),
                self.options.height(),
                self.options.depth().max_value()
            ),
            PnmVersion::P7 => format!(
                "P7\nWIDTH {}\nHEIGHT {}\nDEPTH {}\nMAXVAL {}\nTUPLTYPE {}\nENDHDR\n",
                self.options.width(),
                self.options.height(),
                colorspace.num_components(),
                self.options.depth().max_value(),
                tuple_type_for(colorspace)
            ),
        };
        writer.write_all(header.as_bytes());

        match self.options.depth().bit_type() {
            BitType::Eight => writer.write_all(self.data),
            BitType::Sixteen => {
                for chunk in self.data.chunks_exact(2) {
                    let sample = u16::from_ne_bytes([chunk[0], chunk[1]]);
                    writer.write_u16_be(sample);
                }
            }
        }

        Ok(writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use jpeg_core::bit_depth::BitDepth;

    use super::*;

    #[test]
    fn encodes_a_p5_grayscale_image() {
        let options = EncoderOptions::new(2, 1, ColorSpace::Luma, BitDepth::Eight);
        let encoder = PnmEncoder::new(&[10, 20], options);
        let bytes = encoder.encode().unwrap();
        assert_eq!(&bytes, b"P5\n2\n1\n255\n\x0a\x14");
    }

    #[test]
    fn rejects_length_mismatch() {
        let options = EncoderOptions::new(2, 1, ColorSpace::Luma, BitDepth::Eight);
        let encoder = PnmEncoder::new(&[10], options);
        assert!(encoder.encode().is_err());
    }
}
