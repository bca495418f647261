//! JPEG marker byte values and the `SOF` frame-type tag.
#![allow(dead_code)]

use std::fmt;

/// Marker prefix byte. Every marker is `0xFF` followed by a non-zero,
/// non-`0xFF` marker code.
pub const MARKER_PREFIX: u8 = 0xFF;

pub const SOI: u16 = 0xFFD8;
pub const EOI: u16 = 0xFFD9;

pub const SOF0: u16 = 0xFFC0;
pub const SOF1: u16 = 0xFFC1;
pub const SOF2: u16 = 0xFFC2;
pub const SOF3: u16 = 0xFFC3;
pub const SOF5: u16 = 0xFFC5;
pub const SOF6: u16 = 0xFFC6;
pub const SOF7: u16 = 0xFFC7;
pub const SOF9: u16 = 0xFFC9;
pub const SOF10: u16 = 0xFFCA;
pub const SOF11: u16 = 0xFFCB;
pub const SOF13: u16 = 0xFFCD;
pub const SOF14: u16 = 0xFFCE;
pub const SOF15: u16 = 0xFFCF;

pub const DHT: u16 = 0xFFC4;
pub const DAC: u16 = 0xFFCC;

pub const RST0: u16 = 0xFFD0;
pub const RST7: u16 = 0xFFD7;

pub const DQT: u16 = 0xFFDB;
pub const DNL: u16 = 0xFFDC;
pub const DRI: u16 = 0xFFDD;
pub const DHP: u16 = 0xFFDE;
pub const EXP: u16 = 0xFFDF;

pub const APP0: u16 = 0xFFE0;
pub const APP15: u16 = 0xFFEF;

pub const COM: u16 = 0xFFFE;
pub const SOS: u16 = 0xFFDA;
pub const TEM: u16 = 0xFF01;

/// Returns `true` if `marker` is one of the eight restart markers.
pub const fn is_restart_marker(marker: u16) -> bool {
    marker >= RST0 && marker <= RST7
}

/// Returns `true` if `marker` is one of `APP0..=APP15`.
pub const fn is_app_marker(marker: u16) -> bool {
    marker >= APP0 && marker <= APP15
}

/// The frame type carried by a `SOFn` marker.
///
/// Only `BaselineDct` is fully supported by the codec; the others are
/// recognized purely so the decoder can report a precise
/// [`Unsupported`](crate::errors::DecodeErrors::Unsupported) error instead of
/// misparsing the stream.
#[derive(Eq, PartialEq, Copy, Clone)]
#[allow(clippy::upper_case_acronyms)]
pub enum SOFMarker {
    BaselineDct,
    ExtendedSequentialHuffman,
    ProgressiveDctHuffman,
    LosslessHuffman,
    ExtendedSequentialDctArithmetic,
    ProgressiveDctArithmetic,
    LosslessArithmetic,
}

impl SOFMarker {
    pub fn is_sequential_dct(self) -> bool {
        matches!(
            self,
            Self::BaselineDct
                | Self::ExtendedSequentialHuffman
                | Self::ExtendedSequentialDctArithmetic
        )
    }

    pub fn is_baseline(self) -> bool {
        matches!(self, Self::BaselineDct)
    }

    pub fn from_marker(marker: u16) -> Option<SOFMarker> {
        match marker {
            SOF0 => Some(Self::BaselineDct),
            SOF1 => Some(Self::ExtendedSequentialHuffman),
            SOF2 => Some(Self::ProgressiveDctHuffman),
            SOF3 => Some(Self::LosslessHuffman),
            SOF9 => Some(Self::ExtendedSequentialDctArithmetic),
            SOF10 => Some(Self::ProgressiveDctArithmetic),
            SOF11 => Some(Self::LosslessArithmetic),
            _ => None,
        }
    }
}

impl fmt::Debug for SOFMarker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BaselineDct => write!(f, "Baseline DCT"),
            Self::ExtendedSequentialHuffman => write!(f, "Extended sequential DCT, Huffman coding"),
            Self::ProgressiveDctHuffman => write!(f, "Progressive DCT, Huffman coding"),
            Self::LosslessHuffman => write!(f, "Lossless (sequential), Huffman coding"),
            Self::ExtendedSequentialDctArithmetic => {
                write!(f, "Extended sequential DCT, arithmetic coding")
            }
            Self::ProgressiveDctArithmetic => write!(f, "Progressive DCT, arithmetic coding"),
            Self::LosslessArithmetic => write!(f, "Lossless (sequential), arithmetic coding"),
        }
    }
}
