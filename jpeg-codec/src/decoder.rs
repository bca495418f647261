//! Top level baseline sequential JPEG decode pipeline.

use jpeg_core::bytestream::ZByteReader;
use jpeg_core::colorspace::ColorSpace;
use jpeg_core::options::DecoderOptions;

use crate::bitstream::BitReader;
use crate::coeff::decode_block;
use crate::component::{Component, FrameLayout};
use crate::dct::inverse_dct;
use crate::errors::DecodeErrors;
use crate::headers::{self, FrameHeader};
use crate::huffman::HuffmanTable;
use crate::marker;
use crate::quant::QTable;

/// Dimensions of a successfully parsed image, available after
/// [`JpegDecoder::decode_headers`] without needing a full decode.
#[derive(Copy, Clone, Debug)]
pub struct ImageInfo {
    pub width: usize,
    pub height: usize,
    pub components: usize,
}

pub struct JpegDecoder<'a> {
    reader: ZByteReader<'a>,
    options: DecoderOptions,

    qtables: [Option<QTable>; 4],
    dc_tables: [Option<HuffmanTable>; 4],
    ac_tables: [Option<HuffmanTable>; 4],
    restart_interval: u16,

    frame: Option<FrameHeader>,
}

impl<'a> JpegDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::new_with_options(data, DecoderOptions::default())
    }

    #[must_use]
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> Self {
        Self {
            reader: ZByteReader::new(data),
            options,
            qtables: Default::default(),
            dc_tables: Default::default(),
            ac_tables: Default::default(),
            restart_interval: 0,
            frame: None,
        }
    }

    /// Parses every marker segment up to (and not including) the entropy
    /// coded scan data, leaving the decoder ready for [`Self::decode`].
    pub fn decode_headers(&mut self) -> Result<ImageInfo, DecodeErrors> {
        if self.reader.read_u16_be()? != marker::SOI {
            return Err(DecodeErrors::Format(
                "stream does not start with SOI".into(),
            ));
        }

        loop {
            let found = self.next_marker()?;

            match found {
                marker::DQT => headers::parse_dqt(&mut self.reader, &mut self.qtables)?,
                marker::DHT => {
                    headers::parse_dht(&mut self.reader, &mut self.dc_tables, &mut self.ac_tables)?
                }
                marker::DRI => self.restart_interval = headers::parse_dri(&mut self.reader)?,
                marker::SOS => {
                    return Err(DecodeErrors::Format("SOS encountered before SOF".into()))
                }
                marker::EOI => {
                    return Err(DecodeErrors::Truncated("image ended before a frame header"))
                }
                marker::SOF0 => {
                    let frame =
                        headers::parse_sof(&mut self.reader, marker::SOFMarker::BaselineDct)?;
                    let info = self.check_frame(&frame)?;
                    log::debug!(
                        "parsed frame header: {}x{}, {} component(s)",
                        info.width,
                        info.height,
                        info.components
                    );
                    self.frame = Some(frame);
                    return Ok(info);
                }
                _ if marker::SOFMarker::from_marker(found).is_some() => {
                    log::warn!("rejecting unsupported SOF marker 0x{found:04X}");
                    return Err(DecodeErrors::Unsupported(
                        "only baseline sequential (SOF0) jpeg streams are supported",
                    ));
                }
                _ => headers::skip_segment(&mut self.reader)?,
            }
        }
    }

    fn next_marker(&mut self) -> Result<u16, DecodeErrors> {
        loop {
            let byte = self.reader.read_u8()?;
            if byte != marker::MARKER_PREFIX {
                return Err(DecodeErrors::Format("expected a marker prefix byte".into()));
            }
            let tag = self.reader.read_u8()?;
            if tag == 0x00 || tag == marker::MARKER_PREFIX {
                continue; // fill/stuffed byte outside entropy data, ignore
            }
            return Ok(u16::from_be_bytes([marker::MARKER_PREFIX, tag]));
        }
    }

    fn check_frame(&self, frame: &FrameHeader) -> Result<ImageInfo, DecodeErrors> {
        if frame.precision != 8 {
            return Err(DecodeErrors::Unsupported(
                "only 8-bit sample precision is supported",
            ));
        }
        if frame.width > self.options.get_max_width()
            || frame.height > self.options.get_max_height()
        {
            return Err(DecodeErrors::LimitExceeded(format!(
                "{}x{} exceeds the configured maximum of {}x{}",
                frame.width,
                frame.height,
                self.options.get_max_width(),
                self.options.get_max_height()
            )));
        }
        if frame.components.is_empty() || frame.components.len() > 4 {
            return Err(DecodeErrors::InvalidParameter(
                "frame must declare 1-4 components".into(),
            ));
        }
        Ok(ImageInfo {
            width: frame.width,
            height: frame.height,
            components: frame.components.len(),
        })
    }

    /// Decodes the full image, returning interleaved samples in the
    /// colorspace requested by [`DecoderOptions`].
    pub fn decode(&mut self) -> Result<Vec<u8>, DecodeErrors> {
        if self.frame.is_none() {
            self.decode_headers()?;
        }

        loop {
            let found = self.next_marker()?;

            match found {
                marker::DQT => headers::parse_dqt(&mut self.reader, &mut self.qtables)?,
                marker::DHT => {
                    headers::parse_dht(&mut self.reader, &mut self.dc_tables, &mut self.ac_tables)?
                }
                marker::DRI => self.restart_interval = headers::parse_dri(&mut self.reader)?,
                marker::SOS => self.decode_scan()?,
                marker::EOI => return self.finish(),
                _ => headers::skip_segment(&mut self.reader)?,
            }
        }
    }

    fn decode_scan(&mut self) -> Result<(), DecodeErrors> {
        let frame = self
            .frame
            .as_mut()
            .ok_or_else(|| DecodeErrors::Format("SOS before SOF".into()))?;
        let scan = headers::parse_sos(&mut self.reader, frame)?;

        let layout = FrameLayout::new(frame.width, frame.height, &frame.components);
        layout.allocate(&mut frame.components);
        for component in &mut frame.components {
            component.dc_predictor = 0;
        }

        let data_start = self.reader.position();
        let mut bit_reader = BitReader::new(self.reader.remaining_slice());

        let total_mcus = layout.mcus_per_row * layout.mcus_per_column;
        let mut mcus_since_restart = 0u16;

        for mcu_index in 0..total_mcus {
            let mcu_col = mcu_index % layout.mcus_per_row;
            let mcu_row = mcu_index / layout.mcus_per_row;

            for scan_component in &scan.components {
                let component = &mut frame.components[scan_component.component_index];
                let dc_table = self.dc_tables[scan_component.dc_table as usize]
                    .as_ref()
                    .ok_or_else(|| {
                        DecodeErrors::Format("scan references an undefined DC table".into())
                    })?;
                let ac_table = self.ac_tables[scan_component.ac_table as usize]
                    .as_ref()
                    .ok_or_else(|| {
                        DecodeErrors::Format("scan references an undefined AC table".into())
                    })?;
                let qtable =
                    self.qtables[component.quantization_table as usize].ok_or_else(|| {
                        DecodeErrors::Format(
                            "component references an undefined quantization table".into(),
                        )
                    })?;

                for v in 0..component.vertical_sampling as usize {
                    for h in 0..component.horizontal_sampling as usize {
                        let block = decode_block(
                            &mut bit_reader,
                            dc_table,
                            ac_table,
                            &mut component.dc_predictor,
                        )?;
                        let dequantized = qtable.dequantize(&block);
                        let samples = inverse_dct(&dequantized);

                        let block_x = mcu_col * component.horizontal_sampling as usize + h;
                        let block_y = mcu_row * component.vertical_sampling as usize + v;
                        place_block(component, block_x, block_y, &samples);
                    }
                }
            }

            mcus_since_restart += 1;
            let is_last_mcu = mcu_index + 1 == total_mcus;
            if self.restart_interval > 0
                && mcus_since_restart == self.restart_interval
                && !is_last_mcu
            {
                let found = bit_reader.consume_restart_marker();
                if !marker::is_restart_marker(found) {
                    return Err(DecodeErrors::Format(format!(
                        "expected a restart marker, found {found:04x}"
                    )));
                }
                for component in &mut frame.components {
                    component.dc_predictor = 0;
                }
                mcus_since_restart = 0;
            }
        }

        self.reader
            .set_position(data_start + bit_reader.byte_position());
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, DecodeErrors> {
        let frame = self
            .frame
            .take()
            .ok_or_else(|| DecodeErrors::Format("EOI reached with no frame decoded".into()))?;

        let layout = FrameLayout::new(frame.width, frame.height, &frame.components);
        let out_colorspace = self.options.out_colorspace();
        let padded_width = layout.mcus_per_row * 8 * layout.h_max as usize;
        let padded_height = layout.mcus_per_column * 8 * layout.v_max as usize;

        let planes: Vec<Vec<u8>> = frame
            .components
            .iter()
            .map(|component| {
                let full = crate::component::upsample_nearest(
                    component,
                    layout.h_max,
                    layout.v_max,
                    padded_width,
                    padded_height,
                );
                crop_plane(&full, padded_width, frame.width, frame.height)
            })
            .collect();

        assemble_output(&planes, frame.components.len(), out_colorspace)
    }
}

fn place_block(component: &mut Component, block_x: usize, block_y: usize, samples: &[u8; 64]) {
    let plane_width = component.block_width * 8;
    let origin_x = block_x * 8;
    let origin_y = block_y * 8;
    for y in 0..8 {
        let row_start = (origin_y + y) * plane_width + origin_x;
        component.samples[row_start..row_start + 8].copy_from_slice(&samples[y * 8..y * 8 + 8]);
    }
}

fn crop_plane(full: &[u8], full_width: usize, width: usize, height: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        out.extend_from_slice(&full[y * full_width..y * full_width + width]);
    }
    out
}

fn assemble_output(
    planes: &[Vec<u8>],
    num_components: usize,
    out_colorspace: ColorSpace,
) -> Result<Vec<u8>, DecodeErrors> {
    let pixel_count = planes.first().map_or(0, Vec::len);

    match (num_components, out_colorspace) {
        (1, _) => Ok(planes[0].clone()),
        (3, ColorSpace::RGB) => {
            let mut out = vec![0u8; pixel_count * 3];
            crate::color::ycbcr_slice_to_rgb(&planes[0], &planes[1], &planes[2], &mut out);
            Ok(out)
        }
        (3, ColorSpace::YCbCr) => {
            let mut out = vec![0u8; pixel_count * 3];
            for i in 0..pixel_count {
                out[i * 3] = planes[0][i];
                out[i * 3 + 1] = planes[1][i];
                out[i * 3 + 2] = planes[2][i];
            }
            Ok(out)
        }
        _ => Err(DecodeErrors::Unsupported(
            "requested output colorspace is not supported for this component count",
        )),
    }
}
