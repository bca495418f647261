//! Marker segment parsing: `SOF`, `DQT`, `DHT`, `SOS`, `DRI`, and the
//! APPn/COM segments we skip over without interpreting, per ITU-T T.81
//! section B.2.

use jpeg_core::bytestream::ZByteReader;

use crate::component::Component;
use crate::errors::DecodeErrors;
use crate::marker::SOFMarker;
use crate::quant::QTable;

pub struct FrameHeader {
    pub precision: u8,
    pub height: usize,
    pub width: usize,
    pub components: Vec<Component>,
}

/// One `Ss Se Ah Al` component entry plus the huffman table selectors
/// carried in an `SOS` segment.
pub struct ScanComponent {
    pub component_index: usize,
    pub dc_table: u8,
    pub ac_table: u8,
}

pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
}

fn segment_length(reader: &mut ZByteReader) -> Result<usize, DecodeErrors> {
    let len = reader.read_u16_be()? as usize;
    if len < 2 {
        return Err(DecodeErrors::Format(
            "marker segment length shorter than its own length field".into(),
        ));
    }
    Ok(len - 2)
}

/// Parses a `SOFn` segment (section B.2.2).
pub fn parse_sof(
    reader: &mut ZByteReader,
    _marker: SOFMarker,
) -> Result<FrameHeader, DecodeErrors> {
    let _len = segment_length(reader)?;
    let precision = reader.read_u8()?;
    let height = reader.read_u16_be()? as usize;
    let width = reader.read_u16_be()? as usize;
    let num_components = reader.read_u8()?;

    if width == 0 {
        return Err(DecodeErrors::InvalidParameter("image width is zero".into()));
    }

    let mut components = Vec::with_capacity(num_components as usize);
    for _ in 0..num_components {
        let id = reader.read_u8()?;
        let sampling = reader.read_u8()?;
        let qtable = reader.read_u8()?;
        if qtable > 3 {
            return Err(DecodeErrors::InvalidParameter(format!(
                "component {id} references quantization table {qtable}"
            )));
        }
        let component = Component::new(id, sampling >> 4, sampling & 0x0F, qtable)?;
        components.push(component);
    }

    Ok(FrameHeader {
        precision,
        height,
        width,
        components,
    })
}

/// Parses a `DQT` segment (section B.2.4.1); a single segment may carry
/// several tables back to back.
pub fn parse_dqt(
    reader: &mut ZByteReader,
    tables: &mut [Option<QTable>; 4],
) -> Result<(), DecodeErrors> {
    let len = segment_length(reader)?;
    let end = reader.position() + len;

    while reader.position() < end {
        let pq_tq = reader.read_u8()?;
        let precision = pq_tq >> 4;
        let index = (pq_tq & 0x0F) as usize;
        if index > 3 {
            return Err(DecodeErrors::InvalidParameter(format!(
                "quantization table index {index} out of range"
            )));
        }

        let mut zigzag = [0u16; 64];
        for slot in &mut zigzag {
            *slot = if precision == 0 {
                u16::from(reader.read_u8()?)
            } else {
                reader.read_u16_be()?
            };
        }
        let natural = crate::zigzag::un_zigzag(&zigzag.map(i32::from));
        let mut values = [0u16; 64];
        for (v, n) in values.iter_mut().zip(natural.iter()) {
            *v = *n as u16;
        }
        tables[index] = Some(QTable::new(values));
    }
    Ok(())
}

/// Parses a `DHT` segment (section B.2.4.2); again, several tables may be
/// packed into one segment.
pub fn parse_dht(
    reader: &mut ZByteReader,
    dc_tables: &mut [Option<crate::huffman::HuffmanTable>; 4],
    ac_tables: &mut [Option<crate::huffman::HuffmanTable>; 4],
) -> Result<(), DecodeErrors> {
    let len = segment_length(reader)?;
    let end = reader.position() + len;

    while reader.position() < end {
        let tc_th = reader.read_u8()?;
        let class = tc_th >> 4;
        let index = (tc_th & 0x0F) as usize;
        if index > 3 {
            return Err(DecodeErrors::InvalidParameter(format!(
                "huffman table index {index} out of range"
            )));
        }

        let mut bits = [0u8; 17];
        let mut total = 0usize;
        for slot in bits.iter_mut().skip(1) {
            *slot = reader.read_u8()?;
            total += *slot as usize;
        }
        let mut values = Vec::with_capacity(total);
        for _ in 0..total {
            values.push(reader.read_u8()?);
        }

        let table = crate::huffman::HuffmanTable::build(bits, values)?;
        if class == 0 {
            dc_tables[index] = Some(table);
        } else {
            ac_tables[index] = Some(table);
        }
    }
    Ok(())
}

/// Parses an `SOS` segment header, section B.2.3 (the entropy coded data
/// that follows is handled by the caller, not this function).
pub fn parse_sos(
    reader: &mut ZByteReader,
    frame: &FrameHeader,
) -> Result<ScanHeader, DecodeErrors> {
    let _len = segment_length(reader)?;
    let num_components = reader.read_u8()?;

    let mut components = Vec::with_capacity(num_components as usize);
    for _ in 0..num_components {
        let selector = reader.read_u8()?;
        let tables = reader.read_u8()?;

        let component_index = frame
            .components
            .iter()
            .position(|c| c.id.0 == selector)
            .ok_or_else(|| {
                DecodeErrors::InvalidParameter(format!(
                    "scan references unknown component {selector}"
                ))
            })?;

        components.push(ScanComponent {
            component_index,
            dc_table: tables >> 4,
            ac_table: tables & 0x0F,
        });
    }

    // Ss, Se, Ah/Al: fixed at 0, 63, 0 for baseline sequential scans, but we
    // still need to consume the bytes.
    let _spectral_start = reader.read_u8()?;
    let _spectral_end = reader.read_u8()?;
    let _approximation = reader.read_u8()?;

    Ok(ScanHeader { components })
}

/// Parses a `DRI` segment (section B.2.4.4): the restart interval, in MCUs.
pub fn parse_dri(reader: &mut ZByteReader) -> Result<u16, DecodeErrors> {
    let _len = segment_length(reader)?;
    reader.read_u16_be().map_err(Into::into)
}

/// Skips an `APPn` or `COM` segment without interpreting its payload.
pub fn skip_segment(reader: &mut ZByteReader) -> Result<(), DecodeErrors> {
    let len = segment_length(reader)?;
    reader.skip(len).map_err(Into::into)
}
