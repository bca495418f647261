//! Marker segment emission: the inverse of [`crate::headers`].

use jpeg_core::bytestream::ZByteWriter;

use crate::component::Component;
use crate::huffman::HuffmanTable;
use crate::marker;
use crate::quant::QTable;

pub fn write_soi(writer: &mut ZByteWriter) {
    writer.write_u16_be(marker::SOI);
}

pub fn write_eoi(writer: &mut ZByteWriter) {
    writer.write_u16_be(marker::EOI);
}

pub fn write_dqt(writer: &mut ZByteWriter, index: u8, table: &QTable) {
    writer.write_u16_be(marker::DQT);
    writer.write_u16_be(2 + 1 + 64);
    writer.write_u8(index); // Pq=0 (8-bit precision), Tq=index
    let zigzag = crate::zigzag::to_zigzag(&table.values.map(i32::from));
    for value in zigzag {
        writer.write_u8(value as u8);
    }
}

pub fn write_sof0(writer: &mut ZByteWriter, width: usize, height: usize, components: &[Component]) {
    writer.write_u16_be(marker::SOF0);
    writer.write_u16_be((8 + 3 * components.len()) as u16);
    writer.write_u8(8); // 8-bit sample precision, baseline only
    writer.write_u16_be(height as u16);
    writer.write_u16_be(width as u16);
    writer.write_u8(components.len() as u8);
    for component in components {
        writer.write_u8(component.id.0);
        writer.write_u8((component.horizontal_sampling << 4) | component.vertical_sampling);
        writer.write_u8(component.quantization_table);
    }
}

pub fn write_dht(writer: &mut ZByteWriter, class: u8, index: u8, table: &HuffmanTable) {
    writer.write_u16_be(marker::DHT);
    let length = 2 + 1 + 16 + table.values().len();
    writer.write_u16_be(length as u16);
    writer.write_u8((class << 4) | index);
    for count in table.bits().iter().skip(1) {
        writer.write_u8(*count);
    }
    writer.write_all(table.values());
}

pub fn write_dri(writer: &mut ZByteWriter, interval: u16) {
    writer.write_u16_be(marker::DRI);
    writer.write_u16_be(4);
    writer.write_u16_be(interval);
}

pub struct ScanComponentRef {
    pub component_id: u8,
    pub dc_table: u8,
    pub ac_table: u8,
}

pub fn write_sos(writer: &mut ZByteWriter, components: &[ScanComponentRef]) {
    writer.write_u16_be(marker::SOS);
    writer.write_u16_be((6 + 2 * components.len()) as u16);
    writer.write_u8(components.len() as u8);
    for component in components {
        writer.write_u8(component.component_id);
        writer.write_u8((component.dc_table << 4) | component.ac_table);
    }
    writer.write_u8(0); // Ss
    writer.write_u8(63); // Se
    writer.write_u8(0); // Ah/Al
}

pub fn write_restart_marker(writer: &mut ZByteWriter, index: u8) {
    writer.write_u16_be(0xFFD0 | u16::from(index & 0x07));
}
