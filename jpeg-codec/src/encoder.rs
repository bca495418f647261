//! Top level baseline sequential JPEG encode pipeline.

use jpeg_core::bytestream::ZByteWriter;
use jpeg_core::colorspace::ColorSpace;
use jpeg_core::options::EncoderOptions;

use crate::bitstream::{magnitude_and_bits, BitWriter};
use crate::coeff::encode_block;
use crate::color::rgb_to_ycbcr;
use crate::component::{Component, FrameLayout};
use crate::dct::forward_dct;
use crate::default_tables;
use crate::errors::EncodeErrors;
use crate::huffman::HuffmanTable;
use crate::huffman_optimizer::FrequencyTable;
use crate::quant::{scale_qtable, QTable, BASE_CHROMA_QTABLE, BASE_LUMA_QTABLE};
use crate::writer;
use crate::zigzag::UN_ZIGZAG;

const LUMA_QTABLE_INDEX: u8 = 0;
const CHROMA_QTABLE_INDEX: u8 = 1;

/// Encodes `pixels` (interleaved samples in `options.colorspace()`, row
/// major, `options.width() * options.height() * colorspace.num_components()`
/// bytes) into a complete baseline sequential JPEG stream.
///
/// Chroma is subsampled 4:2:0 whenever the source has separate chroma planes
/// (`RGB`/`YCbCr`); `Luma` is encoded as a single non-subsampled component.
pub fn encode(pixels: &[u8], options: &EncoderOptions) -> Result<Vec<u8>, EncodeErrors> {
    if options.width() == 0 || options.height() == 0 {
        return Err(EncodeErrors::ZeroDimension("width or height"));
    }
    let colorspace = options.colorspace();
    let expected_len = options.width() * options.height() * colorspace.num_components();
    if pixels.len() != expected_len {
        return Err(EncodeErrors::LengthMismatch(expected_len, pixels.len()));
    }

    log::debug!(
        "encoding a {}x{} {:?} image{}",
        options.width(),
        options.height(),
        colorspace,
        if options.optimize_huffman() {
            " with optimized huffman tables"
        } else {
            ""
        }
    );

    let mut components = match colorspace {
        ColorSpace::Luma => vec![build_luma_component(options, pixels)],
        ColorSpace::RGB | ColorSpace::YCbCr => build_ycbcr_components(options, pixels, colorspace),
        other => return Err(EncodeErrors::UnsupportedColorspace(other)),
    };

    // every component's sample plane must cover the whole MCU grid, not just
    // its own content, since `encode_scan` walks blocks by MCU position.
    let layout = FrameLayout::new(options.width(), options.height(), &components);
    for component in &mut components {
        let block_width = layout.mcus_per_row * component.horizontal_sampling as usize;
        let block_height = layout.mcus_per_column * component.vertical_sampling as usize;
        if block_width != component.block_width || block_height != component.block_height {
            component.samples = pad_plane(
                &component.samples,
                component.block_width * 8,
                component.block_height * 8,
                block_width * 8,
                block_height * 8,
            );
            component.block_width = block_width;
            component.block_height = block_height;
        }
    }

    let luma_qtable = QTable::new(scale_qtable(&BASE_LUMA_QTABLE, options.quality()));
    let chroma_qtable = QTable::new(scale_qtable(&BASE_CHROMA_QTABLE, options.quality()));
    let qtable_for = |component: &Component| {
        if component.quantization_table == LUMA_QTABLE_INDEX {
            &luma_qtable
        } else {
            &chroma_qtable
        }
    };

    let quantized: Vec<Vec<[i32; 64]>> = components
        .iter()
        .map(|c| forward_blocks(c, qtable_for(c)))
        .collect();
    // the sample planes are no longer needed once every block is quantized
    for component in &mut components {
        component.samples = Vec::new();
    }

    let (dc_luma, ac_luma, dc_chroma, ac_chroma) = if options.optimize_huffman() {
        build_optimized_tables(&components, &quantized, &layout, options.restart_interval())?
    } else {
        (
            HuffmanTable::build(
                default_tables::DC_LUMA_BITS,
                default_tables::DC_LUMA_VALUES.to_vec(),
            )
            .expect("default tables are always well formed"),
            HuffmanTable::build(
                default_tables::AC_LUMA_BITS,
                default_tables::AC_LUMA_VALUES.to_vec(),
            )
            .expect("default tables are always well formed"),
            HuffmanTable::build(
                default_tables::DC_CHROMA_BITS,
                default_tables::DC_CHROMA_VALUES.to_vec(),
            )
            .expect("default tables are always well formed"),
            HuffmanTable::build(
                default_tables::AC_CHROMA_BITS,
                default_tables::AC_CHROMA_VALUES.to_vec(),
            )
            .expect("default tables are always well formed"),
        )
    };

    let mut writer = ZByteWriter::new();
    writer::write_soi(&mut writer);
    writer::write_dqt(&mut writer, LUMA_QTABLE_INDEX, &luma_qtable);
    if components.len() > 1 {
        writer::write_dqt(&mut writer, CHROMA_QTABLE_INDEX, &chroma_qtable);
    }
    writer::write_sof0(&mut writer, options.width(), options.height(), &components);
    writer::write_dht(&mut writer, 0, 0, &dc_luma);
    writer::write_dht(&mut writer, 1, 0, &ac_luma);
    if components.len() > 1 {
        writer::write_dht(&mut writer, 0, 1, &dc_chroma);
        writer::write_dht(&mut writer, 1, 1, &ac_chroma);
    }
    if options.restart_interval() > 0 {
        writer::write_dri(&mut writer, options.restart_interval());
    }

    let scan_components: Vec<writer::ScanComponentRef> = components
        .iter()
        .map(|component| writer::ScanComponentRef {
            component_id: component.id.0,
            dc_table: component.dc_table,
            ac_table: component.ac_table,
        })
        .collect();
    writer::write_sos(&mut writer, &scan_components);

    let dc_tables = [&dc_luma, &dc_chroma];
    let ac_tables = [&ac_luma, &ac_chroma];
    let entropy_data = encode_scan(
        &components,
        &quantized,
        &layout,
        &dc_tables,
        &ac_tables,
        options.restart_interval(),
    );
    writer.write_all(&entropy_data);

    writer::write_eoi(&mut writer);
    Ok(writer.into_inner())
}

fn build_luma_component(options: &EncoderOptions, pixels: &[u8]) -> Component {
    let mut component =
        Component::new(1, 1, 1, LUMA_QTABLE_INDEX).expect("1x1 sampling is always valid");
    component.dc_table = 0;
    component.ac_table = 0;
    component.block_width = options.width().div_ceil(8);
    component.block_height = options.height().div_ceil(8);
    component.samples = pad_plane(
        pixels,
        options.width(),
        options.height(),
        component.block_width * 8,
        component.block_height * 8,
    );
    component
}

fn build_ycbcr_components(
    options: &EncoderOptions,
    pixels: &[u8],
    colorspace: ColorSpace,
) -> Vec<Component> {
    let width = options.width();
    let height = options.height();
    let mut y_plane = vec![0u8; width * height];
    let mut cb_full = vec![0u8; width * height];
    let mut cr_full = vec![0u8; width * height];

    for i in 0..width * height {
        let (r, g, b) = (pixels[i * 3], pixels[i * 3 + 1], pixels[i * 3 + 2]);
        let [y, cb, cr] = if colorspace == ColorSpace::RGB {
            rgb_to_ycbcr(r, g, b)
        } else {
            [r, g, b]
        };
        y_plane[i] = y;
        cb_full[i] = cb;
        cr_full[i] = cr;
    }

    let mut y_component =
        Component::new(1, 2, 2, LUMA_QTABLE_INDEX).expect("2x2 sampling is always valid");
    y_component.dc_table = 0;
    y_component.ac_table = 0;
    y_component.block_width = width.div_ceil(8);
    y_component.block_height = height.div_ceil(8);
    y_component.samples = pad_plane(
        &y_plane,
        width,
        height,
        y_component.block_width * 8,
        y_component.block_height * 8,
    );

    let (chroma_width, chroma_height) = (width.div_ceil(2), height.div_ceil(2));
    let cb_plane = subsample_420(&cb_full, width, height);
    let cr_plane = subsample_420(&cr_full, width, height);

    let mut cb_component =
        Component::new(2, 1, 1, CHROMA_QTABLE_INDEX).expect("1x1 sampling is always valid");
    cb_component.dc_table = 1;
    cb_component.ac_table = 1;
    cb_component.block_width = chroma_width.div_ceil(8);
    cb_component.block_height = chroma_height.div_ceil(8);
    cb_component.samples = pad_plane(
        &cb_plane,
        chroma_width,
        chroma_height,
        cb_component.block_width * 8,
        cb_component.block_height * 8,
    );

    let mut cr_component =
        Component::new(3, 1, 1, CHROMA_QTABLE_INDEX).expect("1x1 sampling is always valid");
    cr_component.dc_table = 1;
    cr_component.ac_table = 1;
    cr_component.block_width = cb_component.block_width;
    cr_component.block_height = cb_component.block_height;
    cr_component.samples = pad_plane(
        &cr_plane,
        chroma_width,
        chroma_height,
        cr_component.block_width * 8,
        cr_component.block_height * 8,
    );

    vec![y_component, cb_component, cr_component]
}

/// Box-filters a full resolution plane down to 4:2:0 (half width, half
/// height, rounded up).
fn subsample_420(plane: &[u8], width: usize, height: usize) -> Vec<u8> {
    let out_width = width.div_ceil(2);
    let out_height = height.div_ceil(2);
    let mut out = vec![0u8; out_width * out_height];

    for oy in 0..out_height {
        for ox in 0..out_width {
            let x0 = ox * 2;
            let y0 = oy * 2;
            let mut sum = 0u32;
            let mut count = 0u32;
            for dy in 0..2 {
                for dx in 0..2 {
                    let x = x0 + dx;
                    let y = y0 + dy;
                    if x < width && y < height {
                        sum += u32::from(plane[y * width + x]);
                        count += 1;
                    }
                }
            }
            out[oy * out_width + ox] = (sum / count) as u8;
        }
    }
    out
}

/// Pads a plane out to a whole number of 8x8 blocks by replicating the last
/// row/column, so encoder and decoder agree on padded sample data.
fn pad_plane(
    plane: &[u8],
    width: usize,
    height: usize,
    padded_width: usize,
    padded_height: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; padded_width * padded_height];
    for y in 0..padded_height {
        let src_y = y.min(height.saturating_sub(1));
        for x in 0..padded_width {
            let src_x = x.min(width.saturating_sub(1));
            out[y * padded_width + x] = plane[src_y * width + src_x];
        }
    }
    out
}

/// Runs the forward DCT and quantizes every 8x8 block of a component's
/// (already padded) sample plane, in block-row-major order.
fn forward_blocks(component: &Component, qtable: &QTable) -> Vec<[i32; 64]> {
    let plane_width = component.block_width * 8;
    let mut blocks = Vec::with_capacity(component.block_width * component.block_height);
    for by in 0..component.block_height {
        for bx in 0..component.block_width {
            let mut samples = [0u8; 64];
            for y in 0..8 {
                let row_start = (by * 8 + y) * plane_width + bx * 8;
                samples[y * 8..y * 8 + 8]
                    .copy_from_slice(&component.samples[row_start..row_start + 8]);
            }
            let coefficients = forward_dct(&samples);
            blocks.push(qtable.quantize(&coefficients));
        }
    }
    blocks
}

/// Tallies every block in the exact order [`encode_scan`] will visit them:
/// MCU by MCU, since the DC predictor (and thus which size symbol a block
/// needs) depends on that order, not on the blocks' raster storage order.
fn build_optimized_tables(
    components: &[Component],
    quantized: &[Vec<[i32; 64]>],
    layout: &FrameLayout,
    restart_interval: u16,
) -> Result<(HuffmanTable, HuffmanTable, HuffmanTable, HuffmanTable), EncodeErrors> {
    let mut dc_luma_freq = FrequencyTable::new();
    let mut ac_luma_freq = FrequencyTable::new();
    let mut dc_chroma_freq = FrequencyTable::new();
    let mut ac_chroma_freq = FrequencyTable::new();
    let mut predictors = vec![0i32; components.len()];
    let mut mcus_since_restart = 0u16;

    let total_mcus = layout.mcus_per_row * layout.mcus_per_column;
    for mcu_index in 0..total_mcus {
        let mcu_col = mcu_index % layout.mcus_per_row;
        let mcu_row = mcu_index / layout.mcus_per_row;

        for (ci, component) in components.iter().enumerate() {
            let (dc_freq, ac_freq) = if component.dc_table == 0 {
                (&mut dc_luma_freq, &mut ac_luma_freq)
            } else {
                (&mut dc_chroma_freq, &mut ac_chroma_freq)
            };

            for v in 0..component.vertical_sampling as usize {
                for h in 0..component.horizontal_sampling as usize {
                    let block_x = mcu_col * component.horizontal_sampling as usize + h;
                    let block_y = mcu_row * component.vertical_sampling as usize + v;
                    let block = &quantized[ci][block_y * component.block_width + block_x];
                    tally_block(block, dc_freq, ac_freq, &mut predictors[ci]);
                }
            }
        }

        mcus_since_restart += 1;
        let is_last_mcu = mcu_index + 1 == total_mcus;
        if restart_interval > 0 && mcus_since_restart == restart_interval && !is_last_mcu {
            predictors.fill(0);
            mcus_since_restart = 0;
        }
    }

    let (dc_luma_bits, dc_luma_values) = dc_luma_freq.build_table();
    let (ac_luma_bits, ac_luma_values) = ac_luma_freq.build_table();
    let (dc_chroma_bits, dc_chroma_values) = dc_chroma_freq.build_table();
    let (ac_chroma_bits, ac_chroma_values) = ac_chroma_freq.build_table();

    Ok((
        HuffmanTable::build(dc_luma_bits, dc_luma_values)
            .map_err(EncodeErrors::InvalidHuffmanTable)?,
        HuffmanTable::build(ac_luma_bits, ac_luma_values)
            .map_err(EncodeErrors::InvalidHuffmanTable)?,
        HuffmanTable::build(dc_chroma_bits, dc_chroma_values)
            .map_err(EncodeErrors::InvalidHuffmanTable)?,
        HuffmanTable::build(ac_chroma_bits, ac_chroma_values)
            .map_err(EncodeErrors::InvalidHuffmanTable)?,
    ))
}

/// Mirrors [`crate::coeff::encode_block`]'s symbol choices without writing
/// any bits, so the optimizer can observe the exact symbol stream the real
/// scan will emit.
fn tally_block(
    block: &[i32; 64],
    dc_freq: &mut FrequencyTable,
    ac_freq: &mut FrequencyTable,
    predictor: &mut i32,
) {
    let mut zigzag = [0i32; 64];
    for (i, &natural_index) in UN_ZIGZAG.iter().enumerate() {
        zigzag[i] = block[natural_index];
    }

    let dc_diff = zigzag[0] - *predictor;
    *predictor = zigzag[0];
    let (dc_size, _) = magnitude_and_bits(dc_diff);
    dc_freq.bump(dc_size);

    let last_nonzero = zigzag[1..].iter().rposition(|&v| v != 0).map(|i| i + 1);
    let Some(last_nonzero) = last_nonzero else {
        ac_freq.bump(0x00); // EOB
        return;
    };

    let mut run = 0u8;
    for &value in &zigzag[1..=last_nonzero] {
        if value == 0 {
            run += 1;
            if run == 16 {
                ac_freq.bump(0xF0); // ZRL
                run = 0;
            }
            continue;
        }
        let (size, _) = magnitude_and_bits(value);
        ac_freq.bump((run << 4) | size);
        run = 0;
    }
    if last_nonzero < 63 {
        ac_freq.bump(0x00); // EOB
    }
}

fn encode_scan(
    components: &[Component],
    quantized: &[Vec<[i32; 64]>],
    layout: &FrameLayout,
    dc_tables: &[&HuffmanTable; 2],
    ac_tables: &[&HuffmanTable; 2],
    restart_interval: u16,
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut writer = BitWriter::new();
    let mut predictors = vec![0i32; components.len()];
    let mut mcus_since_restart = 0u16;
    let mut restart_index = 0u8;

    let total_mcus = layout.mcus_per_row * layout.mcus_per_column;

    for mcu_index in 0..total_mcus {
        let mcu_col = mcu_index % layout.mcus_per_row;
        let mcu_row = mcu_index / layout.mcus_per_row;

        for (ci, component) in components.iter().enumerate() {
            let dc_table = dc_tables[usize::from(component.dc_table)];
            let ac_table = ac_tables[usize::from(component.ac_table)];

            for v in 0..component.vertical_sampling as usize {
                for h in 0..component.horizontal_sampling as usize {
                    let block_x = mcu_col * component.horizontal_sampling as usize + h;
                    let block_y = mcu_row * component.vertical_sampling as usize + v;
                    let block = &quantized[ci][block_y * component.block_width + block_x];
                    encode_block(&mut writer, block, dc_table, ac_table, &mut predictors[ci]);
                }
            }
        }

        mcus_since_restart += 1;
        let is_last_mcu = mcu_index + 1 == total_mcus;
        if restart_interval > 0 && mcus_since_restart == restart_interval && !is_last_mcu {
            // restart markers are byte aligned: finish the bit writer (which
            // pads the final byte with 1 bits), append the RSTn marker, and
            // start a fresh bit writer for the next interval.
            out.extend(std::mem::take(&mut writer).finish());
            let mut marker_writer = ZByteWriter::new();
            crate::writer::write_restart_marker(&mut marker_writer, restart_index);
            out.extend(marker_writer.into_inner());
            restart_index = (restart_index + 1) % 8;
            predictors.fill(0);
            mcus_since_restart = 0;
        }
    }

    out.extend(writer.finish());
    out
}
