//! Per-component frame state: sampling factors, table assignments and the
//! sample buffer each component decodes (or encodes) into.
//!
//! Layout follows ITU-T T.81 section A.2: an MCU is a grid of
//! `h_max x v_max` blocks from the component with the largest sampling
//! factor, and `component.h / h_max` by `component.v / v_max` blocks from
//! every other component.

use crate::errors::DecodeErrors;

#[derive(Copy, Clone, Debug)]
pub struct ComponentId(pub u8);

/// One image component (e.g. Y, Cb, Cr) as declared in the frame header.
#[derive(Clone)]
pub struct Component {
    pub id: ComponentId,
    pub horizontal_sampling: u8,
    pub vertical_sampling: u8,
    pub quantization_table: u8,
    pub dc_table: u8,
    pub ac_table: u8,

    /// Width/height of this component's sample plane, in pixels, after
    /// rounding up to a whole number of 8x8 blocks.
    pub block_width: usize,
    pub block_height: usize,

    /// DC coefficient predictor, reset to 0 at the start of each scan and
    /// at every restart marker (section F.2.1.3.1).
    pub dc_predictor: i32,

    /// Decoded (or, on the encode side, source) sample plane, row-major,
    /// `block_width * 8` samples wide.
    pub samples: Vec<u8>,
}

impl Component {
    pub fn new(
        id: u8,
        horizontal_sampling: u8,
        vertical_sampling: u8,
        quantization_table: u8,
    ) -> Result<Self, DecodeErrors> {
        if horizontal_sampling == 0
            || horizontal_sampling > 4
            || vertical_sampling == 0
            || vertical_sampling > 4
        {
            return Err(DecodeErrors::InvalidParameter(format!(
                "component {id} has invalid sampling factor {horizontal_sampling}x{vertical_sampling}"
            )));
        }

        Ok(Self {
            id: ComponentId(id),
            horizontal_sampling,
            vertical_sampling,
            quantization_table,
            dc_table: 0,
            ac_table: 0,
            block_width: 0,
            block_height: 0,
            dc_predictor: 0,
            samples: Vec::new(),
        })
    }
}

/// Sampling-factor aware MCU layout for a whole frame.
pub struct FrameLayout {
    pub h_max: u8,
    pub v_max: u8,
    pub mcus_per_row: usize,
    pub mcus_per_column: usize,
}

impl FrameLayout {
    pub fn new(image_width: usize, image_height: usize, components: &[Component]) -> Self {
        let h_max = components
            .iter()
            .map(|c| c.horizontal_sampling)
            .max()
            .unwrap_or(1);
        let v_max = components
            .iter()
            .map(|c| c.vertical_sampling)
            .max()
            .unwrap_or(1);

        let mcu_width = 8 * h_max as usize;
        let mcu_height = 8 * v_max as usize;

        let mcus_per_row = image_width.div_ceil(mcu_width);
        let mcus_per_column = image_height.div_ceil(mcu_height);

        Self {
            h_max,
            v_max,
            mcus_per_row,
            mcus_per_column,
        }
    }

    /// Allocates each component's sample plane to cover every MCU, rounded
    /// up to whole 8x8 blocks, per section A.2.4.
    pub fn allocate(&self, components: &mut [Component]) {
        for component in components.iter_mut() {
            let blocks_per_mcu_width = component.horizontal_sampling as usize;
            let blocks_per_mcu_height = component.vertical_sampling as usize;

            component.block_width = self.mcus_per_row * blocks_per_mcu_width;
            component.block_height = self.mcus_per_column * blocks_per_mcu_height;
            component.samples = vec![0u8; component.block_width * 8 * component.block_height * 8];
        }
    }
}

/// Nearest-neighbour upsamples a subsampled component plane up to the
/// frame's full MCU grid resolution (`h_max`/`v_max` on all components).
pub fn upsample_nearest(
    component: &Component,
    h_max: u8,
    v_max: u8,
    out_width: usize,
    out_height: usize,
) -> Vec<u8> {
    let h_scale = h_max / component.horizontal_sampling;
    let v_scale = v_max / component.vertical_sampling;

    let src_width = component.block_width * 8;
    let mut out = vec![0u8; out_width * out_height];
    for y in 0..out_height {
        let src_y = (y / v_scale as usize).min(component.block_height * 8 - 1);
        for x in 0..out_width {
            let src_x = (x / h_scale as usize).min(src_width - 1);
            out[y * out_width + x] = component.samples[src_y * src_width + src_x];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_mcu_layout_for_non_subsampled_image() {
        let components = vec![
            Component::new(1, 1, 1, 0).unwrap(),
            Component::new(2, 1, 1, 1).unwrap(),
            Component::new(3, 1, 1, 1).unwrap(),
        ];
        let layout = FrameLayout::new(8, 8, &components);
        assert_eq!(layout.mcus_per_row, 1);
        assert_eq!(layout.mcus_per_column, 1);
    }

    #[test]
    fn four_two_zero_subsampling_uses_one_mcu_for_a_16x16_image() {
        let components = vec![
            Component::new(1, 2, 2, 0).unwrap(),
            Component::new(2, 1, 1, 1).unwrap(),
            Component::new(3, 1, 1, 1).unwrap(),
        ];
        let layout = FrameLayout::new(16, 16, &components);
        assert_eq!(layout.mcus_per_row, 1);
        assert_eq!(layout.mcus_per_column, 1);
        assert_eq!(layout.h_max, 2);
        assert_eq!(layout.v_max, 2);
    }
}
