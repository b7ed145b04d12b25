//! Precision reduction: level quantization and Floyd–Steinberg error
//! diffusion.
//!
//! Both passes work on per-channel step counts. A step count below 2 marks a
//! channel the target format does not store; such channels are left alone.

use crate::canvas::FloatCanvas;
use crate::codec::to_level;
use crate::format::PixelFormat;

/// How a canvas is brought down to the target format's precision before
/// packing. Dithering and quantization are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    /// Pack directly; rounding happens in the packer.
    Native,
    /// Snap every sample to its channel's levels first.
    Quantize,
    /// Diffuse the rounding error of each sample into its unvisited
    /// neighbors; the packer then rounds the biased values.
    #[default]
    Dither,
}

/// Number of distinct levels per channel, in R, G, B, A order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantizeSteps(pub [u32; 4]);

impl QuantizeSteps {
    /// `2^bits` for every stored channel of `format`; 0 for absent ones.
    pub fn for_format(format: PixelFormat) -> Self {
        Self(format.channel_bits().map(|b| if b == 0 { 0 } else { 1 << b }))
    }

    /// Highest level index of channel `c`, or `None` if the channel is not
    /// quantized.
    fn max_level(&self, c: usize) -> Option<u32> {
        let steps = self.0[c];
        (steps >= 2).then(|| steps - 1)
    }
}

/// Snap every sample to the nearest of its channel's evenly spaced levels in
/// `[0, 1]`.
pub fn quantize(canvas: &mut FloatCanvas, steps: QuantizeSteps) {
    let max = [0, 1, 2, 3].map(|c| steps.max_level(c));
    for px in canvas.data_mut().chunks_exact_mut(4) {
        for (v, max) in px.iter_mut().zip(max) {
            if let Some(max) = max {
                *v = to_level(*v, max) as f32 / max as f32;
            }
        }
    }
}

/// Floyd–Steinberg error diffusion for a hypothetical quantization to
/// `steps`.
///
/// Pixels are visited left to right, top to bottom. Each visited sample is
/// left untouched; its residual against the nearest level is added to the
/// unvisited neighbors with weights 7/16 east, 3/16 southwest, 5/16 south
/// and 1/16 southeast. Results depend on this order, since each pixel's
/// residual includes the error it received. Contributions that would fall
/// outside the canvas are dropped.
pub fn dither_floyd_steinberg(canvas: &mut FloatCanvas, steps: QuantizeSteps) {
    let w = canvas.width() as usize;
    let h = canvas.height() as usize;
    let max = [0, 1, 2, 3].map(|c| steps.max_level(c));
    let data = canvas.data_mut();
    for y in 0..h {
        for x in 0..w {
            for (c, max) in max.iter().enumerate() {
                let Some(max) = *max else { continue };
                let v = data[(y * w + x) * 4 + c];
                let residual = v - to_level(v, max) as f32 / max as f32;
                diffuse_error(data, w, h, x, y, c, residual);
            }
        }
    }
}

/// Spread `error` from `(x, y)` channel `c` onto its unvisited neighbors.
fn diffuse_error(data: &mut [f32], w: usize, h: usize, x: usize, y: usize, c: usize, error: f32) {
    let mut add = |nx: usize, ny: usize, weight: f32| {
        data[(ny * w + nx) * 4 + c] += error * weight;
    };
    if x + 1 < w {
        add(x + 1, y, 7.0 / 16.0);
    }
    if y + 1 < h {
        if x > 0 {
            add(x - 1, y + 1, 3.0 / 16.0);
        }
        add(x, y + 1, 5.0 / 16.0);
        if x + 1 < w {
            add(x + 1, y + 1, 1.0 / 16.0);
        }
    }
}
