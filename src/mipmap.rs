//! Gamma-correct mip chain generation.
//!
//! Filtering happens in linear light: samples are decoded with `v^2.2`,
//! each level is resampled from the previous linear level with a triangle
//! filter (clamp-to-edge), and re-encoded with `v^(1/2.2)`.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use log::debug;

use crate::canvas::FloatCanvas;
use crate::error::TextureError;

const GAMMA: f32 = 2.2;

type LinearImage = ImageBuffer<Rgba<f32>, Vec<f32>>;

/// Number of levels [`generate_mip_maps`] returns for a base of this size.
pub fn mip_chain_len(width: u32, height: u32) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    let largest = width.max(height);
    (u32::BITS - 1 - largest.leading_zeros()) as usize
}

/// Dimensions of the level below `(width, height)`.
fn half(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Generate every downsampled level of `base`, largest first, ending at 1×1.
///
/// The base level itself is not included: a 256×256 input yields 8 levels
/// (128×128 through 1×1) and a 1×1 input yields none. Callers building a
/// full chain place `base` in front, untouched by the gamma round-trip.
pub fn generate_mip_maps(base: &FloatCanvas) -> Result<Vec<FloatCanvas>, TextureError> {
    let (mut w, mut h) = (base.width(), base.height());
    if w == 0 || h == 0 {
        return Err(TextureError::EmptyCanvas);
    }

    let linear: Vec<f32> = base.data().iter().map(|&v| to_linear(v)).collect();
    let mut linear = LinearImage::from_raw(w, h, linear).ok_or(TextureError::BufferSizeMismatch {
        expected: base.pixel_count() * 4,
        actual: base.data().len(),
    })?;

    let mut levels = Vec::with_capacity(mip_chain_len(w, h));
    while w > 1 || h > 1 {
        (w, h) = half(w, h);
        linear = imageops::resize(&linear, w, h, FilterType::Triangle);
        let encoded: Vec<f32> = linear.as_raw().iter().map(|&v| to_display(v)).collect();
        debug!("mip level {}: {w}x{h}", levels.len() + 1);
        levels.push(FloatCanvas::from_raw(w, h, encoded)?);
    }
    Ok(levels)
}

fn to_linear(v: f32) -> f32 {
    v.max(0.0).powf(GAMMA)
}

fn to_display(v: f32) -> f32 {
    v.max(0.0).powf(1.0 / GAMMA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgb::RGBA;

    #[test]
    fn chain_length() {
        assert_eq!(mip_chain_len(256, 256), 8);
        assert_eq!(mip_chain_len(1, 1), 0);
        assert_eq!(mip_chain_len(5, 3), 2);
        assert_eq!(mip_chain_len(8, 1), 3);
        assert_eq!(mip_chain_len(0, 4), 0);
    }

    #[test_log::test]
    fn square_chain_halves_to_one() {
        let base = FloatCanvas::filled(256, 256, RGBA::new(0.5, 0.5, 0.5, 1.0)).unwrap();
        let chain = generate_mip_maps(&base).unwrap();
        assert_eq!(chain.len(), 8);
        let mut expected = 256;
        for level in &chain {
            expected /= 2;
            assert_eq!((level.width(), level.height()), (expected, expected));
        }
        let last = chain.last().unwrap();
        assert_eq!((last.width(), last.height()), (1, 1));
    }

    #[test]
    fn non_square_clamps_at_one() {
        let base = FloatCanvas::new(8, 2).unwrap();
        let dims: Vec<(u32, u32)> = generate_mip_maps(&base)
            .unwrap()
            .iter()
            .map(|l| (l.width(), l.height()))
            .collect();
        assert_eq!(dims, vec![(4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn single_pixel_has_no_levels() {
        let base = FloatCanvas::filled(1, 1, RGBA::new(1.0, 0.0, 0.0, 1.0)).unwrap();
        assert!(generate_mip_maps(&base).unwrap().is_empty());
    }

    #[test]
    fn empty_input_fails() {
        let base = FloatCanvas::new(0, 0).unwrap();
        assert!(matches!(
            generate_mip_maps(&base),
            Err(TextureError::EmptyCanvas)
        ));
        let base = FloatCanvas::new(4, 0).unwrap();
        assert!(matches!(
            generate_mip_maps(&base),
            Err(TextureError::EmptyCanvas)
        ));
    }

    #[test]
    fn flat_color_is_preserved() {
        let base = FloatCanvas::filled(16, 16, RGBA::new(0.25, 0.5, 0.75, 1.0)).unwrap();
        for level in generate_mip_maps(&base).unwrap() {
            for px in level.pixels() {
                assert!((px.r - 0.25).abs() < 1e-3);
                assert!((px.g - 0.5).abs() < 1e-3);
                assert!((px.b - 0.75).abs() < 1e-3);
                assert!((px.a - 1.0).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn averaging_happens_in_linear_light() {
        // Black/white columns average to 0.5 linear, i.e. ~0.73 in display space.
        let mut base = FloatCanvas::new(2, 1).unwrap();
        *base.pixel_mut(0, 0) = RGBA::new(0.0, 0.0, 0.0, 1.0);
        *base.pixel_mut(1, 0) = RGBA::new(1.0, 1.0, 1.0, 1.0);
        let chain = generate_mip_maps(&base).unwrap();
        assert_eq!(chain.len(), 1);
        let px = chain[0].pixel(0, 0);
        let expected = 0.5f32.powf(1.0 / 2.2);
        assert!((px.r - expected).abs() < 0.02, "got {}", px.r);
    }
}
