//! Packed-pixel codec: float RGBA pixels to and from the fixed storage
//! formats.
//!
//! 16-bit words are stored little-endian with fields packed MSB-first in
//! R, G, B, A order. Every field is rounded half up and clamped to its range.

use log::trace;
use rgb::RGBA;

use crate::canvas::{FloatCanvas, try_alloc};
use crate::container::PackedLayer;
use crate::error::TextureError;
use crate::format::{ChannelLayout, PixelFormat};
use crate::quantize::{self, Precision};

/// ITU-R BT.709 luma coefficients.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Round `v * max` half up, clamped to `0..=max`. NaN maps to 0.
pub(crate) fn to_level(v: f32, max: u32) -> u32 {
    let level = (v * max as f32 + 0.5).floor();
    if level >= max as f32 {
        max
    } else if level > 0.0 {
        level as u32
    } else {
        0
    }
}

/// BT.709 luminance of a pixel.
pub fn luminance(px: RGBA<f32>) -> f32 {
    LUMA_R * px.r + LUMA_G * px.g + LUMA_B * px.b
}

/// Pack one pixel into the first `format.bytes_per_pixel()` bytes of `out`.
///
/// A shorter `out` is a `BufferSizeMismatch`.
pub fn pack_pixel(px: RGBA<f32>, format: PixelFormat, out: &mut [u8]) -> Result<(), TextureError> {
    let bpp = check_pixel_len(format, out.len())?;
    write_pixel(px, format, &mut out[..bpp]);
    Ok(())
}

/// Unpack one pixel from the first `format.bytes_per_pixel()` bytes of
/// `src`.
///
/// A shorter `src` is a `BufferSizeMismatch`.
pub fn unpack_pixel(src: &[u8], format: PixelFormat) -> Result<RGBA<f32>, TextureError> {
    let bpp = check_pixel_len(format, src.len())?;
    Ok(read_pixel(&src[..bpp], format))
}

fn check_pixel_len(format: PixelFormat, actual: usize) -> Result<usize, TextureError> {
    let expected = format.bytes_per_pixel();
    if actual < expected {
        return Err(TextureError::BufferSizeMismatch { expected, actual });
    }
    Ok(expected)
}

/// `out` is exactly one pixel long.
fn write_pixel(px: RGBA<f32>, format: PixelFormat, out: &mut [u8]) {
    let byte = |v: f32| to_level(v, 255) as u8;
    match format {
        PixelFormat::U8(ChannelLayout::Alpha) => out[0] = byte(px.a),
        PixelFormat::U8(ChannelLayout::Luminance) => out[0] = byte(luminance(px)),
        PixelFormat::U8(ChannelLayout::LuminanceAlpha) => {
            out[0] = byte(luminance(px));
            out[1] = byte(px.a);
        }
        PixelFormat::U8(ChannelLayout::Rgb) => {
            out[0] = byte(px.r);
            out[1] = byte(px.g);
            out[2] = byte(px.b);
        }
        PixelFormat::U8(ChannelLayout::Rgba) => {
            out[0] = byte(px.r);
            out[1] = byte(px.g);
            out[2] = byte(px.b);
            out[3] = byte(px.a);
        }
        PixelFormat::Rgb565 | PixelFormat::Rgba4444 | PixelFormat::Rgba5551 => {
            out.copy_from_slice(&pack_word(px, format.channel_bits()).to_le_bytes());
        }
    }
}

/// `src` is exactly one pixel long.
fn read_pixel(src: &[u8], format: PixelFormat) -> RGBA<f32> {
    let n = |v: u8| v as f32 / 255.0;
    match format {
        PixelFormat::U8(ChannelLayout::Alpha) => RGBA::new(0.0, 0.0, 0.0, n(src[0])),
        PixelFormat::U8(ChannelLayout::Luminance) => {
            let l = n(src[0]);
            RGBA::new(l, l, l, 1.0)
        }
        PixelFormat::U8(ChannelLayout::LuminanceAlpha) => {
            let l = n(src[0]);
            RGBA::new(l, l, l, n(src[1]))
        }
        PixelFormat::U8(ChannelLayout::Rgb) => RGBA::new(n(src[0]), n(src[1]), n(src[2]), 1.0),
        PixelFormat::U8(ChannelLayout::Rgba) => {
            RGBA::new(n(src[0]), n(src[1]), n(src[2]), n(src[3]))
        }
        PixelFormat::Rgb565 | PixelFormat::Rgba4444 | PixelFormat::Rgba5551 => {
            unpack_word(u16::from_le_bytes([src[0], src[1]]), format.channel_bits())
        }
    }
}

/// OR the channel fields into one word, most significant field first.
/// Zero-width fields are skipped without reading their channel.
fn pack_word(px: RGBA<f32>, bits: [u32; 4]) -> u16 {
    let mut word = 0u16;
    let mut shift = 16;
    for (c, &b) in bits.iter().enumerate() {
        if b == 0 {
            continue;
        }
        shift -= b;
        let v = match c {
            0 => px.r,
            1 => px.g,
            2 => px.b,
            _ => px.a,
        };
        word |= (to_level(v, (1 << b) - 1) as u16) << shift;
    }
    word
}

fn unpack_word(word: u16, bits: [u32; 4]) -> RGBA<f32> {
    let mut out = [1.0f32; 4];
    let mut shift = 16;
    for (c, &b) in bits.iter().enumerate() {
        if b == 0 {
            continue;
        }
        shift -= b;
        let max = (1u32 << b) - 1;
        out[c] = ((u32::from(word) >> shift) & max) as f32 / max as f32;
    }
    RGBA::new(out[0], out[1], out[2], out[3])
}

impl PackedLayer {
    /// Pack a canvas at the format's native precision.
    pub fn pack(canvas: &FloatCanvas, format: PixelFormat, level: i32) -> Result<Self, TextureError> {
        let bpp = format.bytes_per_pixel();
        let len = canvas
            .pixel_count()
            .checked_mul(bpp)
            .ok_or(TextureError::DimensionsTooLarge {
                width: canvas.width(),
                height: canvas.height(),
            })?;
        let mut data: Vec<u8> = try_alloc(len)?;
        for (px, out) in canvas.pixels().iter().zip(data.chunks_exact_mut(bpp)) {
            write_pixel(*px, format, out);
        }
        trace!(
            "packed level {level}: {}x{} {format} ({len} bytes)",
            canvas.width(),
            canvas.height()
        );
        PackedLayer::new(level, canvas.width(), canvas.height(), format, data)
    }

    /// Reduce precision as requested, then pack.
    ///
    /// Quantization and dithering both use the step counts of `format`.
    pub fn encode(
        mut canvas: FloatCanvas,
        format: PixelFormat,
        level: i32,
        precision: Precision,
    ) -> Result<Self, TextureError> {
        let steps = quantize::QuantizeSteps::for_format(format);
        match precision {
            Precision::Native => {}
            Precision::Quantize => quantize::quantize(&mut canvas, steps),
            Precision::Dither => quantize::dither_floyd_steinberg(&mut canvas, steps),
        }
        Self::pack(&canvas, format, level)
    }
}

impl FloatCanvas {
    /// Unpack a layer into a new canvas.
    pub fn from_layer(layer: &PackedLayer) -> Result<Self, TextureError> {
        let format = layer.format();
        let bpp = format.bytes_per_pixel();
        let mut canvas = FloatCanvas::new(layer.width(), layer.height())?;
        for (dst, src) in canvas
            .pixels_mut()
            .iter_mut()
            .zip(layer.data().chunks_exact(bpp))
        {
            *dst = read_pixel(src, format);
        }
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(px: RGBA<f32>, format: PixelFormat) -> Vec<u8> {
        let mut out = vec![0u8; format.bytes_per_pixel()];
        pack_pixel(px, format, &mut out).unwrap();
        out
    }

    fn word(px: RGBA<f32>, format: PixelFormat) -> u16 {
        let b = packed(px, format);
        u16::from_le_bytes([b[0], b[1]])
    }

    #[test]
    fn rounding_is_half_up_and_clamped() {
        assert_eq!(to_level(0.0, 255), 0);
        assert_eq!(to_level(1.0, 255), 255);
        assert_eq!(to_level(1.5, 31), 31);
        assert_eq!(to_level(-0.3, 31), 0);
        assert_eq!(to_level(f32::NAN, 15), 0);
        // Exactly halfway rounds up.
        assert_eq!(to_level(0.5, 1), 1);
        assert_eq!(to_level(0.25, 2), 1);
    }

    #[test]
    fn short_buffers_are_rejected() {
        let mut out = [0u8; 1];
        assert!(matches!(
            pack_pixel(RGBA::new(1.0, 1.0, 1.0, 1.0), PixelFormat::Rgb565, &mut out),
            Err(TextureError::BufferSizeMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            unpack_pixel(&[0, 0, 0], PixelFormat::U8(ChannelLayout::Rgba)),
            Err(TextureError::BufferSizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
        assert!(matches!(
            unpack_pixel(&[], PixelFormat::U8(ChannelLayout::Alpha)),
            Err(TextureError::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn longer_buffers_use_leading_bytes() {
        let mut out = [0xAAu8; 3];
        pack_pixel(RGBA::new(1.0, 0.0, 0.0, 0.0), PixelFormat::Rgb565, &mut out).unwrap();
        assert_eq!(out, [0x00, 0xF8, 0xAA]);
        let px = unpack_pixel(&out, PixelFormat::Rgb565).unwrap();
        assert_eq!(px, RGBA::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn rgb565_extremes() {
        let white = RGBA::new(1.0, 1.0, 1.0, 0.0);
        let black = RGBA::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(word(white, PixelFormat::Rgb565), 0xFFFF);
        assert_eq!(word(black, PixelFormat::Rgb565), 0x0000);
    }

    #[test]
    fn rgb565_ignores_alpha() {
        let a = word(RGBA::new(0.3, 0.6, 0.9, 0.0), PixelFormat::Rgb565);
        let b = word(RGBA::new(0.3, 0.6, 0.9, f32::NAN), PixelFormat::Rgb565);
        assert_eq!(a, b);
        assert_eq!(unpack_pixel(&a.to_le_bytes(), PixelFormat::Rgb565).unwrap().a, 1.0);
    }

    #[test]
    fn field_positions() {
        assert_eq!(word(RGBA::new(1.0, 0.0, 0.0, 0.0), PixelFormat::Rgb565), 0xF800);
        assert_eq!(word(RGBA::new(0.0, 1.0, 0.0, 0.0), PixelFormat::Rgb565), 0x07E0);
        assert_eq!(word(RGBA::new(0.0, 0.0, 1.0, 0.0), PixelFormat::Rgb565), 0x001F);

        assert_eq!(word(RGBA::new(1.0, 0.0, 0.0, 0.0), PixelFormat::Rgba4444), 0xF000);
        assert_eq!(word(RGBA::new(0.0, 0.0, 0.0, 1.0), PixelFormat::Rgba4444), 0x000F);

        assert_eq!(word(RGBA::new(1.0, 0.0, 0.0, 0.0), PixelFormat::Rgba5551), 0xF800);
        assert_eq!(word(RGBA::new(0.0, 1.0, 0.0, 0.0), PixelFormat::Rgba5551), 0x07C0);
        assert_eq!(word(RGBA::new(0.0, 0.0, 1.0, 0.0), PixelFormat::Rgba5551), 0x003E);
        assert_eq!(word(RGBA::new(0.0, 0.0, 0.0, 1.0), PixelFormat::Rgba5551), 0x0001);
    }

    #[test]
    fn words_are_little_endian() {
        let bytes = packed(RGBA::new(1.0, 0.0, 0.0, 0.0), PixelFormat::Rgb565);
        assert_eq!(bytes, vec![0x00, 0xF8]);
    }

    #[test]
    fn byte_layouts() {
        let px = RGBA::new(1.0, 0.0, 0.0, 0.5);
        assert_eq!(packed(px, PixelFormat::U8(ChannelLayout::Alpha)), vec![128]);
        // 0.2126 * 255 + 0.5 = 54.713
        assert_eq!(packed(px, PixelFormat::U8(ChannelLayout::Luminance)), vec![54]);
        assert_eq!(
            packed(px, PixelFormat::U8(ChannelLayout::LuminanceAlpha)),
            vec![54, 128]
        );
        assert_eq!(packed(px, PixelFormat::U8(ChannelLayout::Rgb)), vec![255, 0, 0]);
        assert_eq!(
            packed(px, PixelFormat::U8(ChannelLayout::Rgba)),
            vec![255, 0, 0, 128]
        );
    }

    #[test]
    fn byte_unpack_defaults() {
        assert_eq!(
            unpack_pixel(&[255], PixelFormat::U8(ChannelLayout::Alpha)).unwrap(),
            RGBA::new(0.0, 0.0, 0.0, 1.0)
        );
        assert_eq!(
            unpack_pixel(&[0], PixelFormat::U8(ChannelLayout::Luminance)).unwrap(),
            RGBA::new(0.0, 0.0, 0.0, 1.0)
        );
        assert_eq!(
            unpack_pixel(&[255, 0], PixelFormat::U8(ChannelLayout::LuminanceAlpha)).unwrap(),
            RGBA::new(1.0, 1.0, 1.0, 0.0)
        );
        assert_eq!(
            unpack_pixel(&[0, 255, 0], PixelFormat::U8(ChannelLayout::Rgb)).unwrap(),
            RGBA::new(0.0, 1.0, 0.0, 1.0)
        );
    }

    #[test]
    fn byte_roundtrip_all_levels() {
        for layout in ChannelLayout::ALL {
            let format = PixelFormat::U8(layout);
            for k in 0..=255u32 {
                let v = k as f32 / 255.0;
                let px = RGBA::new(v, v, v, v);
                let back = unpack_pixel(&packed(px, format), format).unwrap();
                let tol = 1.0 / 255.0;
                match layout {
                    ChannelLayout::Alpha => assert!((back.a - v).abs() <= tol),
                    ChannelLayout::Luminance | ChannelLayout::Rgb => {
                        assert!((back.r - v).abs() <= tol, "{layout} level {k}");
                        assert!((back.g - v).abs() <= tol);
                        assert!((back.b - v).abs() <= tol);
                    }
                    ChannelLayout::LuminanceAlpha | ChannelLayout::Rgba => {
                        assert!((back.r - v).abs() <= tol, "{layout} level {k}");
                        assert!((back.a - v).abs() <= tol);
                    }
                }
            }
        }
    }

    #[test]
    fn sixteen_bit_roundtrip_all_levels() {
        for format in [PixelFormat::Rgb565, PixelFormat::Rgba4444, PixelFormat::Rgba5551] {
            let bits = format.channel_bits();
            let max_steps = bits.iter().map(|b| 1u32 << b).max().unwrap_or(1);
            for i in 0..max_steps {
                let mut v = [0.0f32; 4];
                for c in 0..4 {
                    if bits[c] > 0 {
                        let max = (1u32 << bits[c]) - 1;
                        v[c] = i.min(max) as f32 / max as f32;
                    }
                }
                let px = RGBA::new(v[0], v[1], v[2], v[3]);
                let back = unpack_pixel(&packed(px, format), format).unwrap();
                let back = [back.r, back.g, back.b, back.a];
                for c in 0..4 {
                    if bits[c] > 0 {
                        let tol = 1.0 / ((1u32 << bits[c]) - 1) as f32;
                        assert!((back[c] - v[c]).abs() <= tol, "{format} channel {c} step {i}");
                    }
                }
            }
        }
    }

    #[test]
    fn pack_layer_white() {
        let canvas = FloatCanvas::filled(4, 4, RGBA::new(1.0, 1.0, 1.0, 1.0)).unwrap();

        let rgb = PackedLayer::pack(&canvas, PixelFormat::U8(ChannelLayout::Rgb), 0).unwrap();
        assert_eq!(rgb.data().len(), 48);
        assert!(rgb.data().iter().all(|&b| b == 255));

        let rgb565 = PackedLayer::pack(&canvas, PixelFormat::Rgb565, 0).unwrap();
        assert_eq!(rgb565.data().len(), 32);
        assert!(
            rgb565
                .data()
                .chunks_exact(2)
                .all(|w| u16::from_le_bytes([w[0], w[1]]) == 0xFFFF)
        );
    }

    #[test]
    fn layer_unpack_matches_pixels() {
        let mut canvas = FloatCanvas::new(2, 1).unwrap();
        *canvas.pixel_mut(0, 0) = RGBA::new(1.0, 0.0, 0.0, 1.0);
        *canvas.pixel_mut(1, 0) = RGBA::new(0.0, 0.0, 1.0, 0.0);
        let layer = PackedLayer::pack(&canvas, PixelFormat::Rgba5551, 3).unwrap();
        assert_eq!(layer.level(), 3);
        let back = FloatCanvas::from_layer(&layer).unwrap();
        assert_eq!(back, canvas);
    }
}
