//! Four-channel float image, the intermediate every conversion goes through.

use rgb::AsPixels as _;
use rgb::RGBA;

use crate::codec::to_level;
use crate::error::TextureError;

/// An owned RGBA `f32` image, row-major, normalized to `[0, 1]`.
///
/// Values may leave that range while error diffusion is in progress; the
/// packer clamps them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FloatCanvas {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl FloatCanvas {
    /// A zero-filled canvas.
    pub fn new(width: u32, height: u32) -> Result<Self, TextureError> {
        let len = sample_count(width, height)?;
        Ok(Self {
            width,
            height,
            data: try_alloc(len)?,
        })
    }

    /// A canvas with every pixel set to `fill`.
    pub fn filled(width: u32, height: u32, fill: RGBA<f32>) -> Result<Self, TextureError> {
        let mut canvas = Self::new(width, height)?;
        canvas.pixels_mut().fill(fill);
        Ok(canvas)
    }

    /// Wrap an existing `width * height * 4` sample buffer.
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Result<Self, TextureError> {
        let expected = sample_count(width, height)?;
        if data.len() != expected {
            return Err(TextureError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a canvas from 8-bit interleaved pixels with 1 to 4 channels.
    ///
    /// One channel is luminance, two are luminance + alpha, three are RGB and
    /// four are RGBA. Missing alpha is opaque.
    pub fn from_interleaved(
        width: u32,
        height: u32,
        channels: usize,
        pixels: &[u8],
    ) -> Result<Self, TextureError> {
        if !(1..=4).contains(&channels) {
            return Err(TextureError::InvalidChannelCount(channels));
        }
        let mut canvas = Self::new(width, height)?;
        let expected = canvas.pixel_count() * channels;
        if pixels.len() < expected {
            return Err(TextureError::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let n = |v: u8| v as f32 / 255.0;
        for (dst, src) in canvas
            .pixels_mut()
            .iter_mut()
            .zip(pixels[..expected].chunks_exact(channels))
        {
            *dst = match *src {
                [l] => RGBA::new(n(l), n(l), n(l), 1.0),
                [l, a] => RGBA::new(n(l), n(l), n(l), n(a)),
                [r, g, b] => RGBA::new(n(r), n(g), n(b), 1.0),
                [r, g, b, a] => RGBA::new(n(r), n(g), n(b), n(a)),
                _ => unreachable!("chunks_exact yields {channels}-sample chunks"),
            };
        }
        Ok(canvas)
    }

    /// Export as 8-bit RGBA, rounding half up and clamping each sample.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data.iter().map(|&v| to_level(v, 255) as u8).collect()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw samples, R,G,B,A per pixel.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<f32> {
        self.data
    }

    pub fn pixels(&self) -> &[RGBA<f32>] {
        self.data.as_pixels()
    }

    pub fn pixels_mut(&mut self) -> &mut [RGBA<f32>] {
        self.data.as_pixels_mut()
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> RGBA<f32> {
        self.pixels()[self.index(x, y)]
    }

    /// Mutable pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut RGBA<f32> {
        let idx = self.index(x, y);
        &mut self.pixels_mut()[idx]
    }

    /// Reallocate for new dimensions. Contents are reset to zero.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        let len = sample_count(width, height)?;
        self.data = try_alloc(len)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Borrow as an [`imgref::ImgRef`] of RGBA pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> imgref::ImgRef<'_, RGBA<f32>> {
        imgref::ImgRef::new(self.pixels(), self.width as usize, self.height as usize)
    }

    /// Copy an [`imgref::ImgRef`] of RGBA pixels into a new canvas.
    #[cfg(feature = "imgref")]
    pub fn from_imgref(img: imgref::ImgRef<'_, RGBA<f32>>) -> Result<Self, TextureError> {
        let mut canvas = Self::new(img.width() as u32, img.height() as u32)?;
        for (dst, src) in canvas.pixels_mut().iter_mut().zip(img.pixels()) {
            *dst = src;
        }
        Ok(canvas)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} canvas",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

/// `width * height * 4`, or `DimensionsTooLarge` on overflow.
fn sample_count(width: u32, height: u32) -> Result<usize, TextureError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4))
        .ok_or(TextureError::DimensionsTooLarge { width, height })
}

/// Allocate a zeroed buffer, surfacing allocation failure as an error.
pub(crate) fn try_alloc<T: Clone + Default>(len: usize) -> Result<Vec<T>, TextureError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| TextureError::OutOfMemory {
            bytes: len.saturating_mul(size_of::<T>()),
        })?;
    buf.resize(len, T::default());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canvas_is_valid() {
        let c = FloatCanvas::new(0, 0).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.data().len(), 0);
        assert!(c.to_rgba8().is_empty());
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(FloatCanvas::from_raw(2, 2, vec![0.0; 16]).is_ok());
        assert!(matches!(
            FloatCanvas::from_raw(2, 2, vec![0.0; 15]),
            Err(TextureError::BufferSizeMismatch {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn interleaved_channel_expansion() {
        let gray = FloatCanvas::from_interleaved(1, 1, 1, &[255]).unwrap();
        assert_eq!(gray.pixel(0, 0), RGBA::new(1.0, 1.0, 1.0, 1.0));

        let gray_alpha = FloatCanvas::from_interleaved(1, 1, 2, &[0, 255]).unwrap();
        assert_eq!(gray_alpha.pixel(0, 0), RGBA::new(0.0, 0.0, 0.0, 1.0));

        let rgb = FloatCanvas::from_interleaved(1, 1, 3, &[255, 0, 255]).unwrap();
        assert_eq!(rgb.pixel(0, 0), RGBA::new(1.0, 0.0, 1.0, 1.0));

        let rgba = FloatCanvas::from_interleaved(1, 1, 4, &[0, 255, 0, 0]).unwrap();
        assert_eq!(rgba.pixel(0, 0), RGBA::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn interleaved_rejects_bad_input() {
        assert!(matches!(
            FloatCanvas::from_interleaved(1, 1, 5, &[0; 5]),
            Err(TextureError::InvalidChannelCount(5))
        ));
        assert!(matches!(
            FloatCanvas::from_interleaved(2, 2, 3, &[0; 11]),
            Err(TextureError::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn rgba8_export_rounds_and_clamps() {
        let data = vec![0.5, -0.25, 1.75, 1.0 / 255.0];
        let c = FloatCanvas::from_raw(1, 1, data).unwrap();
        assert_eq!(c.to_rgba8(), vec![128, 0, 255, 1]);
    }

    #[test]
    fn interleaved_rgba8_roundtrip() {
        let src: Vec<u8> = (0..=255u8).collect();
        let c = FloatCanvas::from_interleaved(8, 8, 4, &src).unwrap();
        assert_eq!(c.to_rgba8(), src);
    }

    #[test]
    fn resize_reallocates_and_zeroes() {
        let mut c = FloatCanvas::filled(2, 2, RGBA::new(1.0, 1.0, 1.0, 1.0)).unwrap();
        c.resize(3, 1).unwrap();
        assert_eq!((c.width(), c.height()), (3, 1));
        assert_eq!(c.data(), &[0.0; 12][..]);
    }

    #[test]
    fn clone_is_deep() {
        let a = FloatCanvas::filled(1, 1, RGBA::new(0.5, 0.5, 0.5, 1.0)).unwrap();
        let mut b = a.clone();
        b.pixel_mut(0, 0).r = 0.0;
        assert_eq!(a.pixel(0, 0).r, 0.5);
    }
}
