//! Image file decode/encode glue around the `image` crate.
//!
//! Decoding accepts PNG, JPEG, BMP and TGA and always yields 8 bits per
//! channel. TGA is recognized by extension or an explicit format only. Encoding writes 8-bit RGBA as PNG, BMP or TGA, chosen by file
//! extension.

use std::io::Cursor;
use std::path::Path;

use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use log::debug;

use crate::canvas::FloatCanvas;
use crate::error::TextureError;

/// Interleaved 8-bit pixel layout of a decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageLayout {
    /// Single channel grayscale.
    Gray8,
    /// Grayscale followed by alpha.
    GrayAlpha8,
    Rgb8,
    Rgba8,
}

impl ImageLayout {
    /// Number of channels, which is also bytes per pixel.
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::GrayAlpha8 => 2,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// A decoded image, row-major, channel-interleaved, one byte per channel.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub layout: ImageLayout,
}

impl DecodedImage {
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Expand into a float canvas.
    pub fn to_canvas(&self) -> Result<FloatCanvas, TextureError> {
        FloatCanvas::from_interleaved(self.width, self.height, self.layout.channels(), &self.pixels)
    }
}

/// Decode PNG/JPEG/BMP bytes, keeping the source's channel count.
///
/// The format is sniffed from the data. TGA has no signature; use
/// [`decode_image_with_format`] for it.
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, TextureError> {
    Ok(DecodedImage::from_dynamic(image::load_from_memory(data)?))
}

/// Decode bytes known to be in `format`.
pub fn decode_image_with_format(
    data: &[u8],
    format: ImageFileFormat,
) -> Result<DecodedImage, TextureError> {
    let img = image::load_from_memory_with_format(data, format.image_format())?;
    Ok(DecodedImage::from_dynamic(img))
}

/// Read and decode an image file.
///
/// The extension picks the decoder; files without a recognized extension
/// are sniffed.
pub fn read_image(path: impl AsRef<Path>) -> Result<DecodedImage, TextureError> {
    let reader = ImageReader::open(path)?;
    let reader = if reader.format().is_some() {
        reader
    } else {
        reader.with_guessed_format()?
    };
    Ok(DecodedImage::from_dynamic(reader.decode()?))
}

impl DecodedImage {
    fn from_dynamic(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let (layout, pixels) = match img.color().channel_count() {
            1 => (ImageLayout::Gray8, img.into_luma8().into_raw()),
            2 => (ImageLayout::GrayAlpha8, img.into_luma_alpha8().into_raw()),
            3 => (ImageLayout::Rgb8, img.into_rgb8().into_raw()),
            _ => (ImageLayout::Rgba8, img.into_rgba8().into_raw()),
        };
        debug!("decoded {width}x{height} image as {layout:?}");
        Self {
            pixels,
            width,
            height,
            layout,
        }
    }
}

/// Image file formats the encoder can write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFileFormat {
    Png,
    Bmp,
    Tga,
}

impl ImageFileFormat {
    /// Pick a format from a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tga" => Some(Self::Tga),
            _ => None,
        }
    }

    /// Pick a format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| TextureError::UnsupportedImageFormat(path.display().to_string()))
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tga => ImageFormat::Tga,
        }
    }
}

/// Encode 8-bit RGBA pixels.
pub fn encode_image(
    format: ImageFileFormat,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, TextureError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4))
        .ok_or(TextureError::DimensionsTooLarge { width, height })?;
    if rgba.len() != expected {
        return Err(TextureError::BufferSizeMismatch {
            expected,
            actual: rgba.len(),
        });
    }
    let mut out = Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut out,
        rgba,
        width,
        height,
        ColorType::Rgba8,
        format.image_format(),
    )?;
    Ok(out.into_inner())
}

/// Encode 8-bit RGBA pixels to a file, choosing the format by extension.
pub fn save_image(
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<(), TextureError> {
    let path = path.as_ref();
    let format = ImageFileFormat::from_path(path)?;
    let bytes = encode_image(format, width, height, rgba)?;
    std::fs::write(path, bytes)?;
    debug!("wrote {width}x{height} {format:?} to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_dispatch() {
        assert_eq!(
            ImageFileFormat::from_path("out/level_0.PNG").unwrap(),
            ImageFileFormat::Png
        );
        assert_eq!(
            ImageFileFormat::from_path("a.tga").unwrap(),
            ImageFileFormat::Tga
        );
        assert!(matches!(
            ImageFileFormat::from_path("a.jpg"),
            Err(TextureError::UnsupportedImageFormat(_))
        ));
        assert!(ImageFileFormat::from_path("noext").is_err());
    }

    #[test]
    fn png_roundtrip_keeps_rgba() {
        let rgba: Vec<u8> = (0..3 * 2 * 4).map(|i| (i * 10) as u8).collect();
        let png = encode_image(ImageFileFormat::Png, 3, 2, &rgba).unwrap();
        let decoded = decode_image(&png).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.layout, ImageLayout::Rgba8);
        assert_eq!(decoded.pixels(), &rgba[..]);
    }

    #[test]
    fn tga_decodes_with_explicit_format() {
        let rgba: Vec<u8> = (0..4 * 3 * 4).map(|i| (i * 5) as u8).collect();
        let tga = encode_image(ImageFileFormat::Tga, 4, 3, &rgba).unwrap();
        let decoded = decode_image_with_format(&tga, ImageFileFormat::Tga).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 3));
        assert_eq!(decoded.to_canvas().unwrap().to_rgba8(), rgba);
    }

    #[test]
    fn tga_file_is_read_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer_1.tga");
        let rgba = vec![10, 20, 30, 255, 40, 50, 60, 128];
        save_image(&path, 2, 1, &rgba).unwrap();
        let decoded = read_image(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 1));
        assert_eq!(decoded.to_canvas().unwrap().to_rgba8(), rgba);
    }

    #[test]
    fn unknown_extension_falls_back_to_sniffing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picture.img");
        let rgba = vec![1, 2, 3, 4];
        std::fs::write(&path, encode_image(ImageFileFormat::Png, 1, 1, &rgba).unwrap()).unwrap();
        assert_eq!(read_image(&path).unwrap().pixels(), &rgba[..]);
    }

    #[test]
    fn encode_checks_buffer_size() {
        assert!(matches!(
            encode_image(ImageFileFormat::Bmp, 2, 2, &[0; 15]),
            Err(TextureError::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(TextureError::Image(_))
        ));
    }
}
