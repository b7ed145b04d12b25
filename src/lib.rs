//! # zentexture
//!
//! Packed-pixel texture container (`.td`) encoder and decoder.
//!
//! Images are expanded into a [`FloatCanvas`] of RGBA samples in `[0, 1]`,
//! optionally extended with a gamma-correct mip chain, reduced to the target
//! precision by quantization or Floyd–Steinberg dithering, and packed into
//! one of the GLES upload formats:
//!
//! - one byte per channel: `ALPHA`, `LUMINANCE`, `LUMINANCE_ALPHA`, `RGB`, `RGBA`
//! - 16-bit `RGB565`, `RGBA4444` and `RGBA5551` words
//!
//! The resulting layers are stored in a [`TextureContainer`], a flat
//! little-endian sequence of layer headers and pixel bytes.
//!
//! ## Non-Goals
//!
//! - GPU-compressed formats (ETC, PVRTC, ASTC, BCn)
//! - Color management beyond the fixed 2.2 gamma used for mip filtering
//! - Multi-image inputs such as cubemaps or texture arrays
//!
//! ## Usage
//!
//! ```no_run
//! use zentexture::{
//!     ChannelLayout, FloatCanvas, PackedLayer, PixelFormat, Precision, StorageType,
//!     TextureContainer, generate_mip_maps, read_image,
//! };
//!
//! let image = read_image("albedo.png")?;
//! let base = image.to_canvas()?;
//! let format = PixelFormat::new(ChannelLayout::Rgb, StorageType::UnsignedShort565);
//!
//! let mut container = TextureContainer::new();
//! container.push(PackedLayer::encode(base.clone(), format, 0, Precision::Dither)?);
//! for (level, mip) in generate_mip_maps(&base)?.into_iter().enumerate() {
//!     container.push(PackedLayer::encode(mip, format, level as i32 + 1, Precision::Dither)?);
//! }
//! container.save("albedo.td")?;
//!
//! let loaded = TextureContainer::open("albedo.td")?;
//! let first = FloatCanvas::from_layer(&loaded.layers()[0])?;
//! # let _ = first;
//! # Ok::<(), zentexture::TextureError>(())
//! ```

#![forbid(unsafe_code)]

mod canvas;
mod codec;
mod container;
mod error;
mod format;
mod image_io;
mod limits;
mod mipmap;
mod quantize;

// Re-exports
pub use canvas::FloatCanvas;
pub use codec::{luminance, pack_pixel, unpack_pixel};
pub use container::{PackedLayer, TextureContainer};
pub use error::TextureError;
pub use format::{ChannelLayout, PixelFormat, StorageType};
pub use image_io::{
    DecodedImage, ImageFileFormat, ImageLayout, decode_image, decode_image_with_format, encode_image,
    read_image, save_image,
};
pub use limits::Limits;
pub use mipmap::{generate_mip_maps, mip_chain_len};
pub use quantize::{Precision, QuantizeSteps, dither_floyd_steinberg, quantize};
pub use rgb::RGBA;
