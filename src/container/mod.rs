//! Texture container (`.td`): an ordered list of packed layers.
//!
//! Binary layout, little-endian, no padding, no magic:
//!
//! ```text
//! container := layer_count:u32, layer[layer_count]
//! layer     := level:i32, width:i32, height:i32,
//!              format_tag:u32, storage_tag:u32,
//!              pixel_bytes[width * height * bytes_per_pixel]
//! ```

mod read;
mod write;

use std::io::{BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::error::TextureError;
use crate::format::PixelFormat;
use crate::limits::Limits;

/// Size of a serialized layer header.
pub(crate) const LAYER_HEADER_LEN: usize = 20;

/// One packed image: a mip level, or the only level of a plain texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedLayer {
    level: i32,
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PackedLayer {
    /// Wrap a packed buffer. `data` must be exactly
    /// `width * height * format.bytes_per_pixel()` bytes, and both dimensions
    /// must fit the container's signed 32-bit fields.
    pub fn new(
        level: i32,
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, TextureError> {
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(TextureError::DimensionsTooLarge { width, height });
        }
        let expected = Self::byte_len(width, height, format)?;
        if data.len() != expected {
            return Err(TextureError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            level,
            width,
            height,
            format,
            data,
        })
    }

    /// Buffer size for a layer of these dimensions and format.
    pub fn byte_len(width: u32, height: u32, format: PixelFormat) -> Result<usize, TextureError> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(format.bytes_per_pixel()))
            .ok_or(TextureError::DimensionsTooLarge { width, height })
    }

    /// Opaque level tag, conventionally the mip level.
    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn set_level(&mut self, level: i32) {
        self.level = level;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Packed pixel bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// An ordered sequence of packed layers. Zero layers is a valid (empty)
/// texture.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureContainer {
    layers: Vec<PackedLayer>,
}

impl TextureContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(layers: Vec<PackedLayer>) -> Self {
        Self { layers }
    }

    pub fn push(&mut self, layer: PackedLayer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[PackedLayer] {
        &self.layers
    }

    pub fn into_layers(self) -> Vec<PackedLayer> {
        self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, PackedLayer> {
        self.layers.iter()
    }

    /// Total serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        4 + self
            .layers
            .iter()
            .map(|l| LAYER_HEADER_LEN + l.data.len())
            .sum::<usize>()
    }

    /// Parse a complete container. Trailing bytes are an error.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TextureError> {
        read::read_container(data, None)
    }

    /// Parse a complete container, enforcing resource limits.
    pub fn from_bytes_with_limits(data: &[u8], limits: &Limits) -> Result<Self, TextureError> {
        read::read_container(data, Some(limits))
    }

    /// Read one container from a stream. Bytes after it are left unread.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, TextureError> {
        read::read_container_stream(reader, None)
    }

    /// Read one container from a stream, enforcing resource limits.
    pub fn read_from_with_limits<R: Read>(
        reader: R,
        limits: &Limits,
    ) -> Result<Self, TextureError> {
        read::read_container_stream(reader, Some(limits))
    }

    /// Load a `.td` file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        debug!("read {} bytes from {}", data.len(), path.display());
        Self::from_bytes(&data)
    }

    /// Serialize to a new buffer. Fails only when the layer count does not
    /// fit the 32-bit count field.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TextureError> {
        write::encode_container(self)
    }

    /// Serialize into a writer.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), TextureError> {
        write::write_container(self, writer)
    }

    /// Write a `.td` file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TextureError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!("wrote {} layers to {}", self.len(), path.display());
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TextureContainer {
    type Item = &'a PackedLayer;
    type IntoIter = core::slice::Iter<'a, PackedLayer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

impl IntoIterator for TextureContainer {
    type Item = PackedLayer;
    type IntoIter = std::vec::IntoIter<PackedLayer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.into_iter()
    }
}

impl FromIterator<PackedLayer> for TextureContainer {
    fn from_iter<I: IntoIterator<Item = PackedLayer>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}
