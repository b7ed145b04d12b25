//! Pixel format descriptors.
//!
//! Numeric tags are the OpenGL ES 2.0 enumerants and are what the container
//! stores on disk. They must never be renumbered.

use core::fmt;
use core::str::FromStr;

use crate::error::TextureError;

/// Channel layout of a packed pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// Alpha only; unpacks with R=G=B=0.
    Alpha,
    /// BT.709 luminance replicated into R, G and B.
    Luminance,
    /// Luminance followed by alpha.
    LuminanceAlpha,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub const ALL: [ChannelLayout; 5] = [
        Self::Alpha,
        Self::Luminance,
        Self::LuminanceAlpha,
        Self::Rgb,
        Self::Rgba,
    ];

    /// Number of stored channels.
    pub fn channels(&self) -> usize {
        match self {
            Self::Alpha | Self::Luminance => 1,
            Self::LuminanceAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// On-disk tag.
    pub fn tag(&self) -> u32 {
        match self {
            Self::Alpha => 0x1906,
            Self::Rgb => 0x1907,
            Self::Rgba => 0x1908,
            Self::Luminance => 0x1909,
            Self::LuminanceAlpha => 0x190A,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.tag() == tag)
    }

    /// The GL enumerant name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Alpha => "ALPHA",
            Self::Luminance => "LUMINANCE",
            Self::LuminanceAlpha => "LUMINANCE_ALPHA",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown format: {s}. Valid options: ALPHA, LUMINANCE, LUMINANCE_ALPHA, RGB, RGBA"
                )
            })
    }
}

/// Storage type of a packed pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// One byte per stored channel.
    UnsignedByte,
    UnsignedShort565,
    UnsignedShort4444,
    UnsignedShort5551,
}

impl StorageType {
    pub const ALL: [StorageType; 4] = [
        Self::UnsignedByte,
        Self::UnsignedShort565,
        Self::UnsignedShort4444,
        Self::UnsignedShort5551,
    ];

    /// On-disk tag.
    pub fn tag(&self) -> u32 {
        match self {
            Self::UnsignedByte => 0x1401,
            Self::UnsignedShort4444 => 0x8033,
            Self::UnsignedShort5551 => 0x8034,
            Self::UnsignedShort565 => 0x8363,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// The GL enumerant name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnsignedByte => "UNSIGNED_BYTE",
            Self::UnsignedShort565 => "UNSIGNED_SHORT_5_6_5",
            Self::UnsignedShort4444 => "UNSIGNED_SHORT_4_4_4_4",
            Self::UnsignedShort5551 => "UNSIGNED_SHORT_5_5_5_1",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown data type: {s}. Valid options: UNSIGNED_BYTE, UNSIGNED_SHORT_4_4_4_4, UNSIGNED_SHORT_5_5_5_1, UNSIGNED_SHORT_5_6_5"
                )
            })
    }
}

/// A complete packed pixel format.
///
/// The 16-bit variants fix their own channel layout, so a layout/storage
/// pair that cannot be packed is not representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One byte per channel of the given layout.
    U8(ChannelLayout),
    /// 16-bit R5 G6 B5, no alpha.
    Rgb565,
    /// 16-bit R4 G4 B4 A4.
    Rgba4444,
    /// 16-bit R5 G5 B5 A1.
    Rgba5551,
}

impl PixelFormat {
    /// Combine a layout and a storage type. A 16-bit storage type overrides
    /// the requested layout with the one it packs.
    pub fn new(layout: ChannelLayout, storage: StorageType) -> Self {
        match storage {
            StorageType::UnsignedByte => Self::U8(layout),
            StorageType::UnsignedShort565 => Self::Rgb565,
            StorageType::UnsignedShort4444 => Self::Rgba4444,
            StorageType::UnsignedShort5551 => Self::Rgba5551,
        }
    }

    /// Parse the on-disk tag pair.
    pub fn from_tags(format_tag: u32, storage_tag: u32) -> Result<Self, TextureError> {
        let unsupported = TextureError::UnsupportedFormat {
            format_tag,
            storage_tag,
        };
        let (Some(layout), Some(storage)) = (
            ChannelLayout::from_tag(format_tag),
            StorageType::from_tag(storage_tag),
        ) else {
            return Err(unsupported);
        };
        let format = Self::new(layout, storage);
        if format.layout() != layout {
            return Err(unsupported);
        }
        Ok(format)
    }

    pub fn layout(&self) -> ChannelLayout {
        match self {
            Self::U8(layout) => *layout,
            Self::Rgb565 => ChannelLayout::Rgb,
            Self::Rgba4444 | Self::Rgba5551 => ChannelLayout::Rgba,
        }
    }

    pub fn storage(&self) -> StorageType {
        match self {
            Self::U8(_) => StorageType::UnsignedByte,
            Self::Rgb565 => StorageType::UnsignedShort565,
            Self::Rgba4444 => StorageType::UnsignedShort4444,
            Self::Rgba5551 => StorageType::UnsignedShort5551,
        }
    }

    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::U8(layout) => layout.channels(),
            Self::Rgb565 | Self::Rgba4444 | Self::Rgba5551 => 2,
        }
    }

    /// Bit width of the R, G, B and A fields, in that order. Zero marks a
    /// channel the format does not store.
    ///
    /// Byte formats report 8 for every channel, since each byte is produced
    /// from full 8-bit precision even when channels are folded into luminance.
    pub fn channel_bits(&self) -> [u32; 4] {
        match self {
            Self::U8(_) => [8, 8, 8, 8],
            Self::Rgb565 => [5, 6, 5, 0],
            Self::Rgba4444 => [4, 4, 4, 4],
            Self::Rgba5551 => [5, 5, 5, 1],
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layout(), self.storage())
    }
}
