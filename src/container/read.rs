//! Container parsing.
//!
//! Every size is validated before anything is allocated: slice reads check
//! the remaining input, stream reads grow their buffer only as bytes arrive.

use std::io::{self, Read};

use log::{debug, trace};

use super::{LAYER_HEADER_LEN, PackedLayer, TextureContainer};
use crate::error::TextureError;
use crate::format::PixelFormat;
use crate::limits::Limits;

/// Parsed and validated layer header.
struct LayerHeader {
    level: i32,
    width: u32,
    height: u32,
    format: PixelFormat,
    /// Pixel bytes that follow the header.
    byte_len: usize,
}

fn le_i32(b: &[u8]) -> i32 {
    i32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn dimension(name: &str, value: i32) -> Result<u32, TextureError> {
    u32::try_from(value)
        .map_err(|_| TextureError::CorruptContainer(format!("negative layer {name} {value}")))
}

fn parse_layer_header(
    header: &[u8; LAYER_HEADER_LEN],
    limits: Option<&Limits>,
) -> Result<LayerHeader, TextureError> {
    let level = le_i32(&header[0..4]);
    let width = dimension("width", le_i32(&header[4..8]))?;
    let height = dimension("height", le_i32(&header[8..12]))?;
    let format = PixelFormat::from_tags(le_u32(&header[12..16]), le_u32(&header[16..20]))?;

    if let Some(limits) = limits {
        limits.check(width, height)?;
    }
    let byte_len = PackedLayer::byte_len(width, height, format)?;
    if let Some(limits) = limits {
        limits.check_memory(byte_len)?;
    }
    Ok(LayerHeader {
        level,
        width,
        height,
        format,
        byte_len,
    })
}

fn check_layer_count(count: u32, limits: Option<&Limits>) -> Result<(), TextureError> {
    if let Some(limits) = limits {
        limits.check_layers(count)?;
    }
    Ok(())
}

// ── Slice reader ────────────────────────────────────────────────────

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], TextureError> {
        let end = self.pos.checked_add(n).ok_or(TextureError::UnexpectedEof)?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(TextureError::UnexpectedEof)?;
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<&'a [u8; N], TextureError> {
        let bytes = self.take(N)?;
        bytes.try_into().map_err(|_| TextureError::UnexpectedEof)
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

pub(crate) fn read_container(
    data: &[u8],
    limits: Option<&Limits>,
) -> Result<TextureContainer, TextureError> {
    let mut cursor = Cursor { data, pos: 0 };
    let count = le_u32(cursor.take_array::<4>()?);
    check_layer_count(count, limits)?;
    debug!("container declares {count} layers");

    // Never trust the declared count for preallocation beyond what the
    // input could hold.
    let plausible = cursor.remaining() / LAYER_HEADER_LEN;
    let mut layers = Vec::with_capacity((count as usize).min(plausible));
    for index in 0..count {
        let header = parse_layer_header(cursor.take_array()?, limits)?;
        let pixels = cursor.take(header.byte_len)?;
        trace!(
            "layer {index}: level {} {}x{} {}",
            header.level, header.width, header.height, header.format
        );
        layers.push(PackedLayer::new(
            header.level,
            header.width,
            header.height,
            header.format,
            pixels.to_vec(),
        )?);
    }

    if cursor.remaining() != 0 {
        return Err(TextureError::TrailingData(cursor.remaining()));
    }
    Ok(TextureContainer::from_layers(layers))
}

// ── Stream reader ───────────────────────────────────────────────────

fn read_exact(reader: &mut impl Read, buf: &mut [u8]) -> Result<(), TextureError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => TextureError::UnexpectedEof,
        _ => TextureError::Io(e),
    })
}

/// Read exactly `len` bytes without trusting `len` for preallocation.
fn read_pixels(reader: &mut impl Read, len: usize) -> Result<Vec<u8>, TextureError> {
    let mut pixels = Vec::new();
    reader.take(len as u64).read_to_end(&mut pixels)?;
    if pixels.len() != len {
        return Err(TextureError::UnexpectedEof);
    }
    Ok(pixels)
}

pub(crate) fn read_container_stream<R: Read>(
    mut reader: R,
    limits: Option<&Limits>,
) -> Result<TextureContainer, TextureError> {
    let mut count = [0u8; 4];
    read_exact(&mut reader, &mut count)?;
    let count = u32::from_le_bytes(count);
    check_layer_count(count, limits)?;
    debug!("container declares {count} layers");

    let mut layers = Vec::new();
    for index in 0..count {
        let mut raw = [0u8; LAYER_HEADER_LEN];
        read_exact(&mut reader, &mut raw)?;
        let header = parse_layer_header(&raw, limits)?;
        let pixels = read_pixels(&mut reader, header.byte_len)?;
        trace!(
            "layer {index}: level {} {}x{} {}",
            header.level, header.width, header.height, header.format
        );
        layers.push(PackedLayer::new(
            header.level,
            header.width,
            header.height,
            header.format,
            pixels,
        )?);
    }
    Ok(TextureContainer::from_layers(layers))
}
