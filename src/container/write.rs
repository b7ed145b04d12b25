//! Container serialization.

use std::io::Write;

use super::{LAYER_HEADER_LEN, PackedLayer, TextureContainer};
use crate::error::TextureError;

/// Serialized layer header. `PackedLayer` guarantees the dimensions fit `i32`.
fn layer_header(layer: &PackedLayer) -> [u8; LAYER_HEADER_LEN] {
    let format = layer.format();
    let mut header = [0u8; LAYER_HEADER_LEN];
    header[0..4].copy_from_slice(&layer.level().to_le_bytes());
    header[4..8].copy_from_slice(&(layer.width() as i32).to_le_bytes());
    header[8..12].copy_from_slice(&(layer.height() as i32).to_le_bytes());
    header[12..16].copy_from_slice(&format.layout().tag().to_le_bytes());
    header[16..20].copy_from_slice(&format.storage().tag().to_le_bytes());
    header
}

fn layer_count(len: usize) -> Result<u32, TextureError> {
    u32::try_from(len).map_err(|_| TextureError::TooManyLayers(len))
}

pub(crate) fn encode_container(container: &TextureContainer) -> Result<Vec<u8>, TextureError> {
    let count = layer_count(container.len())?;
    let mut out = Vec::with_capacity(container.encoded_len());
    out.extend_from_slice(&count.to_le_bytes());
    for layer in container {
        out.extend_from_slice(&layer_header(layer));
        out.extend_from_slice(layer.data());
    }
    Ok(out)
}

pub(crate) fn write_container<W: Write>(
    container: &TextureContainer,
    mut writer: W,
) -> Result<(), TextureError> {
    writer.write_all(&layer_count(container.len())?.to_le_bytes())?;
    for layer in container {
        writer.write_all(&layer_header(layer))?;
        writer.write_all(layer.data())?;
    }
    Ok(())
}
