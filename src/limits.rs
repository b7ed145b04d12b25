use crate::error::TextureError;

/// Resource caps applied while reading a container.
///
/// Every cap is optional; `Limits::default()` accepts anything the input
/// can actually hold.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum `width * height` of one layer.
    pub max_pixels: Option<u64>,
    /// Maximum packed size of one layer, in bytes.
    pub max_memory_bytes: Option<u64>,
    /// Maximum declared layer count.
    pub max_layers: Option<u32>,
}

impl Limits {
    /// Cap both dimensions of every layer.
    pub fn with_max_dimensions(mut self, width: u64, height: u64) -> Self {
        self.max_width = Some(width);
        self.max_height = Some(height);
        self
    }

    pub fn with_max_pixels(mut self, pixels: u64) -> Self {
        self.max_pixels = Some(pixels);
        self
    }

    pub fn with_max_memory_bytes(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    pub fn with_max_layers(mut self, layers: u32) -> Self {
        self.max_layers = Some(layers);
        self
    }

    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), TextureError> {
        within("width", u64::from(width), self.max_width)?;
        within("height", u64::from(height), self.max_height)?;
        within(
            "pixel count",
            u64::from(width) * u64::from(height),
            self.max_pixels,
        )
    }

    pub(crate) fn check_memory(&self, bytes: usize) -> Result<(), TextureError> {
        within("layer size", bytes as u64, self.max_memory_bytes)
    }

    pub(crate) fn check_layers(&self, count: u32) -> Result<(), TextureError> {
        within("layer count", u64::from(count), self.max_layers.map(u64::from))
    }
}

fn within(what: &str, value: u64, max: Option<u64>) -> Result<(), TextureError> {
    match max {
        Some(max) if value > max => Err(TextureError::LimitExceeded(format!(
            "{what} {value} exceeds limit {max}"
        ))),
        _ => Ok(()),
    }
}
