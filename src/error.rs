/// Errors from texture packing, container (de)serialization and image I/O.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TextureError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("corrupt container: {0}")]
    CorruptContainer(String),

    #[error("{0} trailing bytes after the last layer")]
    TrailingData(usize),

    #[error("{0} layers do not fit the container's 32-bit layer count")]
    TooManyLayers(usize),

    #[error("unsupported format/storage combination: {format_tag:#06x}/{storage_tag:#06x}")]
    UnsupportedFormat { format_tag: u32, storage_tag: u32 },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("failed to allocate {bytes} bytes")]
    OutOfMemory { bytes: usize },

    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("unsupported channel count: {0} (expected 1-4)")]
    InvalidChannelCount(usize),

    #[error("canvas has no pixels")]
    EmptyCanvas,

    #[error("unsupported image file format: {0}")]
    UnsupportedImageFormat(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
