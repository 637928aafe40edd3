use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid target size {width}x{height}: both dimensions must be non-zero")]
    InvalidTargetSize { width: u32, height: u32 },

    #[error("Buffer size mismatch for {width}x{height} RGB: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Resize failed: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("Invalid image buffer: {0}")]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl PreprocessError {
    /// True when the input bytes were not a decodable raster image.
    pub fn is_decode(&self) -> bool {
        matches!(self, PreprocessError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_dimensions() {
        let err = PreprocessError::EmptyImage {
            width: 0,
            height: 12,
        };
        assert_eq!(err.to_string(), "Image has no pixels: 0x12");

        let err = PreprocessError::BufferSizeMismatch {
            width: 10,
            height: 10,
            expected: 300,
            actual: 200,
        };
        assert_eq!(
            err.to_string(),
            "Buffer size mismatch for 10x10 RGB: expected 300 bytes, got 200"
        );
        assert!(!err.is_decode());
    }

    #[test]
    fn test_decode_error_conversion() {
        let decode = image::load_from_memory(b"definitely not an image").unwrap_err();
        let err: PreprocessError = decode.into();
        assert!(err.is_decode());
        assert!(err.to_string().starts_with("Failed to decode image"));
    }
}
