//! Letterbox preprocessing for detection models.
//!
//! Turns an arbitrary image into a fixed-size `[1, 3, H, W]` tensor and records
//! the [`LetterboxTransform`] needed to map model coordinates back onto the
//! original image.

pub mod config;
pub mod error;
pub mod letterbox;
pub mod transform;

use ndarray::{Array, IxDyn};

pub use config::{DEFAULT_INPUT_SIZE, LETTERBOX_COLOR};
pub use error::PreprocessError;
pub use letterbox::LetterboxPreprocessor;
pub use transform::{LetterboxGeometry, LetterboxTransform};

/// Result of preprocessing including transformation parameters
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Planar RGB tensor, shape `[1, 3, target_h, target_w]`, values in `[0, 1]`
    pub tensor: Array<f32, IxDyn>,
    /// Geometry needed to invert the letterboxing
    pub transform: LetterboxTransform,
    /// Width of the image before letterboxing
    pub orig_width: u32,
    /// Height of the image before letterboxing
    pub orig_height: u32,
}

/// Decode `image_bytes` and letterbox it into a `target_w` x `target_h` tensor.
pub fn preprocess(
    image_bytes: &[u8],
    target_w: u32,
    target_h: u32,
) -> Result<PreprocessResult, PreprocessError> {
    LetterboxPreprocessor::new((target_w, target_h)).preprocess(image_bytes)
}
