use crate::config::{DEFAULT_INPUT_SIZE, LETTERBOX_COLOR};
use crate::error::PreprocessError;
use crate::transform::LetterboxGeometry;
use crate::PreprocessResult;
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use image::DynamicImage;
use ndarray::{Array, IxDyn};

/// CPU letterbox preprocessor.
///
/// Holds only the target size, so a single instance can be shared between
/// threads; every call allocates its own buffers.
#[derive(Debug, Clone)]
pub struct LetterboxPreprocessor {
    pub input_size: (u32, u32),
}

impl LetterboxPreprocessor {
    pub fn new(input_size: (u32, u32)) -> Self {
        Self { input_size }
    }

    /// Decode encoded image bytes (PNG, JPEG, ...) and preprocess them.
    pub fn preprocess(&self, image_bytes: &[u8]) -> Result<PreprocessResult, PreprocessError> {
        let image = {
            let _s = span!("decode_image");
            image::load_from_memory(image_bytes)?
        };
        self.preprocess_image(&image)
    }

    /// Preprocess an already decoded image. Alpha is discarded.
    pub fn preprocess_image(
        &self,
        image: &DynamicImage,
    ) -> Result<PreprocessResult, PreprocessError> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        self.preprocess_rgb(rgb.as_raw(), width, height)
    }

    /// Preprocess raw RGB pixels in HWC order.
    pub fn preprocess_rgb(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<PreprocessResult, PreprocessError> {
        let _s = span!("preprocess_image");

        tracing::trace!(
            width,
            height,
            pixel_bytes = pixels.len(),
            "Preprocessing image dimensions"
        );

        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(PreprocessError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        let geometry =
            LetterboxGeometry::compute(width, height, self.input_size.0, self.input_size.1)?;

        tracing::debug!(
            scale = geometry.transform.scale_ratio,
            new_width = geometry.new_width,
            new_height = geometry.new_height,
            offset_x = geometry.offset_x,
            offset_y = geometry.offset_y,
            "Letterbox geometry"
        );

        let canvas = Self::resize_and_letterbox(pixels, width, height, &geometry)?;
        let tensor = Self::normalize(&canvas, geometry.target_width, geometry.target_height)?;

        Ok(PreprocessResult {
            tensor,
            transform: geometry.transform,
            orig_width: width,
            orig_height: height,
        })
    }

    fn resize_and_letterbox(
        pixels: &[u8],
        width: u32,
        height: u32,
        geometry: &LetterboxGeometry,
    ) -> Result<Vec<u8>, PreprocessError> {
        let _s = span!("resize_and_letterbox");

        let new_width = geometry.new_width;
        let new_height = geometry.new_height;

        let resized;
        let resized_data: &[u8] = if (new_width, new_height) == (width, height) {
            pixels
        } else {
            let src = ImageRef::new(width, height, pixels, PixelType::U8x3)?;
            let mut dst = Image::new(new_width, new_height, PixelType::U8x3);

            Resizer::new().resize(
                &src,
                &mut dst,
                &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            )?;

            resized = dst;
            resized.buffer()
        };

        let mut canvas =
            vec![LETTERBOX_COLOR; (geometry.target_width * geometry.target_height * 3) as usize];

        let stride = (geometry.target_width * 3) as usize;
        let row_len = (new_width * 3) as usize;

        for y in 0..new_height as usize {
            let src_row = y * row_len;
            let dst_row =
                (y + geometry.offset_y as usize) * stride + geometry.offset_x as usize * 3;

            canvas[dst_row..dst_row + row_len]
                .copy_from_slice(&resized_data[src_row..src_row + row_len]);
        }

        Ok(canvas)
    }

    fn normalize(canvas: &[u8], width: u32, height: u32) -> Result<Array<f32, IxDyn>, PreprocessError> {
        let _s = span!("normalize");

        let width = width as usize;
        let height = height as usize;
        let spatial = width * height;

        let mut output = vec![0.0f32; 3 * spatial];

        for (i, px) in canvas.chunks_exact(3).enumerate() {
            output[i] = px[0] as f32 / 255.0;
            output[i + spatial] = px[1] as f32 / 255.0;
            output[i + 2 * spatial] = px[2] as f32 / 255.0;
        }

        Ok(Array::from_shape_vec(
            IxDyn(&[1, 3, height, width]),
            output,
        )?)
    }
}

impl Default for LetterboxPreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}
