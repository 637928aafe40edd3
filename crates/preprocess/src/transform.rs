use crate::error::PreprocessError;

/// Geometry of a letterbox resize, kept so detections can be mapped back.
///
/// Padding is stored as the total over both sides. Placement rounds half of it
/// to whole pixels while inversion halves the stored total, and both sides of
/// the pipeline must keep that order to stay pixel-compatible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    /// Uniform scale applied to the original image, always > 0
    pub scale_ratio: f32,
    /// Horizontal padding added across both sides, in tensor pixels
    pub pad_total_x: f32,
    /// Vertical padding added across both sides, in tensor pixels
    pub pad_total_y: f32,
}

impl LetterboxTransform {
    /// Map an x coordinate from padded-tensor space to original-image space.
    #[inline]
    pub fn invert_x(&self, x: f32) -> f32 {
        (x - self.pad_total_x / 2.0) / self.scale_ratio
    }

    /// Map a y coordinate from padded-tensor space to original-image space.
    #[inline]
    pub fn invert_y(&self, y: f32) -> f32 {
        (y - self.pad_total_y / 2.0) / self.scale_ratio
    }

    /// Map an x coordinate from original-image space into padded-tensor space.
    #[inline]
    pub fn project_x(&self, x: f32) -> f32 {
        x * self.scale_ratio + self.pad_total_x / 2.0
    }

    /// Map a y coordinate from original-image space into padded-tensor space.
    #[inline]
    pub fn project_y(&self, y: f32) -> f32 {
        y * self.scale_ratio + self.pad_total_y / 2.0
    }
}

/// Full placement plan for one image inside the target canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxGeometry {
    pub target_width: u32,
    pub target_height: u32,
    /// Size of the resized image inside the canvas
    pub new_width: u32,
    pub new_height: u32,
    /// Top-left pixel where the resized image is drawn
    pub offset_x: u32,
    pub offset_y: u32,
    pub transform: LetterboxTransform,
}

impl LetterboxGeometry {
    pub fn compute(
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Result<Self, PreprocessError> {
        if width == 0 || height == 0 {
            return Err(PreprocessError::EmptyImage { width, height });
        }
        if target_width == 0 || target_height == 0 {
            return Err(PreprocessError::InvalidTargetSize {
                width: target_width,
                height: target_height,
            });
        }

        let scale_ratio =
            (target_width as f32 / width as f32).min(target_height as f32 / height as f32);

        // Very thin images still get a one pixel strip
        let new_width = ((width as f32 * scale_ratio).round() as u32).clamp(1, target_width);
        let new_height = ((height as f32 * scale_ratio).round() as u32).clamp(1, target_height);

        let pad_x = (target_width - new_width) as f32 / 2.0;
        let pad_y = (target_height - new_height) as f32 / 2.0;

        Ok(Self {
            target_width,
            target_height,
            new_width,
            new_height,
            offset_x: pad_x.round() as u32,
            offset_y: pad_y.round() as u32,
            transform: LetterboxTransform {
                scale_ratio,
                pad_total_x: pad_x * 2.0,
                pad_total_y: pad_y * 2.0,
            },
        })
    }
}
