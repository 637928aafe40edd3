use crate::error::PostprocessError;
use crate::labels::ClassNames;
use crate::processing::nms::{BoundingBox, Candidate, non_max_suppression};
use ndarray::ArrayViewD;
use preprocess::LetterboxTransform;
use serde::{Deserialize, Serialize};

/// cx, cy, w, h precede the class scores in every prediction column.
const BOX_CHANNELS: usize = 4;

pub struct TransformParams {
    pub orig_width: u32,
    pub orig_height: u32,
    pub letterbox: LetterboxTransform,
}

/// Final detection in original-image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub score: f32,
    pub class_id: u32,
    pub class_name: String,
}

/// Model output channel count disagrees with the configured class count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub expected_channels: usize,
    pub actual_channels: usize,
}

/// How a raw output tensor will be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLayout {
    pub num_predictions: usize,
    /// Class score channels actually read, at most the configured count
    pub num_classes: usize,
    pub mismatch: Option<ShapeMismatch>,
}

/// Validate a `[batch, 4 + C, N]` output shape against `num_classes`.
///
/// A channel count other than `4 + num_classes` is tolerated: the leading
/// channels are read in declared order and the mismatch is reported in the
/// returned layout. Only shapes without box geometry are rejected.
pub fn check_output_shape(
    shape: &[usize],
    num_classes: usize,
) -> Result<OutputLayout, PostprocessError> {
    let expected_channels = BOX_CHANNELS + num_classes;
    let invalid = || PostprocessError::InvalidOutputShape {
        shape: shape.to_vec(),
        expected_channels,
    };

    let &[batch, channels, num_predictions] = shape else {
        return Err(invalid());
    };
    if batch == 0 || channels < BOX_CHANNELS {
        return Err(invalid());
    }

    let mismatch = (channels != expected_channels).then_some(ShapeMismatch {
        expected_channels,
        actual_channels: channels,
    });

    Ok(OutputLayout {
        num_predictions,
        num_classes: num_classes.min(channels - BOX_CHANNELS),
        mismatch,
    })
}

pub struct PostProcessor {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    /// Class count the model output is expected to carry
    pub num_classes: usize,
    pub class_names: ClassNames,
}

impl PostProcessor {
    /// The class count defaults to the size of the name table.
    pub fn new(confidence_threshold: f32, iou_threshold: f32, class_names: ClassNames) -> Self {
        Self {
            confidence_threshold,
            iou_threshold,
            num_classes: class_names.len(),
            class_names,
        }
    }

    /// Expect `num_classes` score channels regardless of how many classes are named.
    pub fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    /// Turn a raw `[1, 4 + C, N]` output into de-duplicated boxes in original-image space.
    #[tracing::instrument(skip(self, output, transform), fields(shape = ?output.shape()))]
    pub fn parse_detections(
        &self,
        output: &ArrayViewD<f32>,
        transform: &TransformParams,
    ) -> Result<Vec<DetectionBox>, PostprocessError> {
        let layout = check_output_shape(output.shape(), self.num_classes)?;

        if let Some(mismatch) = layout.mismatch {
            tracing::warn!(
                expected_channels = mismatch.expected_channels,
                actual_channels = mismatch.actual_channels,
                shape = ?output.shape(),
                "Model output channels do not match configured class count, reading leading channels"
            );
        }
        if output.shape()[0] > 1 {
            tracing::debug!(batch = output.shape()[0], "Only the first batch entry is read");
        }

        let candidates = decode_candidates(output, &layout, self.confidence_threshold);
        let candidate_count = candidates.len();

        let selected = non_max_suppression(candidates, self.iou_threshold);

        tracing::trace!(
            predictions = layout.num_predictions,
            candidates = candidate_count,
            selected = selected.len(),
            "Postprocessed model output"
        );

        Ok(selected
            .iter()
            .map(|candidate| to_original_space(candidate, transform, &self.class_names))
            .collect())
    }
}

/// Run the full postprocessing chain with explicit thresholds.
pub fn postprocess(
    raw_output: &ArrayViewD<f32>,
    transform: &LetterboxTransform,
    orig_width: u32,
    orig_height: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
    class_names: &ClassNames,
) -> Result<Vec<DetectionBox>, PostprocessError> {
    let post_processor =
        PostProcessor::new(confidence_threshold, iou_threshold, class_names.clone());
    post_processor.parse_detections(
        raw_output,
        &TransformParams {
            orig_width,
            orig_height,
            letterbox: *transform,
        },
    )
}

/// Argmax and threshold every prediction, keeping boxes in padded-tensor space.
///
/// The argmax starts from a zero score and only moves on a strictly greater
/// score, so ties resolve to the lowest class index and a class scoring
/// exactly zero is never picked over class 0.
fn decode_candidates(
    output: &ArrayViewD<f32>,
    layout: &OutputLayout,
    confidence_threshold: f32,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for i in 0..layout.num_predictions {
        let mut max_score = 0.0f32;
        let mut class_id = 0usize;
        for c in 0..layout.num_classes {
            let score = output[[0, BOX_CHANNELS + c, i]];
            if score > max_score {
                max_score = score;
                class_id = c;
            }
        }

        if max_score <= confidence_threshold {
            continue;
        }

        let cx = output[[0, 0, i]];
        let cy = output[[0, 1, i]];
        let w = output[[0, 2, i]];
        let h = output[[0, 3, i]];

        candidates.push(Candidate {
            bbox: BoundingBox::from_center(cx, cy, w, h),
            score: max_score,
            class_id: class_id as u32,
        });
    }

    candidates
}

/// Undo the letterbox, clamp into the image and round to whole pixels.
fn to_original_space(
    candidate: &Candidate,
    transform: &TransformParams,
    class_names: &ClassNames,
) -> DetectionBox {
    let letterbox = &transform.letterbox;
    let max_x = transform.orig_width as f32;
    let max_y = transform.orig_height as f32;

    let x = |v: f32| letterbox.invert_x(v).clamp(0.0, max_x).round() as u32;
    let y = |v: f32| letterbox.invert_y(v).clamp(0.0, max_y).round() as u32;

    let bbox = &candidate.bbox;
    DetectionBox {
        x1: x(bbox.x1),
        y1: y(bbox.y1),
        x2: x(bbox.x2),
        y2: y(bbox.y2),
        score: candidate.score,
        class_id: candidate.class_id,
        class_name: class_names.name(candidate.class_id).into_owned(),
    }
}
