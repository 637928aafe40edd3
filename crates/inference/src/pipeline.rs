use crate::{
    backend::{InferenceBackend, InferenceOutput},
    config::InferenceConfig,
    error::DetectError,
    processing::post::{DetectionBox, PostProcessor, TransformParams},
};
use image::DynamicImage;
use preprocess::{LetterboxPreprocessor, PreprocessResult};
use std::time::Instant;

/// Boxes found in one image, with the image size they refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct Detections {
    pub width: u32,
    pub height: u32,
    pub boxes: Vec<DetectionBox>,
}

/// Preprocess, infer and postprocess in one call.
///
/// The detector owns the backend for its whole lifetime, so the model is
/// loaded once by the host and reused across requests.
pub struct Detector<B: InferenceBackend> {
    backend: B,
    preprocessor: LetterboxPreprocessor,
    postprocessor: PostProcessor,
}

impl<B: InferenceBackend> Detector<B> {
    pub fn new(backend: B, config: &InferenceConfig) -> Self {
        let preprocessor = LetterboxPreprocessor::new(config.input_size);
        let mut postprocessor = PostProcessor::new(
            config.confidence_threshold,
            config.iou_threshold,
            config.class_names.clone(),
        );
        if let Some(num_classes) = config.num_classes {
            postprocessor = postprocessor.with_num_classes(num_classes);
        }
        Self::from_parts(backend, preprocessor, postprocessor)
    }

    pub fn from_parts(
        backend: B,
        preprocessor: LetterboxPreprocessor,
        postprocessor: PostProcessor,
    ) -> Self {
        Self {
            backend,
            preprocessor,
            postprocessor,
        }
    }

    /// Detect objects in encoded image bytes.
    pub fn detect(&mut self, image_bytes: &[u8]) -> Result<Detections, DetectError> {
        let preprocessed = self.preprocessor.preprocess(image_bytes)?;
        self.run(preprocessed)
    }

    /// Detect objects in an image the host already decoded.
    pub fn detect_image(&mut self, image: &DynamicImage) -> Result<Detections, DetectError> {
        let preprocessed = self.preprocessor.preprocess_image(image)?;
        self.run(preprocessed)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn run(&mut self, preprocessed: PreprocessResult) -> Result<Detections, DetectError> {
        let PreprocessResult {
            tensor,
            transform,
            orig_width: width,
            orig_height: height,
        } = preprocessed;

        let span = tracing::info_span!("detect", width, height);
        let _enter = span.enter();
        let start = Instant::now();

        let InferenceOutput { predictions } = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            self.backend
                .infer(&tensor)
                .map_err(|e| DetectError::Inference {
                    width,
                    height,
                    source: e.into(),
                })?
        };

        let transform = TransformParams {
            orig_width: width,
            orig_height: height,
            letterbox: transform,
        };

        let boxes = self
            .postprocessor
            .parse_detections(&predictions.view(), &transform)
            .map_err(|source| DetectError::Postprocess {
                width,
                height,
                source,
            })?;

        tracing::debug!(
            detections = boxes.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image processed"
        );

        Ok(Detections {
            width,
            height,
            boxes,
        })
    }
}
