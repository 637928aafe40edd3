use preprocess::PreprocessError;
use thiserror::Error;

/// The raw model output cannot be read as `[batch, 4 + classes, predictions]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PostprocessError {
    #[error(
        "Unusable model output shape {shape:?}: expected [1, {expected_channels}, N] (4 box channels + class scores)"
    )]
    InvalidOutputShape {
        shape: Vec<usize>,
        expected_channels: usize,
    },
}

/// Terminal failure of a single detection request.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error("Inference failed for {width}x{height} image: {source}")]
    Inference {
        width: u32,
        height: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Postprocessing failed for {width}x{height} image: {source}")]
    Postprocess {
        width: u32,
        height: u32,
        #[source]
        source: PostprocessError,
    },
}

impl DetectError {
    /// True when the image bytes could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, DetectError::Preprocess(e) if e.is_decode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display_formatting() {
        let err = PostprocessError::InvalidOutputShape {
            shape: vec![1, 3],
            expected_channels: 84,
        };
        assert_eq!(
            err.to_string(),
            "Unusable model output shape [1, 3]: expected [1, 84, N] (4 box channels + class scores)"
        );

        let err = DetectError::Postprocess {
            width: 640,
            height: 480,
            source: err,
        };
        assert!(err.to_string().starts_with("Postprocessing failed for 640x480 image"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_inference_failure_passes_source_through() {
        let err = DetectError::Inference {
            width: 32,
            height: 16,
            source: anyhow::anyhow!("session exploded").into(),
        };

        assert_eq!(
            err.to_string(),
            "Inference failed for 32x16 image: session exploded"
        );
        assert_eq!(err.source().unwrap().to_string(), "session exploded");
        assert!(!err.is_decode());
    }

    #[test]
    fn test_decode_error_is_detected() {
        let decode = image::load_from_memory(b"garbage").unwrap_err();
        let err: DetectError = PreprocessError::from(decode).into();
        assert!(err.is_decode());
    }
}
