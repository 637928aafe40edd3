pub mod backend;
pub mod config;
pub mod error;
pub mod labels;
pub mod logging;
pub mod pipeline;
pub mod processing;
pub mod serialization;

// Re-export commonly used types for convenience
pub use backend::{ExecutionProvider, InferenceBackend, InferenceOutput};
pub use config::InferenceConfig;
pub use error::{DetectError, PostprocessError};
pub use labels::ClassNames;
pub use pipeline::{Detections, Detector};
pub use processing::post::{DetectionBox, PostProcessor, TransformParams, postprocess};
pub use serialization::DetectionReport;
