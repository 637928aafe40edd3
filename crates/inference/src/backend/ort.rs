use super::{ExecutionProvider, InferenceBackend, InferenceOutput};
use ndarray::{Array, IxDyn};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};

/// Default tensor names of an Ultralytics-style ONNX export.
pub const DEFAULT_INPUT_NAME: &str = "images";
pub const DEFAULT_OUTPUT_NAME: &str = "output0";

pub struct OrtBackend {
    session: Session,
    input_name: String,
    output_name: String,
}

impl OrtBackend {
    /// Load model with specified execution provider and tensor names
    pub fn load_model_with_options(
        path: &str,
        provider: ExecutionProvider,
        input_name: &str,
        output_name: &str,
    ) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?;

        match provider {
            ExecutionProvider::Cuda => {
                tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                builder = builder.with_execution_providers([
                    ort::execution_providers::CUDAExecutionProvider::default()
                        .with_device_id(0)
                        .build()
                        .error_on_failure(),
                ])?;
            }
            ExecutionProvider::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        tracing::info!(input_name, output_name, "Model loaded from {}", path);
        Ok(Self {
            session,
            input_name: input_name.to_string(),
            output_name: output_name.to_string(),
        })
    }
}

impl InferenceBackend for OrtBackend {
    fn load_model(path: &str) -> anyhow::Result<Self> {
        Self::load_model_with_options(
            path,
            ExecutionProvider::Cpu,
            DEFAULT_INPUT_NAME,
            DEFAULT_OUTPUT_NAME,
        )
    }

    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput> {
        let outputs = self.session.run(ort::inputs![
            self.input_name.as_str() => TensorRef::from_array_view(images.view())?
        ])?;

        let predictions = outputs[self.output_name.as_str()].try_extract_array::<f32>()?;

        Ok(InferenceOutput {
            predictions: predictions.into_owned(),
        })
    }
}
