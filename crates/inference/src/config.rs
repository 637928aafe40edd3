use crate::backend::ExecutionProvider;
use crate::labels::ClassNames;
use common::env_or;
use std::env;

pub use common::Environment;

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub environment: Environment,
    pub model_path: String,
    pub input_size: (u32, u32),
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub class_names: ClassNames,
    /// Score channels the model emits, when it differs from the number of names
    pub num_classes: Option<usize>,
    pub execution_provider: ExecutionProvider,
    pub input_name: String,
    pub output_name: String,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let model_path =
            env::var("MODEL_PATH").unwrap_or_else(|_| "models/model.onnx".to_string());

        let input_width = env_or("INPUT_WIDTH", 1280);
        let input_height = env_or("INPUT_HEIGHT", 1280);
        if input_width == 0 || input_height == 0 {
            anyhow::bail!("INPUT_WIDTH and INPUT_HEIGHT must be non-zero");
        }

        let confidence_threshold = env_or("CONFIDENCE_THRESHOLD", 0.25);
        let iou_threshold = env_or("IOU_THRESHOLD", 0.45);
        validate_threshold("CONFIDENCE_THRESHOLD", confidence_threshold)?;
        validate_threshold("IOU_THRESHOLD", iou_threshold)?;

        // A file wins over an inline list
        let class_names = match (env::var("CLASS_NAMES_PATH"), env::var("CLASS_NAMES")) {
            (Ok(path), _) => ClassNames::from_json_file(path)?,
            (Err(_), Ok(list)) => ClassNames::parse_list(&list),
            _ => ClassNames::coco(),
        };

        let num_classes = env::var("NUM_CLASSES")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        let execution_provider = match env::var("EXECUTION_PROVIDER") {
            Ok(value) => value.parse()?,
            Err(_) => ExecutionProvider::default(),
        };

        let input_name = env::var("MODEL_INPUT_NAME").unwrap_or_else(|_| "images".to_string());
        let output_name = env::var("MODEL_OUTPUT_NAME").unwrap_or_else(|_| "output0".to_string());

        Ok(Self {
            environment,
            model_path,
            input_size: (input_width, input_height),
            confidence_threshold,
            iou_threshold,
            class_names,
            num_classes,
            execution_provider,
            input_name,
            output_name,
        })
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            model_path: "/models/model.onnx".to_string(),
            input_size: (640, 640),
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            class_names: ClassNames::coco(),
            num_classes: None,
            execution_provider: ExecutionProvider::Cpu,
            input_name: "images".to_string(),
            output_name: "output0".to_string(),
        }
    }
}

fn validate_threshold(name: &str, value: f32) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("{} must be within [0, 1], got {}", name, value);
    }
    Ok(())
}
