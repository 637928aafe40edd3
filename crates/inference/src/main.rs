use inference::{
    DetectionReport, Detector, InferenceConfig, backend::ort::OrtBackend, logging::setup_logging,
};
use std::io::{self, Write};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let config = InferenceConfig::from_env()?;

    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        anyhow::bail!("Usage: inference <image> [<image> ...]");
    }

    tracing::info!("Loading inference model");
    let backend = OrtBackend::load_model_with_options(
        &config.model_path,
        config.execution_provider,
        &config.input_name,
        &config.output_name,
    )?;
    tracing::info!("Model loaded successfully");

    let mut detector = Detector::new(backend, &config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    for path in &paths {
        let source = path.display().to_string();

        let result = std::fs::read(path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| Ok(detector.detect(&bytes)?));

        match result {
            Ok(detections) => {
                tracing::info!(
                    source = %source,
                    detections = detections.boxes.len(),
                    "Image processed"
                );
                let report = DetectionReport::new(source, detections);
                writeln!(out, "{}", report.to_json_line()?)?;
            }
            Err(e) => {
                failures += 1;
                tracing::error!(source = %source, error = %e, "Failed to process image");
            }
        }
    }

    out.flush()?;

    if failures > 0 {
        anyhow::bail!("{} of {} images failed", failures, paths.len());
    }
    Ok(())
}
