use crate::pipeline::Detections;
use crate::processing::post::DetectionBox;
use serde::{Deserialize, Serialize};

/// JSON document written for each processed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub detections: Vec<DetectionBox>,
}

impl DetectionReport {
    pub fn new(source: impl Into<String>, detections: Detections) -> Self {
        Self {
            source: source.into(),
            width: detections.width,
            height: detections.height,
            detections: detections.boxes,
        }
    }

    /// Single-line JSON, suitable for JSON Lines output.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> DetectionReport {
        DetectionReport::new(
            "photos/beach.jpg",
            Detections {
                width: 640,
                height: 480,
                boxes: vec![DetectionBox {
                    x1: 295,
                    y1: 215,
                    x2: 345,
                    y2: 265,
                    score: 0.5,
                    class_id: 2,
                    class_name: "car".to_string(),
                }],
            },
        )
    }

    #[test]
    fn test_json_layout() {
        let json = sample_report().to_json_line().unwrap();

        assert_eq!(
            json,
            r#"{"source":"photos/beach.jpg","width":640,"height":480,"detections":[{"x1":295,"y1":215,"x2":345,"y2":265,"score":0.5,"class_id":2,"class_name":"car"}]}"#
        );
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_empty_detections_serialize_as_empty_array() {
        let report = DetectionReport::new(
            "blank.png",
            Detections {
                width: 1,
                height: 1,
                boxes: Vec::new(),
            },
        );

        let value: serde_json::Value = serde_json::from_str(&report.to_json_line().unwrap()).unwrap();
        assert_eq!(value["detections"], serde_json::json!([]));
    }
}
