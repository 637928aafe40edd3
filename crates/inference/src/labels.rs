use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

const COCO_LABELS: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Class-index to name lookup. Index `i` names class id `i`, and the number
/// of entries is the class count the model output is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassNames(Vec<String>);

impl ClassNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// The 80 COCO labels in training order.
    pub fn coco() -> Self {
        Self::new(COCO_LABELS)
    }

    /// Parse a comma separated list, trimming whitespace around each name.
    pub fn parse_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }

    /// Load a JSON array of names, e.g. `["face", "license plate"]`.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read class names from {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Class names in {} are not a JSON string array", path.display()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name for `class_id`, or `class_<id>` when the table has no entry.
    pub fn name(&self, class_id: u32) -> Cow<'_, str> {
        match self.0.get(class_id as usize) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("class_{class_id}")),
        }
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::coco()
    }
}
