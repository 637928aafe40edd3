use std::cmp::Ordering;

/// Axis-aligned box in corner form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// Convert bounding box from center-width-height format to corner format
    #[inline]
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        }
    }

    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Intersection over union. Disjoint boxes and zero-area unions give 0.
    pub fn iou(&self, other: &Self) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        if intersection <= 0.0 {
            return 0.0;
        }

        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// A thresholded prediction still in padded-tensor space.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub bbox: BoundingBox,
    pub score: f32,
    pub class_id: u32,
}

/// Greedy per-class non-maximum suppression.
///
/// Candidates are visited by descending score; one is kept unless an already
/// kept candidate of the same class overlaps it with IoU above `iou_threshold`.
/// Boxes of different classes never suppress each other. The result is in
/// selection order.
pub fn non_max_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = kept.iter().any(|selected| {
            selected.class_id == candidate.class_id
                && selected.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: u32) -> Candidate {
        Candidate {
            bbox: BoundingBox { x1, y1, x2, y2 },
            score,
            class_id,
        }
    }

    #[test]
    fn test_from_center() {
        let bbox = BoundingBox::from_center(0.5, 0.5, 0.4, 0.2);
        assert!((bbox.x1 - 0.3).abs() < 1e-6);
        assert!((bbox.y1 - 0.4).abs() < 1e-6);
        assert!((bbox.x2 - 0.7).abs() < 1e-6);
        assert!((bbox.y2 - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_iou_known_values() {
        let a = BoundingBox { x1: 0.0, y1: 0.0, x2: 10.0, y2: 10.0 };
        let b = BoundingBox { x1: 5.0, y1: 0.0, x2: 15.0, y2: 10.0 };
        // 50 / (100 + 100 - 50)
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(a.iou(&a), 1.0);

        let far = BoundingBox { x1: 20.0, y1: 20.0, x2: 30.0, y2: 30.0 };
        assert_eq!(a.iou(&far), 0.0);

        // Touching edges do not overlap
        let touching = BoundingBox { x1: 10.0, y1: 0.0, x2: 20.0, y2: 10.0 };
        assert_eq!(a.iou(&touching), 0.0);
    }

    #[test]
    fn test_iou_of_zero_area_boxes_is_zero() {
        let point = BoundingBox { x1: 5.0, y1: 5.0, x2: 5.0, y2: 5.0 };
        let iou = point.iou(&point);
        assert_eq!(iou, 0.0);
        assert!(!iou.is_nan());

        let line = BoundingBox { x1: 0.0, y1: 5.0, x2: 10.0, y2: 5.0 };
        assert_eq!(line.iou(&point), 0.0);
    }

    #[test]
    fn test_same_class_overlap_keeps_highest_score() {
        let kept = non_max_suppression(
            vec![
                candidate(0.0, 0.0, 10.0, 10.0, 0.6, 1),
                candidate(0.0, 0.0, 10.0, 10.0, 0.9, 1),
            ],
            0.5,
        );

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn test_different_classes_never_suppress() {
        let kept = non_max_suppression(
            vec![
                candidate(0.0, 0.0, 10.0, 10.0, 0.9, 0),
                candidate(0.0, 0.0, 10.0, 10.0, 0.8, 1),
            ],
            0.5,
        );

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].class_id, 0);
        assert_eq!(kept[1].class_id, 1);
    }

    #[test]
    fn test_iou_equal_to_threshold_is_not_suppressed() {
        // IoU is exactly 1/3
        let kept = non_max_suppression(
            vec![
                candidate(0.0, 0.0, 10.0, 10.0, 0.9, 0),
                candidate(5.0, 0.0, 15.0, 10.0, 0.8, 0),
            ],
            0.5,
        );
        assert_eq!(kept.len(), 2);

        let kept = non_max_suppression(
            vec![
                candidate(0.0, 0.0, 10.0, 10.0, 0.9, 0),
                candidate(5.0, 0.0, 15.0, 10.0, 0.8, 0),
            ],
            0.3,
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_suppression_is_only_against_selected_boxes() {
        // B overlaps A and C, A and C do not overlap: A suppresses B, so C survives
        let kept = non_max_suppression(
            vec![
                candidate(0.0, 0.0, 10.0, 10.0, 0.9, 0),
                candidate(4.0, 0.0, 14.0, 10.0, 0.8, 0),
                candidate(8.0, 0.0, 18.0, 10.0, 0.7, 0),
            ],
            0.3,
        );

        let scores: Vec<f32> = kept.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![0.9, 0.7]);
    }

    #[test]
    fn test_output_sorted_by_descending_score() {
        let kept = non_max_suppression(
            vec![
                candidate(0.0, 0.0, 1.0, 1.0, 0.3, 0),
                candidate(10.0, 10.0, 11.0, 11.0, 0.9, 0),
                candidate(20.0, 20.0, 21.0, 21.0, 0.6, 2),
            ],
            0.5,
        );

        let scores: Vec<f32> = kept.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![0.9, 0.6, 0.3]);
    }

    #[test]
    fn test_degenerate_boxes_do_not_crash() {
        let kept = non_max_suppression(
            vec![
                candidate(5.0, 5.0, 5.0, 5.0, 0.9, 0),
                candidate(5.0, 5.0, 5.0, 5.0, 0.8, 0),
            ],
            0.5,
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(non_max_suppression(Vec::new(), 0.5).is_empty());
    }
}
