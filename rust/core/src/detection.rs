// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw detection input as produced by the upstream visual recognizer.
//!
//! Detections are immutable once ingested: the engine never mutates them,
//! it derives normalized copies and topology from them.

use serde::{Deserialize, Serialize};

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Component-wise scaling, used when rescaling drawing units to meters.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// What the recognizer believes a detected primitive is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DetectionKind {
    Wall,
    Door,
    Window,
    /// A point or small region the recognizer believes lies inside a room.
    RoomHint,
}

/// An unvalidated geometric primitive with a recognizer confidence score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
    pub kind: DetectionKind,
    /// Ordered sequence of 2D points in drawing units.
    pub polyline: Vec<Point2D>,
    /// Recognizer confidence in [0, 1].
    pub confidence: f64,
}

impl RawDetection {
    pub fn new(kind: DetectionKind, polyline: Vec<Point2D>, confidence: f64) -> Self {
        Self {
            kind,
            polyline,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Total polyline length in the detection's own units.
    pub fn length(&self) -> f64 {
        self.polyline
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    /// Arithmetic midpoint of the polyline's points.
    pub fn centroid(&self) -> Option<Point2D> {
        if self.polyline.is_empty() {
            return None;
        }
        let n = self.polyline.len() as f64;
        let (sx, sy) = self
            .polyline
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point2D::new(sx / n, sy / n))
    }
}

/// Blueprint metadata accompanying one batch of detections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintMetadata {
    /// Declared scale: real-world units per drawing unit. `None` or a
    /// non-positive value means the scale is unknown and 1:1 is assumed.
    pub scale: Option<f64>,
    /// Unit the scaled coordinates are expressed in.
    pub unit: crate::units::LengthUnit,
    /// Drawing extents in drawing units, when declared.
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl BlueprintMetadata {
    /// Metadata declaring nothing: scale unknown, unit unknown.
    pub fn unknown() -> Self {
        Self {
            scale: None,
            unit: crate::units::LengthUnit::Unknown,
            width: None,
            height: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn point_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn detection_confidence_is_clamped() {
        let d = RawDetection::new(DetectionKind::Wall, vec![], 1.7);
        assert_eq!(d.confidence, 1.0);
        let d = RawDetection::new(DetectionKind::Wall, vec![], -0.2);
        assert_eq!(d.confidence, 0.0);
    }

    #[test]
    fn polyline_length_sums_segments() {
        let d = RawDetection::new(
            DetectionKind::Wall,
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(1.0, 0.0),
                Point2D::new(1.0, 2.0),
            ],
            1.0,
        );
        assert_relative_eq!(d.length(), 3.0);
    }
}
