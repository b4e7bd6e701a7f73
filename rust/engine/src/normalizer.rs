// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit normalization: rescales raw drawing coordinates to canonical
//! meters using the blueprint's declared scale and unit.
//!
//! Missing or non-positive scale metadata never fails a job: a 1:1 default
//! is substituted and a `MetadataIncomplete` warning is carried into the
//! eventual validation report.

use planrecon_core::{
    BlueprintMetadata, Issue, IssueKind, IssueLocation, LengthUnit, RawDetection,
};
use tracing::debug;

/// Detections rescaled to meters, plus any metadata warnings.
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    pub detections: Vec<RawDetection>,
    pub issues: Vec<Issue>,
    /// Combined multiplier applied to every coordinate.
    pub scale_factor: f64,
}

/// Rescales all detection coordinates into canonical meters.
pub fn normalize(detections: &[RawDetection], metadata: &BlueprintMetadata) -> NormalizedInput {
    let mut issues = Vec::new();

    let scale = match metadata.scale {
        Some(s) if s > 0.0 && s.is_finite() => s,
        Some(s) => {
            issues.push(Issue::warning(
                IssueKind::MetadataIncomplete,
                IssueLocation::Job,
                format!("declared scale {s} is not positive, assuming 1:1"),
            ));
            1.0
        }
        None => {
            issues.push(Issue::warning(
                IssueKind::MetadataIncomplete,
                IssueLocation::Job,
                "no scale declared, assuming 1 drawing unit = 1 unit",
            ));
            1.0
        }
    };

    if metadata.unit == LengthUnit::Unknown {
        issues.push(Issue::warning(
            IssueKind::MetadataIncomplete,
            IssueLocation::Job,
            "unit not declared, assuming meters",
        ));
    }

    let factor = scale * metadata.unit.meters_per_unit();
    debug!(scale, unit = %metadata.unit, factor, "normalizing coordinates");

    let detections = detections
        .iter()
        .map(|d| RawDetection {
            kind: d.kind,
            polyline: d.polyline.iter().map(|p| p.scaled(factor)).collect(),
            confidence: d.confidence,
        })
        .collect();

    NormalizedInput {
        detections,
        issues,
        scale_factor: factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use planrecon_core::{DetectionKind, Point2D};

    fn wall(points: Vec<Point2D>) -> RawDetection {
        RawDetection::new(DetectionKind::Wall, points, 0.9)
    }

    #[test]
    fn applies_scale_and_unit() {
        let metadata = BlueprintMetadata {
            scale: Some(2.0),
            unit: LengthUnit::Centimeters,
            width: None,
            height: None,
        };
        let input = normalize(&[wall(vec![Point2D::new(100.0, 50.0)])], &metadata);

        assert!(input.issues.is_empty());
        assert_relative_eq!(input.scale_factor, 0.02);
        assert_relative_eq!(input.detections[0].polyline[0].x, 2.0);
        assert_relative_eq!(input.detections[0].polyline[0].y, 1.0);
    }

    #[test]
    fn missing_scale_defaults_with_warning() {
        let input = normalize(
            &[wall(vec![Point2D::new(1.0, 1.0)])],
            &BlueprintMetadata::unknown(),
        );

        assert_relative_eq!(input.scale_factor, 1.0);
        assert_relative_eq!(input.detections[0].polyline[0].x, 1.0);
        assert!(input
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::MetadataIncomplete));
    }

    #[test]
    fn non_positive_scale_defaults_with_warning() {
        let metadata = BlueprintMetadata {
            scale: Some(-3.0),
            unit: LengthUnit::Meters,
            width: None,
            height: None,
        };
        let input = normalize(&[wall(vec![Point2D::new(1.0, 1.0)])], &metadata);

        assert_relative_eq!(input.scale_factor, 1.0);
        assert_eq!(input.issues.len(), 1);
        assert_eq!(input.issues[0].kind, IssueKind::MetadataIncomplete);
    }

    #[test]
    fn confidence_is_preserved() {
        let input = normalize(
            &[wall(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)])],
            &BlueprintMetadata::unknown(),
        );
        assert_relative_eq!(input.detections[0].confidence, 0.9);
    }
}
