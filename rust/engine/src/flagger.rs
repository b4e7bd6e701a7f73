// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ambiguity flagging: folds every issue collected along the pipeline
//! into a final `ValidationStatus` and attaches the aggregate extraction
//! accuracy.
//!
//! Status rules: a structural error (impossible geometry, degenerate
//! wall, empty input) makes the result `Invalid`; any other issue, or an
//! accuracy below the configured threshold, demotes it to `NeedsReview`;
//! a clean report on a confident model stays `Valid`.

use tracing::info;

use planrecon_core::{
    EngineConfig, Issue, IssueKind, IssueLocation, SpatialData, ValidationReport,
    ValidationStatus,
};

use crate::validator::ValidatedModel;

/// Produces the final model and its report.
pub fn flag(
    mut model: ValidatedModel,
    prior_issues: Vec<Issue>,
    detection_count: usize,
    config: &EngineConfig,
) -> (SpatialData, ValidationReport) {
    let mut report = ValidationReport::new();
    report.extend(prior_issues);
    report.extend(std::mem::take(&mut model.issues));

    if detection_count == 0 {
        report.push(Issue::error(
            IssueKind::EmptyInput,
            IssueLocation::Job,
            "no detections supplied",
        ));
        let data = SpatialData::empty(ValidationStatus::Invalid);
        return (data, report);
    }

    let accuracy = extraction_accuracy(&model);
    if accuracy < config.accuracy_threshold {
        report.push(Issue::warning(
            IssueKind::LowConfidence,
            IssueLocation::Job,
            format!(
                "extraction accuracy {:.3} below threshold {:.3}",
                accuracy, config.accuracy_threshold
            ),
        ));
    }

    let validation_status = if report.has_structural_errors() {
        ValidationStatus::Invalid
    } else if !report.is_empty() {
        ValidationStatus::NeedsReview
    } else {
        ValidationStatus::Valid
    };

    info!(
        status = ?validation_status,
        accuracy,
        issues = report.issues.len(),
        "flagging complete"
    );

    let data = SpatialData {
        vertices: model.vertices,
        rooms: model.rooms,
        walls: model.walls,
        openings: model.openings,
        extraction_accuracy: accuracy,
        validation_status,
    };
    (data, report)
}

/// Mean confidence over every accepted entity. An empty model scores 0.
fn extraction_accuracy(model: &ValidatedModel) -> f64 {
    let confidences: Vec<f64> = model
        .walls
        .iter()
        .map(|w| w.confidence)
        .chain(model.rooms.iter().map(|r| r.confidence))
        .chain(model.openings.iter().map(|o| o.confidence))
        .collect();

    if confidences.is_empty() {
        return 0.0;
    }
    confidences.iter().sum::<f64>() / confidences.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use planrecon_core::{Point2D, RoomKind, VertexId, Wall, WallId, WallKind};

    fn confident_model() -> ValidatedModel {
        ValidatedModel {
            walls: vec![Wall {
                id: WallId(0),
                start: VertexId(0),
                end: VertexId(1),
                thickness: 0.2,
                height: 3.0,
                confidence: 0.98,
                kind: WallKind::Exterior,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn clean_confident_model_is_valid() {
        let (data, report) = flag(confident_model(), Vec::new(), 1, &EngineConfig::default());
        assert_eq!(data.validation_status, ValidationStatus::Valid);
        assert!(report.is_empty());
        assert_relative_eq!(data.extraction_accuracy, 0.98);
    }

    #[test]
    fn warnings_demote_to_needs_review() {
        let prior = vec![Issue::warning(
            IssueKind::MetadataIncomplete,
            IssueLocation::Job,
            "scale missing",
        )];
        let (data, report) = flag(confident_model(), prior, 1, &EngineConfig::default());
        assert_eq!(data.validation_status, ValidationStatus::NeedsReview);
        assert!(!report.has_structural_errors());
    }

    #[test]
    fn low_accuracy_demotes_to_needs_review() {
        let mut model = confident_model();
        model.walls[0].confidence = 0.5;
        let (data, report) = flag(model, Vec::new(), 1, &EngineConfig::default());

        assert_eq!(data.validation_status, ValidationStatus::NeedsReview);
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::LowConfidence));
    }

    #[test]
    fn structural_error_makes_invalid() {
        let mut model = confident_model();
        model.issues.push(Issue::error(
            IssueKind::ImpossibleGeometry,
            IssueLocation::Point(Point2D::new(1.0, 1.0)),
            "wall polyline crosses itself",
        ));
        let (data, _) = flag(model, Vec::new(), 1, &EngineConfig::default());
        assert_eq!(data.validation_status, ValidationStatus::Invalid);
    }

    #[test]
    fn empty_input_is_invalid_with_empty_model() {
        let (data, report) = flag(
            ValidatedModel::default(),
            Vec::new(),
            0,
            &EngineConfig::default(),
        );

        assert_eq!(data.validation_status, ValidationStatus::Invalid);
        assert!(data.vertices.is_empty() && data.walls.is_empty() && data.rooms.is_empty());
        assert!(report.issues.iter().any(|i| i.kind == IssueKind::EmptyInput));
    }

    #[test]
    fn opening_rejections_do_not_invalidate() {
        let mut model = confident_model();
        model.issues.push(Issue::error(
            IssueKind::OpeningOverlap,
            IssueLocation::Job,
            "opening overlaps another opening",
        ));
        let (data, _) = flag(model, Vec::new(), 1, &EngineConfig::default());
        assert_eq!(data.validation_status, ValidationStatus::NeedsReview);
    }

    #[test]
    fn accuracy_averages_all_entities() {
        let mut model = confident_model();
        model.rooms.push(planrecon_core::Room {
            id: planrecon_core::RoomId(0),
            boundary: vec![VertexId(0), VertexId(1), VertexId(2)],
            area: 6.0,
            perimeter: 12.0,
            centroid: Point2D::new(1.0, 1.0),
            height: 3.0,
            kind: RoomKind::Unknown,
            confidence: 0.90,
        });
        let (data, _) = flag(model, Vec::new(), 1, &EngineConfig::default());
        assert_relative_eq!(data.extraction_accuracy, 0.94);
    }
}
