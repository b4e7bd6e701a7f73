// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validation report attached to `SpatialData` when its status is not
//! `Valid`.
//!
//! Every issue carries enough location data (entity ids and coordinates)
//! for a human reviewer to find the offending region without re-running
//! the pipeline.

use serde::{Deserialize, Serialize};

use crate::detection::Point2D;
use crate::model::{OpeningId, RoomId, VertexId, WallId};

/// How bad an issue is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Non-fatal: the result is usable but needs a human look.
    Warning,
    /// Structural: the affected entity was rejected.
    Error,
}

/// What went wrong.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IssueKind {
    /// Scale or unit metadata missing/invalid; a 1:1 default was substituted.
    MetadataIncomplete,
    /// A region could not be resolved unambiguously (unattached opening,
    /// room hint without a closed room, ...).
    AmbiguousRegion,
    /// A boundary that never closes; the open endpoints are cited.
    UnclosedBoundary,
    /// Physically impossible geometry: self-intersection, non-positive area.
    ImpossibleGeometry,
    /// A wall whose endpoints coincide after snapping, or with non-positive
    /// thickness/height.
    DegenerateWall,
    /// An opening placed outside its parent wall's span.
    OpeningOutOfSpan,
    /// Two openings on the same wall overlapping beyond tolerance.
    OpeningOverlap,
    /// Aggregate confidence below the configured accuracy threshold.
    LowConfidence,
    /// The per-job deadline expired; the result is truncated.
    ProcessingTimeout,
    /// No detections were supplied at all.
    EmptyInput,
}

impl IssueKind {
    /// Whether this kind is a structural rejection that makes the whole
    /// result `Invalid`. Opening rejections exclude the opening but only
    /// demand review of the rest.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            IssueKind::ImpossibleGeometry | IssueKind::DegenerateWall | IssueKind::EmptyInput
        )
    }
}

/// Where an issue was found.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum IssueLocation {
    Vertex { id: VertexId, position: Point2D },
    Wall { id: WallId },
    Room { id: RoomId },
    Opening { id: OpeningId, wall: WallId },
    /// A raw detection rejected before it produced any topology entity.
    Detection { index: usize },
    /// A bare coordinate, e.g. a self-intersection point.
    Point(Point2D),
    /// The job as a whole.
    Job,
}

/// One flagged problem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub location: IssueLocation,
    pub message: String,
}

impl Issue {
    pub fn new(
        severity: Severity,
        kind: IssueKind,
        location: IssueLocation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            location,
            message: message.into(),
        }
    }

    pub fn warning(kind: IssueKind, location: IssueLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, location, message)
    }

    pub fn error(kind: IssueKind, location: IssueLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, location, message)
    }
}

/// The list of issues flagged for one job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether any issue rejects an entity for a structural reason.
    pub fn has_structural_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == Severity::Error && i.kind.is_structural())
    }

    /// Whether any non-structural (review-level) issue is present.
    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }
}
