// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # PlanRecon Core
//!
//! Shared data model for the spatial reconstruction and validation engine:
//! raw detections as produced by an upstream recognizer, the validated
//! `SpatialData` aggregate handed to downstream 3D generation, the validation
//! report attached to it, plus configuration and the job lifecycle types.
//!
//! All exchange types are plain serde-serializable data. Geometry and
//! topology algorithms live in `planrecon-topology`; the pipeline that ties
//! the stages together lives in `planrecon-engine`.

pub mod config;
pub mod detection;
pub mod error;
pub mod job;
pub mod model;
pub mod report;
pub mod units;

pub use config::{EngineConfig, RetryPolicy};
pub use detection::{BlueprintMetadata, DetectionKind, Point2D, RawDetection};
pub use error::{EngineError, Result, Stage};
pub use job::{JobId, JobInput, JobState};
pub use model::{
    Opening, OpeningId, OpeningKind, Room, RoomId, RoomKind, SpatialData, SpatialVertex,
    ValidationStatus, VertexId, Wall, WallId, WallKind,
};
pub use report::{Issue, IssueKind, IssueLocation, Severity, ValidationReport};
pub use units::LengthUnit;
