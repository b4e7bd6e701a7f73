// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-job pipeline: Normalize -> Snap -> Build -> Validate -> Flag.
//!
//! Stages run strictly in order; each consumes the previous stage's
//! output. The per-job deadline is checked between stages: on expiry the
//! work done so far is flagged and emitted as a partial result with a
//! `ProcessingTimeout` issue, never dropped. Stage errors propagate to
//! the supervisor, which decides on retry.

use std::time::Instant;

use tracing::{debug, info_span};

use planrecon_core::{
    EngineConfig, Issue, IssueKind, IssueLocation, JobInput, Result, SpatialData, Stage,
    ValidationReport, ValidationStatus,
};

use crate::builder::build_topology;
use crate::flagger::flag;
use crate::normalizer::normalize;
use crate::validator::{validate, ValidatedModel};

/// The result of one pipeline attempt.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub data: SpatialData,
    pub report: ValidationReport,
}

/// Runs one full attempt for a job with the given snap tolerance.
///
/// The tolerance is a parameter rather than read from the config because
/// the supervisor substitutes the alternate tolerance on retry.
pub fn run_attempt(
    input: &JobInput,
    config: &EngineConfig,
    snap_tolerance: f64,
) -> Result<PipelineOutput> {
    let _span = info_span!("pipeline", job = %input.job_id).entered();
    let deadline = Instant::now() + config.deadline;
    let detection_count = input.detections.len();

    let normalized = normalize(&input.detections, &input.metadata);
    let mut issues = normalized.issues;

    if expired(deadline) {
        return Ok(timed_out(
            Stage::Snap,
            ValidatedModel::default(),
            issues,
            detection_count,
            config,
        ));
    }

    let built = build_topology(&normalized.detections, config, snap_tolerance)?;
    issues.extend(built.issues.iter().cloned());
    debug!(
        vertices = built.vertices.len(),
        walls = built.walls.len(),
        rooms = built.rooms.len(),
        "topology built"
    );

    if expired(deadline) {
        let partial = ValidatedModel {
            vertices: built.vertices.clone(),
            ..Default::default()
        };
        return Ok(timed_out(
            Stage::Validate,
            partial,
            issues,
            detection_count,
            config,
        ));
    }

    let model = validate(&built, &normalized.detections, config);

    if expired(deadline) {
        return Ok(timed_out(Stage::Flag, model, issues, detection_count, config));
    }

    let (data, report) = flag(model, issues, detection_count, config);
    Ok(PipelineOutput { data, report })
}

fn expired(deadline: Instant) -> bool {
    Instant::now() >= deadline
}

/// Flags whatever was computed before the deadline hit and demotes the
/// status to at least `NeedsReview`.
fn timed_out(
    next_stage: Stage,
    model: ValidatedModel,
    mut issues: Vec<Issue>,
    detection_count: usize,
    config: &EngineConfig,
) -> PipelineOutput {
    issues.push(Issue::warning(
        IssueKind::ProcessingTimeout,
        IssueLocation::Job,
        format!("deadline expired before the {next_stage} stage, result is partial"),
    ));
    let (mut data, report) = flag(model, issues, detection_count, config);
    data.validation_status = data
        .validation_status
        .worst(ValidationStatus::NeedsReview);
    PipelineOutput { data, report }
}
