// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration.
//!
//! All policy knobs live here so geometry logic stays tuning-free: snap
//! tolerance, the accuracy threshold driving `Valid` vs `NeedsReview`, the
//! per-job deadline and the retry policy the supervisor applies around the
//! pure pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry policy applied by the supervisor when the pipeline reports a
/// transient error: re-run once with an alternate snap tolerance, then fail
/// terminally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Snap tolerance (meters) used by retry attempts.
    pub alternate_snap_tolerance: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            alternate_snap_tolerance: 0.05,
        }
    }
}

/// Configuration for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Endpoint merge distance in meters.
    pub snap_tolerance: f64,
    /// Minimum aggregate confidence for a `Valid` result.
    pub accuracy_threshold: f64,
    /// Maximum wall-clock time per job. Expiry truncates the job and forces
    /// the status to at least `NeedsReview`.
    pub deadline: Duration,
    /// Thickness assigned to walls whose detections carry none (meters).
    pub default_wall_thickness: f64,
    /// Height assigned to walls and rooms (meters).
    pub default_wall_height: f64,
    /// Maximum tolerated overlap between two openings on one wall (meters).
    pub opening_overlap_tolerance: f64,
    /// Maximum distance between an opening detection and its host wall
    /// centerline for attachment (meters).
    pub opening_attach_distance: f64,
    /// Width assigned to openings whose detections are degenerate (meters).
    pub default_opening_width: f64,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: 0.02,
            accuracy_threshold: 0.95,
            deadline: Duration::from_secs(30),
            default_wall_thickness: 0.2,
            default_wall_height: 3.0,
            opening_overlap_tolerance: 0.01,
            opening_attach_distance: 0.3,
            default_opening_width: 0.9,
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Basic sanity check on configured values.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.snap_tolerance <= 0.0 {
            return Err(crate::error::EngineError::InvalidConfig(format!(
                "snap_tolerance must be positive, got {}",
                self.snap_tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.accuracy_threshold) {
            return Err(crate::error::EngineError::InvalidConfig(format!(
                "accuracy_threshold must be in [0, 1], got {}",
                self.accuracy_threshold
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(crate::error::EngineError::InvalidConfig(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
