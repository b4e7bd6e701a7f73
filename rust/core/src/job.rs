// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Job lifecycle types.
//!
//! A job is one blueprint's pipeline execution. Its state machine is
//! monotonic: `Pending → Processing → {Completed, Failed}`, no regressions.

use serde::{Deserialize, Serialize};

use crate::detection::{BlueprintMetadata, RawDetection};
use crate::error::{EngineError, Result};

/// Identifier of one reconstruction job.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// Everything one job consumes: the detections plus blueprint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInput {
    pub job_id: JobId,
    pub detections: Vec<RawDetection>,
    pub metadata: BlueprintMetadata,
}

/// Monotonic job state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Processing, Completed) | (Processing, Failed)
        )
    }

    /// Advances to `next`, rejecting any regression or skip.
    pub fn advance(self, next: JobState) -> Result<JobState> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(EngineError::IllegalTransition(format!(
                "{:?} -> {:?}",
                self, next
            )))
        }
    }

    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        let s = JobState::Pending;
        let s = s.advance(JobState::Processing).unwrap();
        let s = s.advance(JobState::Completed).unwrap();
        assert!(s.is_terminal());
    }

    #[test]
    fn failure_path() {
        let s = JobState::Pending.advance(JobState::Processing).unwrap();
        assert!(s.advance(JobState::Failed).unwrap().is_terminal());
    }

    #[test]
    fn no_regression() {
        assert!(JobState::Completed.advance(JobState::Processing).is_err());
        assert!(JobState::Failed.advance(JobState::Pending).is_err());
        assert!(JobState::Pending.advance(JobState::Completed).is_err());
    }
}
