// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error taxonomy for the reconstruction engine.
//!
//! Entity-level problems (bad geometry, low confidence) are never errors:
//! they are recovered locally by flagging the entity in the validation
//! report. Errors proper are reserved for conditions that terminate an
//! attempt: transient internal states the supervisor may retry, and
//! invariant violations that indicate a bug in the engine itself and are
//! never retried.

use crate::job::JobId;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Pipeline stage, carried in diagnostics so failures can be reproduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Stage {
    Normalize,
    Snap,
    Build,
    Validate,
    Flag,
    Export,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Snap => "snap",
            Stage::Build => "build",
            Stage::Validate => "validate",
            Stage::Flag => "flag",
            Stage::Export => "export",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that terminate a pipeline attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// An unexpected but potentially recoverable internal state. The
    /// supervisor retries the whole pipeline once with an alternate snap
    /// tolerance before escalating to a terminal failure.
    #[error("transient error in stage {stage}: {detail}")]
    Transient { stage: Stage, detail: String },

    /// A broken internal invariant: a bug in the reconstruction logic, not
    /// bad input. Aborts the job, never retried, never swallowed.
    #[error("invariant violation in job {job}, stage {stage}: {detail}")]
    InvariantViolation {
        job: JobId,
        stage: Stage,
        detail: String,
    },

    /// A job state transition that would regress the monotonic lifecycle.
    #[error("illegal job state transition: {0}")]
    IllegalTransition(String),

    /// Configuration rejected before any processing started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An interchange document that could not be serialized or parsed.
    #[error("interchange format error: {0}")]
    Format(String),
}

impl EngineError {
    /// Whether the supervisor may retry the attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Transient { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_retryable() {
        let err = EngineError::Transient {
            stage: Stage::Snap,
            detail: "cluster index out of range".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn invariant_violation_is_terminal() {
        let err = EngineError::InvariantViolation {
            job: JobId(7),
            stage: Stage::Export,
            detail: "opening references missing wall".into(),
        };
        assert!(!err.is_transient());
        let msg = err.to_string();
        assert!(msg.contains("job#7"));
        assert!(msg.contains("export"));
    }
}
