// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Job supervision: drives the monotonic job lifecycle around pipeline
//! attempts and applies the retry policy.
//!
//! A transient pipeline error is retried once with the alternate snap
//! tolerance from the retry policy. Invariant violations and illegal
//! transitions are terminal on the first occurrence.

use tracing::{error, warn};

use planrecon_core::{EngineConfig, EngineError, JobId, JobInput, JobState, Result};

use crate::pipeline::{self, PipelineOutput};

/// The terminal record of one supervised job.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: JobId,
    /// Always terminal: `Completed` or `Failed`.
    pub state: JobState,
    /// Pipeline attempts actually made.
    pub attempts: u32,
    pub output: Option<PipelineOutput>,
    pub failure: Option<EngineError>,
}

/// Supervises one job from `Pending` to a terminal state.
pub fn supervise(input: &JobInput, config: &EngineConfig) -> JobRecord {
    supervise_with(input, config, pipeline::run_attempt)
}

/// Same as [`supervise`] with the attempt function injected, so the retry
/// and lifecycle logic can be tested without manufacturing pipeline
/// failures from real input.
pub(crate) fn supervise_with<F>(input: &JobInput, config: &EngineConfig, mut attempt: F) -> JobRecord
where
    F: FnMut(&JobInput, &EngineConfig, f64) -> Result<PipelineOutput>,
{
    let job_id = input.job_id;

    if let Err(e) = config.validate() {
        error!(job = %job_id, error = %e, "configuration rejected");
        return JobRecord {
            job_id,
            state: JobState::Failed,
            attempts: 0,
            output: None,
            failure: Some(e),
        };
    }

    let state = JobState::Pending;
    let state = match state.advance(JobState::Processing) {
        Ok(s) => s,
        Err(e) => return terminal_failure(job_id, 0, e),
    };

    let max_attempts = config.retry.max_attempts.max(1);
    let mut tolerance = config.snap_tolerance;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match attempt(input, config, tolerance) {
            Ok(output) => {
                let state = match state.advance(JobState::Completed) {
                    Ok(s) => s,
                    Err(e) => return terminal_failure(job_id, attempts, e),
                };
                return JobRecord {
                    job_id,
                    state,
                    attempts,
                    output: Some(output),
                    failure: None,
                };
            }
            Err(e) if e.is_transient() && attempts < max_attempts => {
                warn!(
                    job = %job_id,
                    attempt = attempts,
                    error = %e,
                    alternate_tolerance = config.retry.alternate_snap_tolerance,
                    "transient error, retrying"
                );
                tolerance = config.retry.alternate_snap_tolerance;
            }
            Err(e) => {
                error!(job = %job_id, attempt = attempts, error = %e, "job failed");
                let state = match state.advance(JobState::Failed) {
                    Ok(s) => s,
                    Err(transition) => return terminal_failure(job_id, attempts, transition),
                };
                return JobRecord {
                    job_id,
                    state,
                    attempts,
                    output: None,
                    failure: Some(e),
                };
            }
        }
    }
}

fn terminal_failure(job_id: JobId, attempts: u32, failure: EngineError) -> JobRecord {
    error!(job = %job_id, error = %failure, "job aborted");
    JobRecord {
        job_id,
        state: JobState::Failed,
        attempts,
        output: None,
        failure: Some(failure),
    }
}
