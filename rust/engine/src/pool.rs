// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded worker pool for concurrent job processing.
//!
//! Jobs are independent: no shared mutable state crosses job boundaries,
//! so a fixed rayon pool with one supervised pipeline per job is enough.
//! Results come back in submission order regardless of completion order.

use rayon::prelude::*;

use planrecon_core::{EngineConfig, EngineError, JobInput, Result};

use crate::supervisor::{supervise, JobRecord};

/// A fixed-size pool processing reconstruction jobs concurrently.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Builds a pool with exactly `workers` threads.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(EngineError::InvalidConfig(
                "worker pool needs at least 1 thread".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("planrecon-worker-{i}"))
            .build()
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Processes all jobs concurrently, returning records in submission
    /// order.
    pub fn process(&self, jobs: &[JobInput], config: &EngineConfig) -> Vec<JobRecord> {
        self.pool
            .install(|| jobs.par_iter().map(|job| supervise(job, config)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planrecon_core::{
        BlueprintMetadata, DetectionKind, JobId, JobState, Point2D, RawDetection,
    };

    fn square_job(id: u64, origin: f64) -> JobInput {
        let corners = [
            (origin, 0.0),
            (origin + 3.0, 0.0),
            (origin + 3.0, 3.0),
            (origin, 3.0),
        ];
        let detections = (0..4)
            .map(|i| {
                let (ax, ay) = corners[i];
                let (bx, by) = corners[(i + 1) % 4];
                RawDetection::new(
                    DetectionKind::Wall,
                    vec![Point2D::new(ax, ay), Point2D::new(bx, by)],
                    0.96,
                )
            })
            .collect();
        JobInput {
            job_id: JobId(id),
            detections,
            metadata: BlueprintMetadata {
                scale: Some(1.0),
                unit: planrecon_core::LengthUnit::Meters,
                width: None,
                height: None,
            },
        }
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn results_preserve_submission_order() {
        let pool = WorkerPool::new(4).unwrap();
        let jobs: Vec<_> = (0..16u64).map(|i| square_job(i, i as f64 * 10.0)).collect();
        let records = pool.process(&jobs, &EngineConfig::default());

        assert_eq!(records.len(), jobs.len());
        for (record, job) in records.iter().zip(&jobs) {
            assert_eq!(record.job_id, job.job_id);
            assert_eq!(record.state, JobState::Completed);
        }
    }

    #[test]
    fn jobs_are_isolated() {
        let pool = WorkerPool::new(2).unwrap();
        let jobs = vec![
            square_job(1, 0.0),
            // Empty job: Invalid result, but still Completed, and it must
            // not disturb its neighbors.
            JobInput {
                job_id: JobId(2),
                detections: Vec::new(),
                metadata: BlueprintMetadata::unknown(),
            },
            square_job(3, 100.0),
        ];
        let records = pool.process(&jobs, &EngineConfig::default());

        assert!(records.iter().all(|r| r.state == JobState::Completed));
        let valid_rooms: Vec<usize> = records
            .iter()
            .map(|r| r.output.as_ref().map(|o| o.data.rooms.len()).unwrap_or(0))
            .collect();
        assert_eq!(valid_rooms, vec![1, 0, 1]);
    }

    #[test]
    fn empty_batch_is_fine() {
        let pool = WorkerPool::new(1).unwrap();
        assert!(pool.process(&[], &EngineConfig::default()).is_empty());
    }
}
