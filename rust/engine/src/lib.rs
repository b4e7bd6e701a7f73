// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction engine: turns noisy geometric detections into a
//! validated, unit-normalized floorplan model.
//!
//! The per-job pipeline runs Normalize -> Snap -> Build -> Validate ->
//! Flag, supervised with a retry policy and a deadline; [`export`]
//! serializes the result for downstream consumers. [`WorkerPool`]
//! processes independent jobs concurrently.
//!
//! ```
//! use planrecon_core::{BlueprintMetadata, DetectionKind, EngineConfig, JobId, JobInput,
//!     Point2D, RawDetection};
//! use planrecon_engine::reconstruct;
//!
//! let corners = [(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)];
//! let detections = (0..4)
//!     .map(|i| {
//!         let (ax, ay) = corners[i];
//!         let (bx, by) = corners[(i + 1) % 4];
//!         RawDetection::new(
//!             DetectionKind::Wall,
//!             vec![Point2D::new(ax, ay), Point2D::new(bx, by)],
//!             0.97,
//!         )
//!     })
//!     .collect();
//! let input = JobInput {
//!     job_id: JobId(1),
//!     detections,
//!     metadata: BlueprintMetadata::unknown(),
//! };
//!
//! let record = reconstruct(&input, &EngineConfig::default());
//! let output = record.output.expect("job completed");
//! assert_eq!(output.data.rooms.len(), 1);
//! ```

pub mod builder;
pub mod export;
pub mod flagger;
pub mod normalizer;
pub mod pipeline;
pub mod pool;
pub mod supervisor;
pub mod validator;

pub use export::{export, import, ExportDocument};
pub use pipeline::PipelineOutput;
pub use pool::WorkerPool;
pub use supervisor::{supervise, JobRecord};

use planrecon_core::{EngineConfig, JobInput};

/// Runs one job end to end: supervision, retries and deadline included.
pub fn reconstruct(input: &JobInput, config: &EngineConfig) -> JobRecord {
    supervise(input, config)
}
