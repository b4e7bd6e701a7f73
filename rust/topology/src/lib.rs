// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # PlanRecon Topology
//!
//! Planar topology for floorplan reconstruction: tolerance snapping of
//! near-coincident endpoints into topological vertices, an arena-based
//! undirected planar graph with stable generational keys, and minimal-face
//! extraction that turns wall segments into candidate room boundaries.
//!
//! Everything here is per-job and deterministic: identical input produces
//! identical vertex keys, face ordering and geometry, which is what lets
//! the engine promise byte-identical `SpatialData` across reruns.

pub mod arena;
pub mod error;
pub mod faces;
pub mod geometry;
pub mod keys;
pub mod snap;

pub use arena::{EdgeData, PlanarArena, VertexData};
pub use error::{Error, Result};
pub use faces::{extract_faces, FaceSet};
pub use keys::{EdgeKey, VertexKey};
pub use snap::{snap_endpoints, SnapOutcome};
