// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The validated floorplan model handed to downstream 3D generation.
//!
//! Entity identifiers are small stable integers assigned in deterministic
//! order during topology building: re-running the pipeline on identical
//! input and configuration yields byte-identical `SpatialData`, including
//! ids and ordering. One `SpatialData` instance is emitted per job and is
//! immutable afterwards; reprocessing supersedes it, never mutates it.

use serde::{Deserialize, Serialize};

use crate::detection::Point2D;

macro_rules! entity_id {
    ($(#[$doc:meta] $name:ident),* $(,)?) => {
        $(
            #[$doc]
            #[derive(
                Debug, Clone, Copy, Serialize, Deserialize,
                PartialEq, Eq, Hash, PartialOrd, Ord,
            )]
            #[serde(transparent)]
            pub struct $name(pub u32);

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}#{}", stringify!($name), self.0)
                }
            }
        )*
    };
}

entity_id! {
    /// Stable identifier of a topological vertex (a snapped endpoint cluster).
    VertexId,
    /// Stable identifier of a wall edge.
    WallId,
    /// Stable identifier of a room face.
    RoomId,
    /// Stable identifier of a door/window opening.
    OpeningId,
}

/// A topological vertex: position is the centroid of its snapped cluster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpatialVertex {
    pub id: VertexId,
    pub position: Point2D,
}

/// Wall classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum WallKind {
    Exterior,
    Interior,
    #[default]
    Unknown,
}

/// A wall edge between two distinct topological vertices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wall {
    pub id: WallId,
    pub start: VertexId,
    pub end: VertexId,
    /// Wall thickness in meters (> 0).
    pub thickness: f64,
    /// Wall height in meters (> 0).
    pub height: f64,
    /// Provenance confidence inherited from the source detection(s).
    pub confidence: f64,
    pub kind: WallKind,
}

/// Room classification. Structural reconstruction always emits `Unknown`;
/// downstream classification may refine it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RoomKind {
    Living,
    Bedroom,
    Kitchen,
    Bathroom,
    Corridor,
    #[default]
    Unknown,
}

/// A room: a closed, counter-clockwise, simple boundary of vertices with
/// derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: RoomId,
    /// Closed boundary, counter-clockwise, first vertex not repeated.
    pub boundary: Vec<VertexId>,
    /// Enclosed area in square meters (> 0 for accepted rooms).
    pub area: f64,
    /// Boundary length in meters.
    pub perimeter: f64,
    pub centroid: Point2D,
    /// Ceiling height in meters.
    pub height: f64,
    pub kind: RoomKind,
    /// Confidence aggregated from the bounding walls.
    pub confidence: f64,
}

/// Opening classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OpeningKind {
    Door,
    Window,
    #[default]
    Other,
}

/// A door or window hosted by a wall.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Opening {
    pub id: OpeningId,
    /// Parent wall hosting this opening.
    pub wall: WallId,
    /// Distance in meters from the wall's start vertex to the opening start.
    /// Invariant: `0 <= offset` and `offset + width <= wall length`.
    pub offset: f64,
    /// Opening width in meters.
    pub width: f64,
    pub kind: OpeningKind,
    pub confidence: f64,
}

/// Validation status of one job's output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Every entity accepted and aggregate confidence meets the threshold.
    Valid,
    /// Usable but flagged: unclosed boundaries, low confidence or incomplete
    /// metadata require a human look.
    NeedsReview,
    /// At least one structural rejection (or no input at all).
    Invalid,
}

impl ValidationStatus {
    /// Combines two statuses, keeping the worse one.
    pub fn worst(self, other: ValidationStatus) -> ValidationStatus {
        use ValidationStatus::*;
        match (self, other) {
            (Invalid, _) | (_, Invalid) => Invalid,
            (NeedsReview, _) | (_, NeedsReview) => NeedsReview,
            _ => Valid,
        }
    }
}

/// The aggregate floorplan model: the sole artifact surviving past the
/// pipeline boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpatialData {
    /// Distinct topological vertices, ordered by id.
    pub vertices: Vec<SpatialVertex>,
    pub rooms: Vec<Room>,
    pub walls: Vec<Wall>,
    pub openings: Vec<Opening>,
    /// Aggregate confidence in [0, 1], weighted by entity count.
    pub extraction_accuracy: f64,
    pub validation_status: ValidationStatus,
}

impl SpatialData {
    /// An empty result with the given status, used for jobs with no usable
    /// geometry (empty input, early deadline expiry).
    pub fn empty(status: ValidationStatus) -> Self {
        Self {
            vertices: Vec::new(),
            rooms: Vec::new(),
            walls: Vec::new(),
            openings: Vec::new(),
            extraction_accuracy: 0.0,
            validation_status: status,
        }
    }

    /// Looks up a vertex position by id.
    pub fn vertex_position(&self, id: VertexId) -> Option<Point2D> {
        self.vertices
            .binary_search_by_key(&id, |v| v.id)
            .ok()
            .map(|i| self.vertices[i].position)
    }

    /// Looks up a wall by id.
    pub fn wall(&self, id: WallId) -> Option<&Wall> {
        self.walls
            .binary_search_by_key(&id, |w| w.id)
            .ok()
            .map(|i| &self.walls[i])
    }
}
