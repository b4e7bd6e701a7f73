// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology operations.

use crate::keys::{EdgeKey, VertexKey};

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during topology operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An edge whose two endpoints are the same vertex.
    #[error("degenerate edge: both endpoints are vertex {0:?}")]
    DegenerateEdge(VertexKey),

    /// Vertex key not found in the arena.
    #[error("vertex not found: {0:?}")]
    VertexNotFound(VertexKey),

    /// Edge key not found in the arena.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    /// Snap tolerance must be positive.
    #[error("snap tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
}
