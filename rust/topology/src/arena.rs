// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for the planar wall graph.
//!
//! The [`PlanarArena`] is the central owner of one job's topology: vertices
//! and undirected edges live in slot maps with stable generational keys,
//! with an upward adjacency index (vertex → edges using it). Insertion
//! order is recorded separately so every traversal can iterate in a
//! deterministic order regardless of hash map internals.

use nalgebra::Point2;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::keys::{EdgeKey, VertexKey};

/// Data stored for a vertex: a point in the normalized 2D plane.
#[derive(Debug, Clone, Copy)]
pub struct VertexData {
    pub x: f64,
    pub y: f64,
}

/// Data stored for an edge: an undirected segment between two vertices.
#[derive(Debug, Clone, Copy)]
pub struct EdgeData {
    pub start: VertexKey,
    pub end: VertexKey,
}

/// One job's planar wall graph.
#[derive(Debug, Default)]
pub struct PlanarArena {
    vertices: SlotMap<VertexKey, VertexData>,
    edges: SlotMap<EdgeKey, EdgeData>,

    // Insertion order, for deterministic iteration
    vertex_order: Vec<VertexKey>,
    edge_order: Vec<EdgeKey>,

    // Upward adjacency: vertex → edges using it
    vertex_to_edges: FxHashMap<VertexKey, FxHashSet<EdgeKey>>,
    // Parallel-edge deduplication, keyed by normalized vertex pair
    edge_lookup: FxHashMap<(VertexKey, VertexKey), EdgeKey>,
}

impl PlanarArena {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex at the given position.
    pub fn add_vertex(&mut self, x: f64, y: f64) -> VertexKey {
        let key = self.vertices.insert(VertexData { x, y });
        self.vertex_order.push(key);
        self.vertex_to_edges.insert(key, FxHashSet::default());
        key
    }

    /// Adds an undirected edge between two distinct vertices.
    ///
    /// Self-loops are rejected (a degenerate wall must be reported, never
    /// stored). Parallel edges are deduplicated: adding an edge that
    /// already exists returns the existing key.
    pub fn add_edge(&mut self, a: VertexKey, b: VertexKey) -> Result<EdgeKey> {
        if a == b {
            return Err(Error::DegenerateEdge(a));
        }
        if !self.vertices.contains_key(a) {
            return Err(Error::VertexNotFound(a));
        }
        if !self.vertices.contains_key(b) {
            return Err(Error::VertexNotFound(b));
        }

        let pair = Self::normalize_pair(a, b);
        if let Some(&existing) = self.edge_lookup.get(&pair) {
            return Ok(existing);
        }

        let key = self.edges.insert(EdgeData { start: a, end: b });
        self.edge_order.push(key);
        self.edge_lookup.insert(pair, key);
        self.vertex_to_edges.entry(a).or_default().insert(key);
        self.vertex_to_edges.entry(b).or_default().insert(key);
        Ok(key)
    }

    fn normalize_pair(a: VertexKey, b: VertexKey) -> (VertexKey, VertexKey) {
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Returns the edge between two vertices, if present.
    pub fn find_edge(&self, a: VertexKey, b: VertexKey) -> Option<EdgeKey> {
        self.edge_lookup.get(&Self::normalize_pair(a, b)).copied()
    }

    /// Returns the 2D position of a vertex.
    pub fn vertex_point(&self, key: VertexKey) -> Option<Point2<f64>> {
        self.vertices.get(key).map(|v| Point2::new(v.x, v.y))
    }

    /// Returns the start and end vertex keys of an edge.
    pub fn edge_vertices(&self, key: EdgeKey) -> Option<(VertexKey, VertexKey)> {
        self.edges.get(key).map(|e| (e.start, e.end))
    }

    /// Computes the Euclidean length of an edge.
    pub fn edge_length(&self, key: EdgeKey) -> Option<f64> {
        let edge = self.edges.get(key)?;
        let p0 = self.vertex_point(edge.start)?;
        let p1 = self.vertex_point(edge.end)?;
        Some((p1 - p0).norm())
    }

    /// Number of edges using a vertex.
    pub fn degree(&self, key: VertexKey) -> usize {
        self.vertex_to_edges.get(&key).map_or(0, |s| s.len())
    }

    /// Edges using a vertex, sorted for deterministic iteration.
    pub fn edges_at(&self, key: VertexKey) -> Vec<EdgeKey> {
        let mut edges: Vec<EdgeKey> = self
            .vertex_to_edges
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        edges.sort();
        edges
    }

    /// Neighbor vertices of a vertex, sorted for deterministic iteration.
    pub fn neighbors(&self, key: VertexKey) -> Vec<VertexKey> {
        let mut out: Vec<VertexKey> = self
            .edges_at(key)
            .into_iter()
            .filter_map(|ek| {
                let (a, b) = self.edge_vertices(ek)?;
                Some(if a == key { b } else { a })
            })
            .collect();
        out.sort();
        out
    }

    /// Vertices in insertion order.
    pub fn vertices_ordered(&self) -> &[VertexKey] {
        &self.vertex_order
    }

    /// Edges in insertion order.
    pub fn edges_ordered(&self) -> &[EdgeKey] {
        &self.edge_order
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
