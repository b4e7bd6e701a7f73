// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance snapping: union-find clustering of near-coincident endpoints.
//!
//! Two endpoints belong to the same topological vertex iff their Euclidean
//! distance is at most the snap tolerance. Candidate pairs are merged in
//! ascending distance order (ties broken by endpoint index), so the closest
//! pairs merge first and the result is fully deterministic. Each cluster's
//! vertex position is the centroid of its member endpoints.

use planrecon_core::Point2D;

use crate::error::{Error, Result};

/// Result of snapping a set of raw endpoints.
#[derive(Debug, Clone)]
pub struct SnapOutcome {
    /// One position per distinct vertex, ordered by first endpoint
    /// occurrence. Positions are cluster centroids.
    pub positions: Vec<Point2D>,
    /// Maps each input endpoint index to its vertex index in `positions`.
    pub endpoint_vertex: Vec<usize>,
}

impl SnapOutcome {
    /// Number of distinct vertices after snapping.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Disjoint-set forest over endpoint indices. The representative of a set
/// is always its smallest member index, which keeps cluster numbering
/// independent of merge order.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        // Attach the larger root under the smaller so the representative
        // stays the minimum member index.
        if ra < rb {
            self.parent[rb] = ra;
        } else {
            self.parent[ra] = rb;
        }
    }
}

/// Clusters endpoints within `tolerance` of each other into topological
/// vertices.
///
/// Pairwise candidates are collected, sorted by (distance, index, index)
/// and merged in that order. Vertex indices are assigned by first endpoint
/// occurrence, so the output is stable across reruns of identical input.
pub fn snap_endpoints(endpoints: &[Point2D], tolerance: f64) -> Result<SnapOutcome> {
    if tolerance <= 0.0 || !tolerance.is_finite() {
        return Err(Error::InvalidTolerance(tolerance));
    }

    let n = endpoints.len();
    let mut dsu = UnionFind::new(n);

    // Collect all pairs within tolerance. Quadratic, but endpoint counts
    // per blueprint are small (thousands at most).
    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let d = endpoints[i].distance_to(&endpoints[j]);
            if d <= tolerance {
                candidates.push((d, i, j));
            }
        }
    }
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    for (_, i, j) in candidates {
        dsu.union(i, j);
    }

    // Assign vertex indices by first occurrence of each cluster root.
    let mut root_to_vertex: Vec<Option<usize>> = vec![None; n];
    let mut endpoint_vertex = Vec::with_capacity(n);
    let mut members: Vec<Vec<usize>> = Vec::new();

    for i in 0..n {
        let root = dsu.find(i);
        let vertex = match root_to_vertex[root] {
            Some(v) => v,
            None => {
                let v = members.len();
                root_to_vertex[root] = Some(v);
                members.push(Vec::new());
                v
            }
        };
        members[vertex].push(i);
        endpoint_vertex.push(vertex);
    }

    let positions = members
        .iter()
        .map(|cluster| {
            let k = cluster.len() as f64;
            let (sx, sy) = cluster.iter().fold((0.0, 0.0), |(sx, sy), &i| {
                (sx + endpoints[i].x, sy + endpoints[i].y)
            });
            Point2D::new(sx / k, sy / k)
        })
        .collect();

    Ok(SnapOutcome {
        positions,
        endpoint_vertex,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn merges_points_within_tolerance() {
        let endpoints = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.01, 0.0),
            Point2D::new(5.0, 5.0),
        ];
        let snapped = snap_endpoints(&endpoints, 0.02).unwrap();

        assert_eq!(snapped.vertex_count(), 2);
        assert_eq!(snapped.endpoint_vertex[0], snapped.endpoint_vertex[1]);
        assert_ne!(snapped.endpoint_vertex[0], snapped.endpoint_vertex[2]);
    }

    #[test]
    fn keeps_points_beyond_tolerance_distinct() {
        let endpoints = vec![Point2D::new(0.0, 0.0), Point2D::new(0.5, 0.0)];
        let snapped = snap_endpoints(&endpoints, 0.02).unwrap();
        assert_eq!(snapped.vertex_count(), 2);
    }

    #[test]
    fn vertex_position_is_cluster_centroid() {
        let endpoints = vec![Point2D::new(0.0, 0.0), Point2D::new(0.02, 0.0)];
        let snapped = snap_endpoints(&endpoints, 0.05).unwrap();
        assert_eq!(snapped.vertex_count(), 1);
        assert_relative_eq!(snapped.positions[0].x, 0.01);
        assert_relative_eq!(snapped.positions[0].y, 0.0);
    }

    #[test]
    fn deterministic_across_reruns() {
        let endpoints = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.005, 0.0),
            Point2D::new(0.002, 0.001),
            Point2D::new(1.0, 1.0),
        ];
        let a = snap_endpoints(&endpoints, 0.02).unwrap();
        let b = snap_endpoints(&endpoints, 0.02).unwrap();
        assert_eq!(a.endpoint_vertex, b.endpoint_vertex);
        assert_eq!(a.positions, b.positions);
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        assert!(snap_endpoints(&[], 0.0).is_err());
        assert!(snap_endpoints(&[], -1.0).is_err());
    }

    #[test]
    fn rectangle_with_offset_corners_snaps_to_four_vertices() {
        // Four wall segments whose corners are off by 1.5 cm, tolerance 2 cm.
        let endpoints = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 0.0),
            Point2D::new(4.015, 0.0),
            Point2D::new(4.0, 3.0),
            Point2D::new(4.0, 3.015),
            Point2D::new(0.0, 3.0),
            Point2D::new(0.0, 3.015),
            Point2D::new(0.015, 0.0),
        ];
        let snapped = snap_endpoints(&endpoints, 0.02).unwrap();
        assert_eq!(snapped.vertex_count(), 4);
    }
}
