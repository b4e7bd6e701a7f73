// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal-face extraction from the planar wall graph.
//!
//! The classic planar traversal: every undirected edge is split into two
//! half-edges, outgoing half-edges are sorted by angle around their vertex,
//! and faces are walked by always turning to the clockwise-previous
//! half-edge at each vertex. Walked this way, every bounded face comes out
//! counter-clockwise (positive signed area) and the single unbounded outer
//! face of each component comes out clockwise and is discarded.
//!
//! Dangling chains (vertices of degree 1) can never bound a face and are
//! pruned first; their edges are reported as unclosed-boundary candidates
//! and the originally-open endpoints are kept for the review report.

use rustc_hash::{FxHashMap, FxHashSet};

use planrecon_core::Point2D;

use crate::arena::PlanarArena;
use crate::geometry::signed_area;
use crate::keys::{EdgeKey, VertexKey};

/// Result of face extraction.
#[derive(Debug, Clone, Default)]
pub struct FaceSet {
    /// Bounded faces as counter-clockwise vertex cycles (first vertex not
    /// repeated), in canonical deterministic order.
    pub faces: Vec<Vec<VertexKey>>,
    /// Edges pruned because they hang off a dangling chain and cannot
    /// close a boundary.
    pub open_edges: Vec<EdgeKey>,
    /// Vertices that had degree 1 before pruning: the endpoints at which
    /// a boundary fails to close.
    pub open_vertices: Vec<VertexKey>,
    /// Surviving edges that bound no interior face (e.g. a bridge between
    /// two loops); retained as standalone wall candidates.
    pub standalone_edges: Vec<EdgeKey>,
}

const AREA_EPS: f64 = 1e-12;

/// Extracts every minimal bounded face of the arena's planar graph.
pub fn extract_faces(arena: &PlanarArena) -> FaceSet {
    let mut result = FaceSet::default();

    // Working adjacency: vertex -> incident edges, mutated by pruning.
    let mut incident: FxHashMap<VertexKey, FxHashSet<EdgeKey>> = FxHashMap::default();
    for &v in arena.vertices_ordered() {
        incident.insert(v, arena.edges_at(v).into_iter().collect());
    }

    prune_dangling(arena, &mut incident, &mut result);

    // Directed half-edges of the surviving graph, outgoing lists sorted by
    // angle around each vertex.
    let outgoing = build_outgoing(arena, &incident);

    let mut visited: FxHashSet<(VertexKey, VertexKey)> = FxHashSet::default();
    let mut interior_edges: FxHashSet<EdgeKey> = FxHashSet::default();
    let mut faces: Vec<Vec<VertexKey>> = Vec::new();

    let pruned: FxHashSet<EdgeKey> = result.open_edges.iter().copied().collect();

    for &edge in arena.edges_ordered() {
        if pruned.contains(&edge) {
            continue;
        }
        let Some((start, end)) = arena.edge_vertices(edge) else {
            continue;
        };
        for (u, v) in [(start, end), (end, start)] {
            if visited.contains(&(u, v)) {
                continue;
            }
            if let Some(cycle) = walk_face(arena, &outgoing, &mut visited, u, v) {
                let points: Vec<Point2D> = cycle
                    .iter()
                    .filter_map(|&vk| arena.vertex_point(vk))
                    .map(|p| Point2D::new(p.x, p.y))
                    .collect();

                if cycle.len() >= 3 && signed_area(&points) > AREA_EPS {
                    for w in cycle_edge_pairs(&cycle) {
                        if let Some(ek) = arena.find_edge(w.0, w.1) {
                            interior_edges.insert(ek);
                        }
                    }
                    faces.push(canonical_rotation(cycle));
                }
            }
        }
    }

    faces.sort();
    result.faces = faces;

    result.standalone_edges = arena
        .edges_ordered()
        .iter()
        .copied()
        .filter(|e| !pruned.contains(e) && !interior_edges.contains(e))
        .collect();

    result
}

/// Iteratively removes degree-1 chains. Edges removed here can never bound
/// a face; the vertices that were open before pruning started are the
/// reportable gap locations.
fn prune_dangling(
    arena: &PlanarArena,
    incident: &mut FxHashMap<VertexKey, FxHashSet<EdgeKey>>,
    result: &mut FaceSet,
) {
    let mut queue: Vec<VertexKey> = Vec::new();
    for &v in arena.vertices_ordered() {
        if incident.get(&v).map_or(0, |s| s.len()) == 1 {
            result.open_vertices.push(v);
            queue.push(v);
        }
    }

    let mut removed: FxHashSet<EdgeKey> = FxHashSet::default();
    while let Some(v) = queue.pop() {
        let Some(edges) = incident.get(&v) else {
            continue;
        };
        if edges.len() != 1 {
            continue;
        }
        let Some(&edge) = edges.iter().next() else {
            continue;
        };
        if !removed.insert(edge) {
            continue;
        }

        let Some((a, b)) = arena.edge_vertices(edge) else {
            continue;
        };
        let other = if a == v { b } else { a };

        incident.entry(v).or_default().remove(&edge);
        incident.entry(other).or_default().remove(&edge);
        if incident.get(&other).map_or(0, |s| s.len()) == 1 {
            queue.push(other);
        }
    }

    // Report pruned edges in deterministic (insertion) order.
    result.open_edges = arena
        .edges_ordered()
        .iter()
        .copied()
        .filter(|e| removed.contains(e))
        .collect();
}

type Outgoing = FxHashMap<VertexKey, Vec<VertexKey>>;

/// Builds per-vertex outgoing neighbor lists sorted by angle (ascending
/// atan2), over the surviving adjacency only.
fn build_outgoing(
    arena: &PlanarArena,
    incident: &FxHashMap<VertexKey, FxHashSet<EdgeKey>>,
) -> Outgoing {
    let mut outgoing: Outgoing = FxHashMap::default();

    for &v in arena.vertices_ordered() {
        let Some(edges) = incident.get(&v) else {
            continue;
        };
        if edges.is_empty() {
            continue;
        }
        let Some(origin) = arena.vertex_point(v) else {
            continue;
        };

        let mut sorted_edges: Vec<EdgeKey> = edges.iter().copied().collect();
        sorted_edges.sort();

        let mut neighbors: Vec<(f64, VertexKey)> = sorted_edges
            .into_iter()
            .filter_map(|ek| {
                let (a, b) = arena.edge_vertices(ek)?;
                let to = if a == v { b } else { a };
                let p = arena.vertex_point(to)?;
                let angle = (p.y - origin.y).atan2(p.x - origin.x);
                Some((angle, to))
            })
            .collect();
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));

        outgoing.insert(v, neighbors.into_iter().map(|(_, to)| to).collect());
    }

    outgoing
}

/// Walks one face starting at directed half-edge (u, v). Returns the vertex
/// cycle unless it revisits an undirected edge (a bridge walk, not a simple
/// face).
fn walk_face(
    arena: &PlanarArena,
    outgoing: &Outgoing,
    visited: &mut FxHashSet<(VertexKey, VertexKey)>,
    u: VertexKey,
    v: VertexKey,
) -> Option<Vec<VertexKey>> {
    let mut cycle: Vec<VertexKey> = Vec::new();
    let mut used_edges: FxHashSet<EdgeKey> = FxHashSet::default();
    let mut simple = true;

    let (mut cu, mut cv) = (u, v);
    // Bound the walk by the half-edge count to stay safe against a broken
    // adjacency index.
    let max_steps = arena.edge_count() * 2 + 1;

    for _ in 0..max_steps {
        visited.insert((cu, cv));
        cycle.push(cu);

        if let Some(ek) = arena.find_edge(cu, cv) {
            if !used_edges.insert(ek) {
                simple = false;
            }
        }

        let out = outgoing.get(&cv)?;
        let back_idx = out.iter().position(|&w| w == cu)?;
        let next = out[(back_idx + out.len() - 1) % out.len()];

        cu = cv;
        cv = next;

        if (cu, cv) == (u, v) {
            return simple.then_some(cycle);
        }
    }

    None
}

/// Consecutive vertex pairs of a cycle, including the closing pair.
fn cycle_edge_pairs(cycle: &[VertexKey]) -> impl Iterator<Item = (VertexKey, VertexKey)> + '_ {
    let n = cycle.len();
    (0..n).map(move |i| (cycle[i], cycle[(i + 1) % n]))
}

/// Rotates a cycle so its smallest vertex key comes first, preserving
/// orientation. Gives faces a canonical form for deterministic output.
fn canonical_rotation(cycle: Vec<VertexKey>) -> Vec<VertexKey> {
    if cycle.is_empty() {
        return cycle;
    }
    let min_idx = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| **v)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = Vec::with_capacity(cycle.len());
    rotated.extend_from_slice(&cycle[min_idx..]);
    rotated.extend_from_slice(&cycle[..min_idx]);
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::signed_area;

    fn face_points(arena: &PlanarArena, face: &[VertexKey]) -> Vec<Point2D> {
        face.iter()
            .map(|&v| {
                let p = arena.vertex_point(v).unwrap();
                Point2D::new(p.x, p.y)
            })
            .collect()
    }

    #[test]
    fn square_yields_one_ccw_face() {
        let mut arena = PlanarArena::new();
        let v0 = arena.add_vertex(0.0, 0.0);
        let v1 = arena.add_vertex(4.0, 0.0);
        let v2 = arena.add_vertex(4.0, 3.0);
        let v3 = arena.add_vertex(0.0, 3.0);
        arena.add_edge(v0, v1).unwrap();
        arena.add_edge(v1, v2).unwrap();
        arena.add_edge(v2, v3).unwrap();
        arena.add_edge(v3, v0).unwrap();

        let set = extract_faces(&arena);
        assert_eq!(set.faces.len(), 1);
        assert!(set.open_edges.is_empty());
        assert!(set.standalone_edges.is_empty());

        let points = face_points(&arena, &set.faces[0]);
        assert!((signed_area(&points) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn open_rectangle_yields_no_face_and_cites_gap_endpoints() {
        let mut arena = PlanarArena::new();
        let v0 = arena.add_vertex(0.0, 0.0);
        let v1 = arena.add_vertex(4.0, 0.0);
        let v2 = arena.add_vertex(4.0, 3.0);
        let v3 = arena.add_vertex(0.0, 3.0);
        // Gap: v3 does not connect back to v0; a separate vertex sits 0.5 away.
        let v4 = arena.add_vertex(0.0, 0.5);
        arena.add_edge(v0, v1).unwrap();
        arena.add_edge(v1, v2).unwrap();
        arena.add_edge(v2, v3).unwrap();
        arena.add_edge(v3, v4).unwrap();

        let set = extract_faces(&arena);
        assert!(set.faces.is_empty());
        assert_eq!(set.open_edges.len(), 4);
        // The originally-open endpoints are the chain ends.
        assert!(set.open_vertices.contains(&v0));
        assert!(set.open_vertices.contains(&v4));
    }

    #[test]
    fn shared_wall_bounds_two_faces() {
        // Two rooms side by side: a 2x1 domino split by a middle wall.
        let mut arena = PlanarArena::new();
        let v0 = arena.add_vertex(0.0, 0.0);
        let v1 = arena.add_vertex(1.0, 0.0);
        let v2 = arena.add_vertex(2.0, 0.0);
        let v3 = arena.add_vertex(2.0, 1.0);
        let v4 = arena.add_vertex(1.0, 1.0);
        let v5 = arena.add_vertex(0.0, 1.0);
        arena.add_edge(v0, v1).unwrap();
        arena.add_edge(v1, v2).unwrap();
        arena.add_edge(v2, v3).unwrap();
        arena.add_edge(v3, v4).unwrap();
        arena.add_edge(v4, v5).unwrap();
        arena.add_edge(v5, v0).unwrap();
        let shared = arena.add_edge(v1, v4).unwrap();

        let set = extract_faces(&arena);
        assert_eq!(set.faces.len(), 2);
        assert!(set.standalone_edges.is_empty());

        // The shared wall appears in both face boundaries.
        let contains_shared = |face: &Vec<VertexKey>| {
            cycle_edge_pairs(face).any(|(a, b)| arena.find_edge(a, b) == Some(shared))
        };
        assert!(set.faces.iter().all(contains_shared));

        for face in &set.faces {
            let points = face_points(&arena, face);
            assert!((signed_area(&points) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn dangling_stub_is_pruned_but_room_survives() {
        let mut arena = PlanarArena::new();
        let v0 = arena.add_vertex(0.0, 0.0);
        let v1 = arena.add_vertex(1.0, 0.0);
        let v2 = arena.add_vertex(1.0, 1.0);
        let v3 = arena.add_vertex(0.0, 1.0);
        let stub = arena.add_vertex(2.0, 0.0);
        arena.add_edge(v0, v1).unwrap();
        arena.add_edge(v1, v2).unwrap();
        arena.add_edge(v2, v3).unwrap();
        arena.add_edge(v3, v0).unwrap();
        let stub_edge = arena.add_edge(v1, stub).unwrap();

        let set = extract_faces(&arena);
        assert_eq!(set.faces.len(), 1);
        assert_eq!(set.open_edges, vec![stub_edge]);
        assert_eq!(set.open_vertices, vec![stub]);
    }

    #[test]
    fn deterministic_face_ordering() {
        let build = || {
            let mut arena = PlanarArena::new();
            let v0 = arena.add_vertex(0.0, 0.0);
            let v1 = arena.add_vertex(1.0, 0.0);
            let v2 = arena.add_vertex(2.0, 0.0);
            let v3 = arena.add_vertex(2.0, 1.0);
            let v4 = arena.add_vertex(1.0, 1.0);
            let v5 = arena.add_vertex(0.0, 1.0);
            for (a, b) in [(v0, v1), (v1, v2), (v2, v3), (v3, v4), (v4, v5), (v5, v0), (v1, v4)] {
                arena.add_edge(a, b).unwrap();
            }
            extract_faces(&arena).faces
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn empty_graph_yields_nothing() {
        let arena = PlanarArena::new();
        let set = extract_faces(&arena);
        assert!(set.faces.is_empty());
        assert!(set.open_edges.is_empty());
        assert!(set.standalone_edges.is_empty());
    }
}
