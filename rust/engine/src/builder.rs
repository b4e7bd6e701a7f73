// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology building: snaps normalized wall endpoints into topological
//! vertices, assembles the planar wall graph, extracts candidate rooms as
//! minimal faces and attaches door/window detections to their host walls.
//!
//! Public entity ids (`VertexId`, `WallId`, `RoomId`, `OpeningId`) are
//! assigned here in deterministic first-occurrence order, which is what
//! makes reruns of identical input byte-identical downstream.

use rustc_hash::FxHashMap;
use tracing::debug;

use planrecon_core::{
    DetectionKind, EngineConfig, EngineError, Issue, IssueKind, IssueLocation, Opening,
    OpeningId, OpeningKind, Point2D, RawDetection, Result, RoomId, SpatialVertex, Stage,
    VertexId, WallId,
};
use planrecon_topology::{extract_faces, geometry, snap_endpoints, PlanarArena};

/// A candidate wall edge, before validation.
#[derive(Debug, Clone)]
pub struct WallSeed {
    pub id: WallId,
    pub start: VertexId,
    pub end: VertexId,
    /// Highest confidence among the source detections.
    pub confidence: f64,
    /// Indices of the detections that produced this edge.
    pub sources: Vec<usize>,
}

/// A candidate room boundary, before validation.
#[derive(Debug, Clone)]
pub struct CandidateRoom {
    pub id: RoomId,
    /// Counter-clockwise closed boundary, first vertex not repeated.
    pub boundary: Vec<VertexId>,
}

/// Output of the topology building stage.
#[derive(Debug, Clone, Default)]
pub struct BuiltTopology {
    pub vertices: Vec<SpatialVertex>,
    pub walls: Vec<WallSeed>,
    pub rooms: Vec<CandidateRoom>,
    pub openings: Vec<Opening>,
    /// Wall segments collapsed to a point by snapping, with the collapse
    /// location and the source detection index.
    pub degenerate_segments: Vec<(usize, Point2D)>,
    pub issues: Vec<Issue>,
}

impl BuiltTopology {
    /// Position lookup by dense vertex id.
    pub fn position(&self, id: VertexId) -> Option<Point2D> {
        self.vertices.get(id.0 as usize).map(|v| v.position)
    }

    /// Boundary coordinates of a candidate room.
    pub fn boundary_points(&self, room: &CandidateRoom) -> Vec<Point2D> {
        room.boundary
            .iter()
            .filter_map(|&v| self.position(v))
            .collect()
    }
}

/// Builds the planar topology from normalized detections.
pub fn build_topology(
    detections: &[RawDetection],
    config: &EngineConfig,
    snap_tolerance: f64,
) -> Result<BuiltTopology> {
    let mut built = BuiltTopology::default();

    // Collect wall segment endpoints in detection order: the snapper's
    // tie-break on equal distances is the original detection index.
    let mut endpoints: Vec<Point2D> = Vec::new();
    let mut segments: Vec<(usize, usize, usize, f64)> = Vec::new(); // (ep_a, ep_b, detection, confidence)

    for (index, detection) in detections.iter().enumerate() {
        if detection.kind != DetectionKind::Wall {
            continue;
        }
        if detection.polyline.len() < 2 {
            built.issues.push(Issue::warning(
                IssueKind::AmbiguousRegion,
                IssueLocation::Detection { index },
                "wall polyline has fewer than 2 points",
            ));
            continue;
        }
        for pair in detection.polyline.windows(2) {
            let a = endpoints.len();
            endpoints.push(pair[0]);
            let b = endpoints.len();
            endpoints.push(pair[1]);
            segments.push((a, b, index, detection.confidence));
        }
    }

    let snapped = snap_endpoints(&endpoints, snap_tolerance).map_err(|e| match e {
        planrecon_topology::Error::InvalidTolerance(t) => {
            EngineError::InvalidConfig(format!("snap tolerance {t} is not positive"))
        }
        other => EngineError::Transient {
            stage: Stage::Snap,
            detail: other.to_string(),
        },
    })?;

    if snapped.endpoint_vertex.len() != endpoints.len() {
        // A broken snap mapping is unexpected but worth one retry with an
        // alternate tolerance before declaring the job failed.
        return Err(EngineError::Transient {
            stage: Stage::Snap,
            detail: format!(
                "snap produced {} endpoint mappings for {} endpoints",
                snapped.endpoint_vertex.len(),
                endpoints.len()
            ),
        });
    }

    // Vertices: cluster index order doubles as the public id.
    let mut arena = PlanarArena::new();
    let mut cluster_keys = Vec::with_capacity(snapped.positions.len());
    for (i, p) in snapped.positions.iter().enumerate() {
        let key = arena.add_vertex(p.x, p.y);
        cluster_keys.push(key);
        built.vertices.push(SpatialVertex {
            id: VertexId(i as u32),
            position: *p,
        });
    }

    // Edges, deduplicating parallel segments onto one wall seed.
    let mut edge_seeds: FxHashMap<planrecon_topology::EdgeKey, (f64, Vec<usize>)> =
        FxHashMap::default();
    for &(ep_a, ep_b, index, confidence) in &segments {
        let ca = snapped.endpoint_vertex[ep_a];
        let cb = snapped.endpoint_vertex[ep_b];
        if ca == cb {
            built
                .degenerate_segments
                .push((index, snapped.positions[ca]));
            continue;
        }
        let edge = arena
            .add_edge(cluster_keys[ca], cluster_keys[cb])
            .map_err(|e| EngineError::Transient {
                stage: Stage::Build,
                detail: e.to_string(),
            })?;
        let entry = edge_seeds.entry(edge).or_insert((confidence, Vec::new()));
        entry.0 = entry.0.max(confidence);
        entry.1.push(index);
    }

    // Wall ids follow edge insertion order.
    let key_to_id: FxHashMap<_, _> = cluster_keys
        .iter()
        .enumerate()
        .map(|(i, &k)| (k, VertexId(i as u32)))
        .collect();

    let mut edge_to_wall: FxHashMap<planrecon_topology::EdgeKey, WallId> = FxHashMap::default();
    for (i, &edge) in arena.edges_ordered().iter().enumerate() {
        let Some((a, b)) = arena.edge_vertices(edge) else {
            continue;
        };
        let (confidence, sources) = edge_seeds.get(&edge).cloned().unwrap_or((0.0, Vec::new()));
        let id = WallId(i as u32);
        edge_to_wall.insert(edge, id);
        built.walls.push(WallSeed {
            id,
            start: key_to_id[&a],
            end: key_to_id[&b],
            confidence,
            sources,
        });
    }

    // Faces become candidate rooms; open endpoints are flagged for review.
    let face_set = extract_faces(&arena);
    for (i, face) in face_set.faces.iter().enumerate() {
        built.rooms.push(CandidateRoom {
            id: RoomId(i as u32),
            boundary: face.iter().map(|k| key_to_id[k]).collect(),
        });
    }
    for &open in &face_set.open_vertices {
        let id = key_to_id[&open];
        if let Some(position) = built.position(id) {
            built.issues.push(Issue::warning(
                IssueKind::UnclosedBoundary,
                IssueLocation::Vertex { id, position },
                format!(
                    "boundary does not close at ({:.3}, {:.3})",
                    position.x, position.y
                ),
            ));
        }
    }
    for &edge in &face_set.open_edges {
        if let Some(&id) = edge_to_wall.get(&edge) {
            built.issues.push(Issue::warning(
                IssueKind::UnclosedBoundary,
                IssueLocation::Wall { id },
                "wall belongs to a chain that closes no boundary",
            ));
        }
    }
    // Bridges and chords survive pruning but bound no room.
    for &edge in &face_set.standalone_edges {
        if let Some(&id) = edge_to_wall.get(&edge) {
            built.issues.push(Issue::warning(
                IssueKind::AmbiguousRegion,
                IssueLocation::Wall { id },
                "wall bounds no room",
            ));
        }
    }

    debug!(
        vertices = built.vertices.len(),
        walls = built.walls.len(),
        rooms = built.rooms.len(),
        open_endpoints = face_set.open_vertices.len(),
        "topology built"
    );

    attach_openings(detections, config, &mut built);
    check_room_hints(detections, &mut built);

    Ok(built)
}

/// Attaches door/window detections to the nearest wall within the
/// configured attach distance, deriving the offset along the wall span.
fn attach_openings(detections: &[RawDetection], config: &EngineConfig, built: &mut BuiltTopology) {
    let mut next_id = 0u32;

    for (index, detection) in detections.iter().enumerate() {
        let kind = match detection.kind {
            DetectionKind::Door => OpeningKind::Door,
            DetectionKind::Window => OpeningKind::Window,
            _ => continue,
        };

        let Some(midpoint) = detection.centroid() else {
            built.issues.push(Issue::warning(
                IssueKind::AmbiguousRegion,
                IssueLocation::Detection { index },
                "opening detection has an empty polyline",
            ));
            continue;
        };

        let mut width = detection.length();
        if width <= 0.0 {
            width = config.default_opening_width;
        }

        // Nearest wall by perpendicular distance to the clamped projection.
        let mut best: Option<(f64, f64, WallId)> = None; // (distance, along, wall)
        for wall in &built.walls {
            let (Some(pa), Some(pb)) = (built.position(wall.start), built.position(wall.end))
            else {
                continue;
            };
            let dx = pb.x - pa.x;
            let dy = pb.y - pa.y;
            let len_sq = dx * dx + dy * dy;
            if len_sq <= 0.0 {
                continue;
            }
            let t = ((midpoint.x - pa.x) * dx + (midpoint.y - pa.y) * dy) / len_sq;
            let tc = t.clamp(0.0, 1.0);
            let closest = Point2D::new(pa.x + tc * dx, pa.y + tc * dy);
            let distance = midpoint.distance_to(&closest);
            let along = t * len_sq.sqrt();

            let better = match best {
                None => true,
                Some((d, _, _)) => distance < d,
            };
            if better {
                best = Some((distance, along, wall.id));
            }
        }

        match best {
            Some((distance, along, wall)) if distance <= config.opening_attach_distance => {
                built.openings.push(Opening {
                    id: OpeningId(next_id),
                    wall,
                    offset: along - width / 2.0,
                    width,
                    kind,
                    confidence: detection.confidence,
                });
                next_id += 1;
            }
            _ => {
                built.issues.push(Issue::warning(
                    IssueKind::AmbiguousRegion,
                    IssueLocation::Point(midpoint),
                    format!(
                        "opening at ({:.3}, {:.3}) is not near any wall",
                        midpoint.x, midpoint.y
                    ),
                ));
            }
        }
    }
}

/// Room hints must fall inside some closed room; a hint that does not is
/// evidence of a boundary the builder failed to close.
fn check_room_hints(detections: &[RawDetection], built: &mut BuiltTopology) {
    let boundaries: Vec<Vec<Point2D>> = built
        .rooms
        .iter()
        .map(|r| built.boundary_points(r))
        .collect();

    for detection in detections {
        if detection.kind != DetectionKind::RoomHint {
            continue;
        }
        let Some(point) = detection.centroid() else {
            continue;
        };
        let inside_any = boundaries
            .iter()
            .any(|b| geometry::point_in_polygon(&point, b));
        if !inside_any {
            built.issues.push(Issue::warning(
                IssueKind::AmbiguousRegion,
                IssueLocation::Point(point),
                format!(
                    "room hint at ({:.3}, {:.3}) lies in no closed room",
                    point.x, point.y
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planrecon_core::DetectionKind;

    fn wall(points: &[(f64, f64)], confidence: f64) -> RawDetection {
        RawDetection::new(
            DetectionKind::Wall,
            points.iter().map(|&(x, y)| Point2D::new(x, y)).collect(),
            confidence,
        )
    }

    fn rectangle() -> Vec<RawDetection> {
        vec![
            wall(&[(0.0, 0.0), (4.0, 0.0)], 0.9),
            wall(&[(4.0, 0.0), (4.0, 3.0)], 0.9),
            wall(&[(4.0, 3.0), (0.0, 3.0)], 0.9),
            wall(&[(0.0, 3.0), (0.0, 0.0)], 0.9),
        ]
    }

    #[test]
    fn rectangle_builds_one_room() {
        let built = build_topology(&rectangle(), &EngineConfig::default(), 0.02).unwrap();
        assert_eq!(built.vertices.len(), 4);
        assert_eq!(built.walls.len(), 4);
        assert_eq!(built.rooms.len(), 1);
        assert_eq!(built.rooms[0].boundary.len(), 4);
        assert!(built.issues.is_empty());
    }

    #[test]
    fn corner_offsets_within_tolerance_are_absorbed() {
        let detections = vec![
            wall(&[(0.0, 0.0), (4.0, 0.0)], 0.9),
            wall(&[(4.015, 0.0), (4.0, 3.0)], 0.9),
            wall(&[(4.0, 3.015), (0.0, 3.0)], 0.9),
            wall(&[(0.0, 3.01), (0.015, 0.0)], 0.9),
        ];
        let built = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();
        assert_eq!(built.vertices.len(), 4);
        assert_eq!(built.rooms.len(), 1);
    }

    #[test]
    fn gap_beyond_tolerance_leaves_boundary_open() {
        let detections = vec![
            wall(&[(0.0, 0.0), (4.0, 0.0)], 0.9),
            wall(&[(4.0, 0.0), (4.0, 3.0)], 0.9),
            wall(&[(4.0, 3.0), (0.0, 3.0)], 0.9),
            wall(&[(0.0, 3.0), (0.0, 0.5)], 0.9), // 50 cm short of closing
        ];
        let built = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();
        assert!(built.rooms.is_empty());
        assert!(built
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::UnclosedBoundary));
    }

    #[test]
    fn pruned_chain_cites_its_walls() {
        let detections = vec![
            wall(&[(0.0, 0.0), (4.0, 0.0)], 0.9),
            wall(&[(4.0, 0.0), (4.0, 3.0)], 0.9),
            wall(&[(4.0, 3.0), (0.0, 3.0)], 0.9),
            wall(&[(0.0, 3.0), (0.0, 0.5)], 0.9),
        ];
        let built = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();

        // Besides the gap endpoints, every wall of the open chain is cited.
        let cited_walls = built
            .issues
            .iter()
            .filter(|i| {
                i.kind == IssueKind::UnclosedBoundary
                    && matches!(i.location, IssueLocation::Wall { .. })
            })
            .count();
        assert_eq!(cited_walls, 4);
    }

    #[test]
    fn bridge_wall_bounding_no_room_is_flagged() {
        let detections = vec![
            wall(&[(0.0, 0.0), (1.0, 0.0)], 0.9),
            wall(&[(1.0, 0.0), (0.5, 1.0)], 0.9),
            wall(&[(0.5, 1.0), (0.0, 0.0)], 0.9),
            // Bridge between the two triangles
            wall(&[(1.0, 0.0), (3.0, 0.0)], 0.9),
            wall(&[(3.0, 0.0), (4.0, 0.0)], 0.9),
            wall(&[(4.0, 0.0), (3.5, 1.0)], 0.9),
            wall(&[(3.5, 1.0), (3.0, 0.0)], 0.9),
        ];
        let built = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();

        assert_eq!(built.rooms.len(), 2);
        assert!(built.issues.iter().any(|i| {
            i.kind == IssueKind::AmbiguousRegion
                && matches!(i.location, IssueLocation::Wall { .. })
        }));
    }

    #[test]
    fn collapsed_segment_is_recorded_as_degenerate() {
        let detections = vec![wall(&[(0.0, 0.0), (0.01, 0.0)], 0.9)];
        let built = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();
        assert!(built.walls.is_empty());
        assert_eq!(built.degenerate_segments.len(), 1);
        assert_eq!(built.degenerate_segments[0].0, 0);
    }

    #[test]
    fn door_attaches_to_nearest_wall() {
        let mut detections = rectangle();
        detections.push(RawDetection::new(
            DetectionKind::Door,
            vec![Point2D::new(1.5, 0.0), Point2D::new(2.5, 0.0)],
            0.8,
        ));
        let built = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();
        assert_eq!(built.openings.len(), 1);

        let opening = &built.openings[0];
        assert_eq!(opening.kind, OpeningKind::Door);
        assert!((opening.width - 1.0).abs() < 1e-9);
        assert!((opening.offset - 1.5).abs() < 1e-9);
    }

    #[test]
    fn far_opening_is_flagged_not_attached() {
        let mut detections = rectangle();
        detections.push(RawDetection::new(
            DetectionKind::Window,
            vec![Point2D::new(10.0, 10.0), Point2D::new(10.5, 10.0)],
            0.8,
        ));
        let built = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();
        assert!(built.openings.is_empty());
        assert!(built
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::AmbiguousRegion));
    }

    #[test]
    fn room_hint_outside_any_room_is_flagged() {
        let mut detections = rectangle();
        detections.push(RawDetection::new(
            DetectionKind::RoomHint,
            vec![Point2D::new(9.0, 9.0)],
            0.7,
        ));
        let built = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();
        assert!(built
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::AmbiguousRegion));
    }

    #[test]
    fn room_hint_inside_room_is_quiet() {
        let mut detections = rectangle();
        detections.push(RawDetection::new(
            DetectionKind::RoomHint,
            vec![Point2D::new(2.0, 1.5)],
            0.7,
        ));
        let built = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();
        assert!(built.issues.is_empty());
    }

    #[test]
    fn deterministic_ids_across_reruns() {
        let detections = rectangle();
        let a = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();
        let b = build_topology(&detections, &EngineConfig::default(), 0.02).unwrap();
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(
            a.rooms.iter().map(|r| &r.boundary).collect::<Vec<_>>(),
            b.rooms.iter().map(|r| &r.boundary).collect::<Vec<_>>()
        );
    }
}
