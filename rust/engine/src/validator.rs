// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry validation: every candidate entity is either accepted with
//! computed metrics or rejected with a reason and a location.
//!
//! Rejection is local: only the offending entity is excluded from the
//! model. Whether a rejection invalidates the whole job is the flagger's
//! decision, keyed off the issue kind.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use planrecon_core::{
    DetectionKind, EngineConfig, Issue, IssueKind, IssueLocation, Opening, RawDetection, Room,
    RoomKind, SpatialVertex, VertexId, Wall, WallKind,
};
use planrecon_topology::geometry;

use crate::builder::BuiltTopology;

/// Validated entities plus the issues produced while validating.
#[derive(Debug, Clone, Default)]
pub struct ValidatedModel {
    pub vertices: Vec<SpatialVertex>,
    pub rooms: Vec<Room>,
    pub walls: Vec<Wall>,
    pub openings: Vec<Opening>,
    pub issues: Vec<Issue>,
}

/// Validates the built topology against the source detections.
pub fn validate(
    built: &BuiltTopology,
    detections: &[RawDetection],
    config: &EngineConfig,
) -> ValidatedModel {
    let mut model = ValidatedModel {
        vertices: built.vertices.clone(),
        ..Default::default()
    };

    let rejected_detections = check_wall_polylines(detections, &mut model.issues);
    report_degenerate_segments(built, &mut model.issues);

    // How many candidate rooms each edge bounds, for wall classification:
    // a partition wall shared by two rooms is interior, a wall bounding one
    // room faces the outside.
    let mut edge_room_count: FxHashMap<(VertexId, VertexId), u32> = FxHashMap::default();
    for room in &built.rooms {
        let n = room.boundary.len();
        for i in 0..n {
            let a = room.boundary[i];
            let b = room.boundary[(i + 1) % n];
            let pair = if a < b { (a, b) } else { (b, a) };
            *edge_room_count.entry(pair).or_insert(0) += 1;
        }
    }

    accept_walls(built, config, &rejected_detections, &edge_room_count, &mut model);
    accept_rooms(built, config, &mut model);
    accept_openings(built, config, &mut model);

    debug!(
        walls = model.walls.len(),
        rooms = model.rooms.len(),
        openings = model.openings.len(),
        issues = model.issues.len(),
        "validation complete"
    );

    model
}

/// A wall polyline that crosses itself is physically impossible; the
/// intersection coordinate is reported and every segment it produced is
/// excluded.
fn check_wall_polylines(detections: &[RawDetection], issues: &mut Vec<Issue>) -> FxHashSet<usize> {
    let mut rejected = FxHashSet::default();
    for (index, detection) in detections.iter().enumerate() {
        if detection.kind != DetectionKind::Wall {
            continue;
        }
        if let Some(p) = geometry::polyline_self_intersection(&detection.polyline) {
            issues.push(Issue::error(
                IssueKind::ImpossibleGeometry,
                IssueLocation::Point(p),
                format!(
                    "wall polyline crosses itself at ({:.3}, {:.3})",
                    p.x, p.y
                ),
            ));
            rejected.insert(index);
        }
    }
    rejected
}

fn report_degenerate_segments(built: &BuiltTopology, issues: &mut Vec<Issue>) {
    for &(index, position) in &built.degenerate_segments {
        issues.push(Issue::error(
            IssueKind::DegenerateWall,
            IssueLocation::Point(position),
            format!("wall segment from detection {index} collapsed to a point after snapping"),
        ));
    }
}

fn accept_walls(
    built: &BuiltTopology,
    config: &EngineConfig,
    rejected_detections: &FxHashSet<usize>,
    edge_room_count: &FxHashMap<(VertexId, VertexId), u32>,
    model: &mut ValidatedModel,
) {
    for seed in &built.walls {
        if seed.sources.iter().any(|s| rejected_detections.contains(s)) {
            // Already covered by the polyline-level issue.
            continue;
        }
        if config.default_wall_thickness <= 0.0 || config.default_wall_height <= 0.0 {
            model.issues.push(Issue::error(
                IssueKind::DegenerateWall,
                IssueLocation::Wall { id: seed.id },
                "wall thickness/height is not positive",
            ));
            continue;
        }

        let pair = if seed.start < seed.end {
            (seed.start, seed.end)
        } else {
            (seed.end, seed.start)
        };
        let kind = match edge_room_count.get(&pair).copied().unwrap_or(0) {
            0 => WallKind::Unknown,
            1 => WallKind::Exterior,
            _ => WallKind::Interior,
        };

        model.walls.push(Wall {
            id: seed.id,
            start: seed.start,
            end: seed.end,
            thickness: config.default_wall_thickness,
            height: config.default_wall_height,
            confidence: seed.confidence,
            kind,
        });
    }
}

fn accept_rooms(built: &BuiltTopology, config: &EngineConfig, model: &mut ValidatedModel) {
    // Wall confidence lookup for room confidence aggregation.
    let wall_confidence: FxHashMap<(VertexId, VertexId), f64> = model
        .walls
        .iter()
        .map(|w| {
            let pair = if w.start < w.end {
                (w.start, w.end)
            } else {
                (w.end, w.start)
            };
            (pair, w.confidence)
        })
        .collect();

    for candidate in &built.rooms {
        let points = built.boundary_points(candidate);
        let distinct = distinct_count(&candidate.boundary);

        if distinct < 3 {
            model.issues.push(Issue::error(
                IssueKind::ImpossibleGeometry,
                IssueLocation::Room { id: candidate.id },
                format!("room boundary has only {distinct} distinct vertices after snapping"),
            ));
            continue;
        }

        let area = geometry::signed_area(&points);
        if area <= 0.0 {
            model.issues.push(Issue::error(
                IssueKind::ImpossibleGeometry,
                IssueLocation::Room { id: candidate.id },
                format!("room area is not positive ({area:.6} m^2)"),
            ));
            continue;
        }

        if let Some(p) = geometry::polygon_self_intersection(&points) {
            model.issues.push(Issue::error(
                IssueKind::ImpossibleGeometry,
                IssueLocation::Room { id: candidate.id },
                format!(
                    "room boundary self-intersects at ({:.3}, {:.3})",
                    p.x, p.y
                ),
            ));
            continue;
        }

        let n = candidate.boundary.len();
        let mut confidences = Vec::with_capacity(n);
        for i in 0..n {
            let a = candidate.boundary[i];
            let b = candidate.boundary[(i + 1) % n];
            let pair = if a < b { (a, b) } else { (b, a) };
            if let Some(&c) = wall_confidence.get(&pair) {
                confidences.push(c);
            }
        }
        let confidence = if confidences.is_empty() {
            0.0
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        };

        model.rooms.push(Room {
            id: candidate.id,
            boundary: candidate.boundary.clone(),
            area,
            perimeter: geometry::perimeter(&points),
            centroid: geometry::centroid(&points),
            height: config.default_wall_height,
            kind: RoomKind::Unknown,
            confidence,
        });
    }
}

fn accept_openings(built: &BuiltTopology, config: &EngineConfig, model: &mut ValidatedModel) {
    let wall_length: FxHashMap<_, _> = model
        .walls
        .iter()
        .filter_map(|w| {
            let pa = built.position(w.start)?;
            let pb = built.position(w.end)?;
            Some((w.id, pa.distance_to(&pb)))
        })
        .collect();

    // Accepted spans per wall, for overlap checking in offset order.
    let mut spans: FxHashMap<_, Vec<(f64, f64)>> = FxHashMap::default();

    const EPS: f64 = 1e-9;
    for opening in &built.openings {
        let Some(&length) = wall_length.get(&opening.wall) else {
            model.issues.push(Issue::warning(
                IssueKind::AmbiguousRegion,
                IssueLocation::Opening {
                    id: opening.id,
                    wall: opening.wall,
                },
                "opening references a wall that was rejected",
            ));
            continue;
        };

        // Clamp a vanishing negative offset before the span check, so an
        // opening accepted here always satisfies the export bound too.
        let offset = opening.offset.max(0.0);
        if opening.offset < -EPS || offset + opening.width > length + EPS {
            model.issues.push(Issue::error(
                IssueKind::OpeningOutOfSpan,
                IssueLocation::Opening {
                    id: opening.id,
                    wall: opening.wall,
                },
                format!(
                    "opening spans [{:.3}, {:.3}] outside wall length {:.3}",
                    opening.offset,
                    opening.offset + opening.width,
                    length
                ),
            ));
            continue;
        }

        let wall_spans = spans.entry(opening.wall).or_default();
        let start = offset;
        let end = offset + opening.width;
        let overlapping = wall_spans.iter().any(|&(s, e)| {
            let overlap = end.min(e) - start.max(s);
            overlap > config.opening_overlap_tolerance
        });
        if overlapping {
            model.issues.push(Issue::error(
                IssueKind::OpeningOverlap,
                IssueLocation::Opening {
                    id: opening.id,
                    wall: opening.wall,
                },
                "opening overlaps another opening on the same wall",
            ));
            continue;
        }
        wall_spans.push((start, end));

        model.openings.push(Opening {
            offset,
            ..opening.clone()
        });
    }
}

fn distinct_count(boundary: &[VertexId]) -> usize {
    let mut seen: Vec<VertexId> = boundary.to_vec();
    seen.sort();
    seen.dedup();
    seen.len()
}
