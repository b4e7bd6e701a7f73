// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries on 2D polygons and polylines.
//!
//! Standard computational geometry, no external kernel: shoelace area,
//! perimeter, area-weighted centroid, segment intersection, simplicity
//! tests and point-in-polygon. Signed area is positive for
//! counter-clockwise boundaries, which is the orientation the face
//! extractor guarantees for candidate rooms.

use nalgebra::Vector2;
use planrecon_core::Point2D;

/// Signed polygon area via the shoelace formula. Positive for
/// counter-clockwise winding. The polygon is implicitly closed (the last
/// vertex connects back to the first).
pub fn signed_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

/// Closed boundary length.
pub fn perimeter(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].distance_to(&points[(i + 1) % n]))
        .sum()
}

/// Area-weighted polygon centroid. Falls back to the vertex mean for
/// near-degenerate polygons where the shoelace area vanishes.
pub fn centroid(points: &[Point2D]) -> Point2D {
    let n = points.len();
    if n == 0 {
        return Point2D::new(0.0, 0.0);
    }

    let area = signed_area(points);
    if area.abs() > 1e-12 {
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            let cross = points[i].x * points[j].y - points[j].x * points[i].y;
            cx += (points[i].x + points[j].x) * cross;
            cy += (points[i].y + points[j].y) * cross;
        }
        Point2D::new(cx / (6.0 * area), cy / (6.0 * area))
    } else {
        let k = n as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2D::new(sx / k, sy / k)
    }
}

/// Axis-aligned bounding box as (min, max) corners.
pub fn bounding_box(points: &[Point2D]) -> Option<(Point2D, Point2D)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

/// Intersection point of two segments if they properly cross, i.e. the
/// crossing lies strictly inside both segments. Parallel and merely
/// touching segments return `None`.
pub fn segment_intersection(
    a1: &Point2D,
    a2: &Point2D,
    b1: &Point2D,
    b2: &Point2D,
) -> Option<Point2D> {
    let da = Vector2::new(a2.x - a1.x, a2.y - a1.y);
    let db = Vector2::new(b2.x - b1.x, b2.y - b1.y);

    let denom = da.x * db.y - da.y * db.x;
    if denom.abs() < 1e-12 {
        return None; // parallel or collinear
    }

    let dx = b1.x - a1.x;
    let dy = b1.y - a1.y;
    let t = (dx * db.y - dy * db.x) / denom;
    let u = (dx * da.y - dy * da.x) / denom;

    const EPS: f64 = 1e-9;
    if t > EPS && t < 1.0 - EPS && u > EPS && u < 1.0 - EPS {
        Some(Point2D::new(a1.x + t * da.x, a1.y + t * da.y))
    } else {
        None
    }
}

/// First self-intersection of an open polyline, if any. Consecutive
/// segments share an endpoint and are not compared.
pub fn polyline_self_intersection(points: &[Point2D]) -> Option<Point2D> {
    let segs = points.len().saturating_sub(1);
    for i in 0..segs {
        for j in (i + 2)..segs {
            if let Some(p) = segment_intersection(
                &points[i],
                &points[i + 1],
                &points[j],
                &points[j + 1],
            ) {
                return Some(p);
            }
        }
    }
    None
}

/// First self-intersection of a closed polygon boundary, if any.
pub fn polygon_self_intersection(points: &[Point2D]) -> Option<Point2D> {
    let n = points.len();
    if n < 4 {
        return None; // a triangle cannot self-intersect
    }
    for i in 0..n {
        for j in (i + 2)..n {
            // Skip adjacent segments, including the wrap-around pair.
            if i == 0 && j == n - 1 {
                continue;
            }
            if let Some(p) = segment_intersection(
                &points[i],
                &points[(i + 1) % n],
                &points[j],
                &points[(j + 1) % n],
            ) {
                return Some(p);
            }
        }
    }
    None
}

/// Ray-casting point-in-polygon test.
pub fn point_in_polygon(point: &Point2D, polygon: &[Point2D]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let (x, y) = (point.x, point.y);
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
