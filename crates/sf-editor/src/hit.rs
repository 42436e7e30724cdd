//! Hit testing: world point → shape lookup.
//!
//! Walks the paint order in reverse (front-to-back) so the topmost shape
//! wins. `tolerance` is in world units; callers convert from screen pixels
//! by dividing by the viewport scale.

use sf_core::geometry::{Bounds, Point};
use sf_core::model::{Shape, ShapeKind};
use sf_core::{EntityState, ShapeId};
use smallvec::SmallVec;

/// Find the topmost shape at `p`. Returns `None` for empty canvas.
pub fn hit_test(shapes: &EntityState<Shape>, p: Point, tolerance: f64) -> Option<ShapeId> {
    shapes
        .iter()
        .rev()
        .find(|shape| shape_contains(shape, p, tolerance))
        .map(|shape| shape.id)
}

/// Find all shapes whose bounds intersect `rect`, in paint order.
/// Used for marquee (box) selection.
pub fn hit_test_rect(shapes: &EntityState<Shape>, rect: &Bounds) -> Vec<ShapeId> {
    shapes
        .iter()
        .filter(|shape| rect.intersects(&shape.bounds()))
        .map(|shape| shape.id)
        .collect()
}

/// Every shape whose bounds, grown by `tolerance`, contain `p`.
/// Used by the eraser.
pub fn shapes_under(shapes: &EntityState<Shape>, p: Point, tolerance: f64) -> SmallVec<[ShapeId; 4]> {
    shapes
        .iter()
        .filter(|shape| shape.bounds().inflate(tolerance).contains(p))
        .map(|shape| shape.id)
        .collect()
}

/// Precise per-variant containment.
pub fn shape_contains(shape: &Shape, p: Point, tolerance: f64) -> bool {
    let reach = tolerance + shape.stroke_width / 2.0;
    match &shape.kind {
        ShapeKind::Frame { bounds, .. }
        | ShapeKind::Rect { bounds }
        | ShapeKind::GeneratedUi { bounds, .. } => bounds.inflate(reach).contains(p),
        ShapeKind::Ellipse { bounds } => ellipse_contains(bounds, p, reach),
        ShapeKind::Text { .. } => shape.bounds().inflate(tolerance).contains(p),
        ShapeKind::Arrow { start, end } | ShapeKind::Line { start, end } => {
            distance_to_segment(p, *start, *end) <= reach
        }
        ShapeKind::Freedraw { points } => match points.as_slice() {
            [] => false,
            [only] => only.distance_to(p) <= reach,
            _ => points
                .windows(2)
                .any(|w| distance_to_segment(p, w[0], w[1]) <= reach),
        },
    }
}

fn ellipse_contains(b: &Bounds, p: Point, reach: f64) -> bool {
    let rx = b.w / 2.0 + reach;
    let ry = b.h / 2.0 + reach;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = b.center();
    let nx = (p.x - c.x) / rx;
    let ny = (p.y - c.y) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Shortest distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + ab.x * t, a.y + ab.y * t))
}
