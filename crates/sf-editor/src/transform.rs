//! Drag and resize geometry.
//!
//! Resize anchors the edge or corner opposite the grabbed handle. A box can
//! never invert: when the pointer crosses the anchor, the dragged side
//! stops at `min_size` from it.

use sf_core::geometry::{Bounds, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::Top,
        ResizeHandle::TopRight,
        ResizeHandle::Right,
        ResizeHandle::BottomRight,
        ResizeHandle::Bottom,
        ResizeHandle::BottomLeft,
        ResizeHandle::Left,
    ];

    /// Horizontal and vertical edge this handle moves: -1 = min edge,
    /// 1 = max edge, 0 = untouched.
    fn sides(self) -> (i8, i8) {
        match self {
            ResizeHandle::TopLeft => (-1, -1),
            ResizeHandle::Top => (0, -1),
            ResizeHandle::TopRight => (1, -1),
            ResizeHandle::Right => (1, 0),
            ResizeHandle::BottomRight => (1, 1),
            ResizeHandle::Bottom => (0, 1),
            ResizeHandle::BottomLeft => (-1, 1),
            ResizeHandle::Left => (-1, 0),
        }
    }

    pub fn is_corner(self) -> bool {
        let (h, v) = self.sides();
        h != 0 && v != 0
    }

    /// World position of the handle on `b`.
    pub fn position(self, b: &Bounds) -> Point {
        let (h, v) = self.sides();
        let pick = |side: i8, min: f64, size: f64| match side {
            -1 => min,
            1 => min + size,
            _ => min + size / 2.0,
        };
        Point::new(pick(h, b.x, b.w), pick(v, b.y, b.h))
    }

    /// CSS cursor shown while hovering or dragging this handle.
    pub fn cursor_name(self) -> &'static str {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::BottomRight => "nwse-resize",
            ResizeHandle::TopRight | ResizeHandle::BottomLeft => "nesw-resize",
            ResizeHandle::Top | ResizeHandle::Bottom => "ns-resize",
            ResizeHandle::Left | ResizeHandle::Right => "ew-resize",
        }
    }
}

/// The handle whose square of side `size` (world units) contains `p`.
/// Corners are checked first so they win where squares overlap.
pub fn handle_at(b: &Bounds, p: Point, size: f64) -> Option<ResizeHandle> {
    let half = size / 2.0;
    let mut order = ResizeHandle::ALL;
    order.sort_by_key(|h| !h.is_corner());
    order.into_iter().find(|h| {
        let c = h.position(b);
        (p.x - c.x).abs() <= half && (p.y - c.y).abs() <= half
    })
}

/// Resize `original` by moving `handle` to `pointer`.
///
/// The opposite edge stays fixed. Each moved edge is clamped to stay at
/// least `min_size` away from its anchor. With `keep_aspect` and a corner
/// handle the original aspect ratio is kept (the larger scale wins).
pub fn resize_bounds(
    original: &Bounds,
    handle: ResizeHandle,
    pointer: Point,
    min_size: f64,
    keep_aspect: bool,
) -> Bounds {
    let (h, v) = handle.sides();
    let (x0, x1) = resize_axis(original.x, original.right(), h, pointer.x, min_size);
    let (y0, y1) = resize_axis(original.y, original.bottom(), v, pointer.y, min_size);
    let mut out = Bounds::new(x0, y0, x1 - x0, y1 - y0);

    if keep_aspect && handle.is_corner() && original.w > 0.0 && original.h > 0.0 {
        let scale = (out.w / original.w).max(out.h / original.h);
        let w = (original.w * scale).max(min_size);
        let hgt = (original.h * scale).max(min_size);
        out.x = if h < 0 { original.right() - w } else { original.x };
        out.y = if v < 0 { original.bottom() - hgt } else { original.y };
        out.w = w;
        out.h = hgt;
    }
    out
}

fn resize_axis(min: f64, max: f64, side: i8, pointer: f64, min_size: f64) -> (f64, f64) {
    match side {
        -1 => (pointer.min(max - min_size), max),
        1 => (min, pointer.max(min + min_size)),
        _ => (min, max),
    }
}

/// Keep only the dominant component of a drag delta.
pub fn constrain_axis(dx: f64, dy: f64) -> (f64, f64) {
    if dx.abs() >= dy.abs() {
        (dx, 0.0)
    } else {
        (0.0, dy)
    }
}

/// Corner opposite `start` for a square box following `current`.
pub fn square_corner(start: Point, current: Point) -> Point {
    let dx = current.x - start.x;
    let dy = current.y - start.y;
    let side = dx.abs().max(dy.abs());
    Point::new(
        start.x + side.copysign(dx),
        start.y + side.copysign(dy),
    )
}

/// Snap `end` so the segment from `start` lies on a multiple of 45°,
/// keeping its length.
pub fn snap_angle(start: Point, end: Point) -> Point {
    let d = end - start;
    let len = d.x.hypot(d.y);
    if len == 0.0 {
        return end;
    }
    let step = std::f64::consts::FRAC_PI_4;
    let angle = (d.y.atan2(d.x) / step).round() * step;
    Point::new(start.x + len * angle.cos(), start.y + len * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BOX: Bounds = Bounds::new(100.0, 100.0, 50.0, 40.0);

    #[test]
    fn right_handle_keeps_left_edge() {
        let b = resize_bounds(&BOX, ResizeHandle::Right, Point::new(200.0, 0.0), 1.0, false);
        assert_eq!(b, Bounds::new(100.0, 100.0, 100.0, 40.0));
    }

    #[test]
    fn dragging_past_the_anchor_clamps_to_min_size() {
        let b = resize_bounds(
            &BOX,
            ResizeHandle::BottomRight,
            Point::new(20.0, 20.0),
            1.0,
            false,
        );
        assert_eq!(b, Bounds::new(100.0, 100.0, 1.0, 1.0));

        let b = resize_bounds(&BOX, ResizeHandle::TopLeft, Point::new(400.0, 400.0), 1.0, false);
        assert_eq!(b, Bounds::new(149.0, 139.0, 1.0, 1.0));
        assert!(b.w > 0.0 && b.h > 0.0);
    }

    #[test]
    fn edge_handles_leave_other_axis_alone() {
        let b = resize_bounds(&BOX, ResizeHandle::Top, Point::new(999.0, 80.0), 1.0, false);
        assert_eq!(b, Bounds::new(100.0, 80.0, 50.0, 60.0));
    }

    #[test]
    fn aspect_lock_on_corner() {
        let b = resize_bounds(
            &BOX,
            ResizeHandle::BottomRight,
            Point::new(250.0, 150.0),
            1.0,
            true,
        );
        assert_eq!(b, Bounds::new(100.0, 100.0, 150.0, 120.0));
    }

    #[test]
    fn handle_lookup_prefers_corners() {
        let tiny = Bounds::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(
            handle_at(&tiny, Point::new(0.0, 0.0), 8.0),
            Some(ResizeHandle::TopLeft)
        );
        assert_eq!(
            handle_at(&BOX, Point::new(125.0, 141.0), 8.0),
            Some(ResizeHandle::Bottom)
        );
        assert_eq!(handle_at(&BOX, Point::new(125.0, 120.0), 8.0), None);
    }

    #[test]
    fn constraints() {
        assert_eq!(constrain_axis(5.0, -2.0), (5.0, 0.0));
        assert_eq!(constrain_axis(1.0, -3.0), (0.0, -3.0));
        assert_eq!(
            square_corner(Point::new(10.0, 10.0), Point::new(4.0, 30.0)),
            Point::new(-10.0, 30.0)
        );
        let snapped = snap_angle(Point::ORIGIN, Point::new(10.0, 1.0));
        assert!((snapped.y).abs() < 1e-9);
        assert!((snapped.x - 101f64.sqrt()).abs() < 1e-9);
    }
}
