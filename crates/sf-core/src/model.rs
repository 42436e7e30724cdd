//! Shape model for SketchFrame canvases.
//!
//! Every shape shares an `id` plus stroke/fill styling; the geometry lives in
//! a tagged `ShapeKind`. Serialized form is flat JSON with a `type`
//! discriminant, e.g. `{"id":"…","stroke":"#111","strokeWidth":2,"type":"rect","bounds":{…}}`.

use crate::geometry::{Bounds, Point};
use crate::id::ShapeId;
use serde::{Deserialize, Serialize};

// ─── Tools ───────────────────────────────────────────────────────────────

/// The active tool determines how pointer input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Hand,
    Frame,
    Rect,
    Ellipse,
    Freedraw,
    Arrow,
    Line,
    Text,
    Eraser,
}

impl Tool {
    pub const ALL: [Tool; 10] = [
        Tool::Select,
        Tool::Hand,
        Tool::Frame,
        Tool::Rect,
        Tool::Ellipse,
        Tool::Freedraw,
        Tool::Arrow,
        Tool::Line,
        Tool::Text,
        Tool::Eraser,
    ];

    /// Tools that create a new shape on pointer-down.
    pub fn is_drawing(self) -> bool {
        matches!(
            self,
            Tool::Frame
                | Tool::Rect
                | Tool::Ellipse
                | Tool::Freedraw
                | Tool::Arrow
                | Tool::Line
                | Tool::Text
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Hand => "hand",
            Tool::Frame => "frame",
            Tool::Rect => "rect",
            Tool::Ellipse => "ellipse",
            Tool::Freedraw => "freedraw",
            Tool::Arrow => "arrow",
            Tool::Line => "line",
            Tool::Text => "text",
            Tool::Eraser => "eraser",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|t| t.name() == name)
    }
}

// ─── Styling ─────────────────────────────────────────────────────────────

/// Stroke and fill shared by every shape variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke: "#ffffff".into(),
            stroke_width: 2.0,
            fill: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

/// Typography attributes of a text shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: u16, // 100..900
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    pub text_decoration: TextDecoration,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub text_transform: TextTransform,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            font_family: "Inter, sans-serif".into(),
            font_weight: 400,
            font_style: FontStyle::Normal,
            text_align: TextAlign::Left,
            text_decoration: TextDecoration::None,
            line_height: 1.2,
            letter_spacing: 0.0,
            text_transform: TextTransform::None,
        }
    }
}

/// Rough glyph advance as a fraction of the font size, used when a text
/// shape has no explicit width.
const AVG_GLYPH_WIDTH: f64 = 0.6;

// ─── Shapes ──────────────────────────────────────────────────────────────

/// Variant-specific geometry and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ShapeKind {
    /// Container scoping a region for UI generation. `frame_number` is a
    /// display label, assigned by the shapes reducer and never reused.
    Frame { bounds: Bounds, frame_number: u32 },
    Rect { bounds: Bounds },
    Ellipse { bounds: Bounds },
    Freedraw { points: Vec<Point> },
    Arrow { start: Point, end: Point },
    Line { start: Point, end: Point },
    Text {
        position: Point,
        text: String,
        typography: TextStyle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        w: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        h: Option<f64>,
    },
    /// Output of the generation workflow. `payload` is opaque to the core;
    /// an empty payload marks a pending placeholder.
    GeneratedUi {
        bounds: Bounds,
        payload: String,
        source_frame_id: ShapeId,
    },
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Frame { .. } => "frame",
            ShapeKind::Rect { .. } => "rect",
            ShapeKind::Ellipse { .. } => "ellipse",
            ShapeKind::Freedraw { .. } => "freedraw",
            ShapeKind::Arrow { .. } => "arrow",
            ShapeKind::Line { .. } => "line",
            ShapeKind::Text { .. } => "text",
            ShapeKind::GeneratedUi { .. } => "generatedui",
        }
    }
}

/// A single canvas entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    pub fn new(id: ShapeId, style: &ShapeStyle, kind: ShapeKind) -> Self {
        Self {
            id,
            stroke: style.stroke.clone(),
            stroke_width: style.stroke_width,
            fill: style.fill.clone(),
            kind,
        }
    }

    pub fn style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke: self.stroke.clone(),
            stroke_width: self.stroke_width,
            fill: self.fill.clone(),
        }
    }

    pub fn is_frame(&self) -> bool {
        matches!(self.kind, ShapeKind::Frame { .. })
    }

    pub fn frame_number(&self) -> Option<u32> {
        match self.kind {
            ShapeKind::Frame { frame_number, .. } => Some(frame_number),
            _ => None,
        }
    }

    /// World-space bounding box. Derived for freedraw, lines and text.
    pub fn bounds(&self) -> Bounds {
        match &self.kind {
            ShapeKind::Frame { bounds, .. }
            | ShapeKind::Rect { bounds }
            | ShapeKind::Ellipse { bounds }
            | ShapeKind::GeneratedUi { bounds, .. } => *bounds,
            ShapeKind::Freedraw { points } => {
                Bounds::enclosing(points.iter().copied()).unwrap_or_default()
            }
            ShapeKind::Arrow { start, end } | ShapeKind::Line { start, end } => {
                Bounds::from_corners(*start, *end)
            }
            ShapeKind::Text {
                position,
                text,
                typography,
                w,
                h,
            } => {
                let lines = text.lines().count().max(1) as f64;
                let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
                let est_w = longest * typography.font_size * AVG_GLYPH_WIDTH
                    + longest * typography.letter_spacing;
                let est_h = lines * typography.font_size * typography.line_height;
                Bounds::new(
                    position.x,
                    position.y,
                    w.unwrap_or(est_w),
                    h.unwrap_or(est_h),
                )
            }
        }
    }

    /// Shift every coordinate by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let shift = Point::new(dx, dy);
        match &mut self.kind {
            ShapeKind::Frame { bounds, .. }
            | ShapeKind::Rect { bounds }
            | ShapeKind::Ellipse { bounds }
            | ShapeKind::GeneratedUi { bounds, .. } => *bounds = bounds.translated(dx, dy),
            ShapeKind::Freedraw { points } => {
                for p in points.iter_mut() {
                    *p = *p + shift;
                }
            }
            ShapeKind::Arrow { start, end } | ShapeKind::Line { start, end } => {
                *start = *start + shift;
                *end = *end + shift;
            }
            ShapeKind::Text { position, .. } => *position = *position + shift,
        }
    }

    /// Affinely map the shape from the `from` box onto the `to` box.
    ///
    /// Used by resize: a single shape is remapped from its own bounds, a
    /// multi-selection from the group bounds. A degenerate source axis maps
    /// by offset only.
    pub fn remap(&mut self, from: &Bounds, to: &Bounds) {
        let sx = if from.w > 0.0 { to.w / from.w } else { 1.0 };
        let sy = if from.h > 0.0 { to.h / from.h } else { 1.0 };
        let map = |p: Point| Point::new(to.x + (p.x - from.x) * sx, to.y + (p.y - from.y) * sy);
        let map_box = |b: &Bounds| Bounds::from_corners(map(b.min()), map(b.max()));

        match &mut self.kind {
            ShapeKind::Frame { bounds, .. }
            | ShapeKind::Rect { bounds }
            | ShapeKind::Ellipse { bounds }
            | ShapeKind::GeneratedUi { bounds, .. } => *bounds = map_box(bounds),
            ShapeKind::Freedraw { points } => {
                for p in points.iter_mut() {
                    *p = map(*p);
                }
            }
            ShapeKind::Arrow { start, end } | ShapeKind::Line { start, end } => {
                *start = map(*start);
                *end = map(*end);
            }
            ShapeKind::Text { position, w, h, .. } => {
                *position = map(*position);
                if let Some(w) = w {
                    *w *= sx;
                }
                if let Some(h) = h {
                    *h *= sy;
                }
            }
        }
    }

    /// Merge a partial update into the shape. Fields that do not apply to
    /// this variant are ignored; the variant itself can never change.
    pub fn apply_patch(&mut self, patch: &ShapePatch) {
        if let Some(stroke) = &patch.stroke {
            self.stroke = stroke.clone();
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = width.max(0.0);
        }
        if let Some(fill) = &patch.fill {
            self.fill = fill.clone();
        }

        match &mut self.kind {
            ShapeKind::Frame { bounds, .. }
            | ShapeKind::Rect { bounds }
            | ShapeKind::Ellipse { bounds } => {
                if let Some(b) = patch.bounds {
                    *bounds = b;
                }
            }
            ShapeKind::GeneratedUi {
                bounds, payload, ..
            } => {
                if let Some(b) = patch.bounds {
                    *bounds = b;
                }
                if let Some(p) = &patch.payload {
                    *payload = p.clone();
                }
            }
            ShapeKind::Freedraw { points } => {
                if let Some(p) = &patch.points {
                    *points = p.clone();
                }
            }
            ShapeKind::Arrow { start, end } | ShapeKind::Line { start, end } => {
                if let Some((s, e)) = patch.endpoints {
                    *start = s;
                    *end = e;
                }
            }
            ShapeKind::Text {
                position,
                text,
                typography,
                w,
                h,
            } => {
                if let Some(p) = patch.position {
                    *position = p;
                }
                if let Some(t) = &patch.text {
                    *text = t.clone();
                }
                if let Some(ty) = &patch.typography {
                    *typography = ty.clone();
                }
                if let Some((new_w, new_h)) = patch.text_size {
                    *w = new_w;
                    *h = new_h;
                }
            }
        }
    }
}

/// Partial update for `updateShape`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    /// `Some(None)` clears the fill.
    pub fill: Option<Option<String>>,
    /// Frame, rect, ellipse, generated UI.
    pub bounds: Option<Bounds>,
    /// Text anchor.
    pub position: Option<Point>,
    /// Explicit text layout size override.
    pub text_size: Option<(Option<f64>, Option<f64>)>,
    /// Arrow and line endpoints.
    pub endpoints: Option<(Point, Point)>,
    /// Freedraw stroke.
    pub points: Option<Vec<Point>>,
    pub text: Option<String>,
    pub typography: Option<TextStyle>,
    pub payload: Option<String>,
}

impl ShapePatch {
    /// A patch carrying all of `shape`'s geometry, used to commit live
    /// drag/resize results back through the reducer.
    pub fn geometry_of(shape: &Shape) -> Self {
        let mut patch = ShapePatch::default();
        match &shape.kind {
            ShapeKind::Frame { bounds, .. }
            | ShapeKind::Rect { bounds }
            | ShapeKind::Ellipse { bounds }
            | ShapeKind::GeneratedUi { bounds, .. } => patch.bounds = Some(*bounds),
            ShapeKind::Freedraw { points } => patch.points = Some(points.clone()),
            ShapeKind::Arrow { start, end } | ShapeKind::Line { start, end } => {
                patch.endpoints = Some((*start, *end));
            }
            ShapeKind::Text { position, w, h, .. } => {
                patch.position = Some(*position);
                patch.text_size = Some((*w, *h));
            }
        }
        patch
    }

    pub fn with_style(style: &ShapeStyle) -> Self {
        Self {
            stroke: Some(style.stroke.clone()),
            stroke_width: Some(style.stroke_width),
            fill: Some(style.fill.clone()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ShapePatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::new(
            ShapeId::intern(id),
            &ShapeStyle::default(),
            ShapeKind::Rect {
                bounds: Bounds::new(x, y, w, h),
            },
        )
    }

    #[test]
    fn shape_json_is_flat_with_type_tag() {
        let json = serde_json::to_value(rect("r1", 1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json["type"], "rect");
        assert_eq!(json["id"], "r1");
        assert_eq!(json["strokeWidth"], 2.0);
        assert_eq!(json["bounds"]["w"], 3.0);
        assert!(json.get("fill").is_none());
    }

    #[test]
    fn generated_ui_tag_and_fields() {
        let shape = Shape::new(
            ShapeId::intern("g1"),
            &ShapeStyle::default(),
            ShapeKind::GeneratedUi {
                bounds: Bounds::new(0.0, 0.0, 10.0, 10.0),
                payload: "<div/>".into(),
                source_frame_id: ShapeId::intern("f1"),
            },
        );
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "generatedui");
        assert_eq!(json["sourceFrameId"], "f1");
        let back: Shape = serde_json::from_value(json).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = serde_json::from_str::<Shape>(
            r##"{"id":"x","stroke":"#000","strokeWidth":1,"type":"star","bounds":{"x":0,"y":0,"w":1,"h":1}}"##,
        );
        assert!(err.is_err());
    }

    #[test]
    fn derived_bounds() {
        let line = Shape::new(
            ShapeId::intern("l1"),
            &ShapeStyle::default(),
            ShapeKind::Line {
                start: Point::new(50.0, 10.0),
                end: Point::new(10.0, 30.0),
            },
        );
        assert_eq!(line.bounds(), Bounds::new(10.0, 10.0, 40.0, 20.0));

        let stroke = Shape::new(
            ShapeId::intern("d1"),
            &ShapeStyle::default(),
            ShapeKind::Freedraw {
                points: vec![Point::new(1.0, 1.0), Point::new(5.0, -3.0)],
            },
        );
        assert_eq!(stroke.bounds(), Bounds::new(1.0, -3.0, 4.0, 4.0));
    }

    #[test]
    fn text_bounds_prefer_explicit_size() {
        let mut text = Shape::new(
            ShapeId::intern("t1"),
            &ShapeStyle::default(),
            ShapeKind::Text {
                position: Point::new(5.0, 5.0),
                text: "hello\nworld!".into(),
                typography: TextStyle {
                    font_size: 10.0,
                    line_height: 1.0,
                    ..Default::default()
                },
                w: None,
                h: None,
            },
        );
        let b = text.bounds();
        assert!((b.w - 36.0).abs() < 1e-9);
        assert!((b.h - 20.0).abs() < 1e-9);

        text.apply_patch(&ShapePatch {
            text_size: Some((Some(100.0), Some(40.0))),
            ..Default::default()
        });
        assert_eq!(text.bounds(), Bounds::new(5.0, 5.0, 100.0, 40.0));
    }

    #[test]
    fn patch_ignores_fields_of_other_variants() {
        let mut r = rect("r2", 0.0, 0.0, 10.0, 10.0);
        r.apply_patch(&ShapePatch {
            points: Some(vec![Point::new(1.0, 1.0)]),
            text: Some("nope".into()),
            stroke_width: Some(-3.0),
            ..Default::default()
        });
        assert_eq!(r.kind, ShapeKind::Rect {
            bounds: Bounds::new(0.0, 0.0, 10.0, 10.0)
        });
        assert_eq!(r.stroke_width, 0.0);
    }

    #[test]
    fn remap_scales_relative_to_source_box() {
        let mut r = rect("r3", 10.0, 10.0, 10.0, 10.0);
        r.remap(
            &Bounds::new(0.0, 0.0, 100.0, 100.0),
            &Bounds::new(0.0, 0.0, 200.0, 50.0),
        );
        assert_eq!(r.bounds(), Bounds::new(20.0, 5.0, 20.0, 5.0));
    }

    #[test]
    fn tool_names_roundtrip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("lasso"), None);
    }
}
