//! Viewport state machine: scale, pan offset and pan mode.
//!
//! ```text
//! idle ──beginPan──────▶ panning ──updatePan──▶ panning ──endPan──────▶ idle
//! idle ──beginShiftPan─▶ shiftPanning ──updateShiftPan──▶ … ──endShiftPan─▶ idle
//! ```
//!
//! Pan-start anchors are `Some` exactly when the mode is not idle. Viewport
//! changes are never recorded in undo history.

use crate::geometry::{Bounds, Point, Size, screen_to_world, world_to_screen};
use serde::{Deserialize, Serialize};

/// Tunables for a viewport, copied into the state on creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Discrete zoom multiplies or divides the scale by `1 + zoom_step`.
    pub zoom_step: f64,
    /// World units panned per wheel delta unit (before scale).
    pub wheel_pan_speed: f64,
    /// Screen-space padding kept around content by zoom-to-fit.
    pub fit_margin: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 8.0,
            zoom_step: 0.1,
            wheel_pan_speed: 1.0,
            fit_margin: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanMode {
    #[default]
    Idle,
    Panning,
    ShiftPanning,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub translate: Point,
    pub mode: PanMode,
    pub pan_start_screen: Option<Point>,
    pub pan_start_translate: Option<Point>,
    pub wheel_pan_speed: f64,
    pub zoom_step: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}

/// Everything the viewport reducer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportAction {
    BeginPan { screen: Point },
    UpdatePan { screen: Point },
    EndPan,
    BeginShiftPan { screen: Point },
    UpdateShiftPan { screen: Point },
    EndShiftPan,
    /// Scroll-wheel pan by a raw wheel delta.
    WheelPan { dx: f64, dy: f64 },
    ZoomIn { focus: Option<Point> },
    ZoomOut { focus: Option<Point> },
    /// Multiply the scale by `factor` (pinch / ctrl+wheel).
    ZoomBy { factor: f64, focus: Option<Point> },
    ResetZoom,
    ZoomToFit {
        content: Bounds,
        screen: Size,
        margin: f64,
    },
    /// Rehydration escape hatch: replaces the whole state unchecked.
    Restore(ViewportState),
}

impl ViewportState {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            scale: 1.0_f64.clamp(config.min_scale, config.max_scale),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            translate: Point::ORIGIN,
            mode: PanMode::Idle,
            pan_start_screen: None,
            pan_start_translate: None,
            wheel_pan_speed: config.wheel_pan_speed,
            zoom_step: config.zoom_step,
        }
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        world_to_screen(world, self.scale, self.translate)
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        screen_to_world(screen, self.scale, self.translate)
    }

    /// World-space region currently visible in a viewport of `screen` size.
    pub fn visible_world(&self, screen: Size) -> Bounds {
        Bounds::from_corners(
            self.screen_to_world(Point::ORIGIN),
            self.screen_to_world(Point::new(screen.width, screen.height)),
        )
    }

    pub fn is_panning(&self) -> bool {
        self.mode != PanMode::Idle
    }

    /// Same view, with any in-flight pan dropped.
    pub fn settled(mut self) -> Self {
        self.mode = PanMode::Idle;
        self.pan_start_screen = None;
        self.pan_start_translate = None;
        self
    }

    /// Pure transition function.
    pub fn reduce(mut self, action: ViewportAction) -> Self {
        match action {
            ViewportAction::BeginPan { screen } => self.begin_pan(PanMode::Panning, screen),
            ViewportAction::UpdatePan { screen } => self.update_pan(PanMode::Panning, screen),
            ViewportAction::EndPan => self.end_pan(PanMode::Panning),
            ViewportAction::BeginShiftPan { screen } => {
                self.begin_pan(PanMode::ShiftPanning, screen)
            }
            ViewportAction::UpdateShiftPan { screen } => {
                self.update_pan(PanMode::ShiftPanning, screen)
            }
            ViewportAction::EndShiftPan => self.end_pan(PanMode::ShiftPanning),
            ViewportAction::WheelPan { dx, dy } => {
                self.translate.x -= dx * self.wheel_pan_speed;
                self.translate.y -= dy * self.wheel_pan_speed;
            }
            ViewportAction::ZoomIn { focus } => {
                let factor = 1.0 + self.zoom_step;
                self.zoom_to(self.scale * factor, focus);
            }
            ViewportAction::ZoomOut { focus } => {
                let factor = 1.0 + self.zoom_step;
                self.zoom_to(self.scale / factor, focus);
            }
            ViewportAction::ZoomBy { factor, focus } => {
                if factor.is_finite() && factor > 0.0 {
                    self.zoom_to(self.scale * factor, focus);
                }
            }
            ViewportAction::ResetZoom => {
                self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
                self.translate = Point::ORIGIN;
            }
            ViewportAction::ZoomToFit {
                content,
                screen,
                margin,
            } => self.zoom_to_fit(content, screen, margin),
            ViewportAction::Restore(state) => return state,
        }
        self
    }

    fn begin_pan(&mut self, mode: PanMode, screen: Point) {
        if self.mode != PanMode::Idle {
            log::trace!("begin {mode:?} ignored while {:?}", self.mode);
            return;
        }
        self.mode = mode;
        self.pan_start_screen = Some(screen);
        self.pan_start_translate = Some(self.translate);
    }

    fn update_pan(&mut self, mode: PanMode, screen: Point) {
        if self.mode != mode {
            return;
        }
        if let (Some(start_screen), Some(start_translate)) =
            (self.pan_start_screen, self.pan_start_translate)
        {
            self.translate = start_translate + (screen - start_screen);
        }
    }

    fn end_pan(&mut self, mode: PanMode) {
        if self.mode != mode {
            return;
        }
        self.mode = PanMode::Idle;
        self.pan_start_screen = None;
        self.pan_start_translate = None;
    }

    /// Set the scale (clamped), keeping the world point under `focus` fixed.
    fn zoom_to(&mut self, scale: f64, focus: Option<Point>) {
        let new_scale = scale.clamp(self.min_scale, self.max_scale);
        if let Some(focus) = focus {
            let anchored = self.screen_to_world(focus);
            self.translate = Point::new(
                focus.x - anchored.x * new_scale,
                focus.y - anchored.y * new_scale,
            );
        }
        self.scale = new_scale;
    }

    /// Fit `content` into `screen` with `margin` pixels of padding, centered.
    /// Never zooms in past 100 %.
    fn zoom_to_fit(&mut self, content: Bounds, screen: Size, margin: f64) {
        if !content.is_finite() {
            return;
        }
        let avail_w = (screen.width - margin * 2.0).max(1.0);
        let avail_h = (screen.height - margin * 2.0).max(1.0);
        let fit_w = if content.w > 0.0 { avail_w / content.w } else { f64::INFINITY };
        let fit_h = if content.h > 0.0 { avail_h / content.h } else { f64::INFINITY };
        let scale = fit_w
            .min(fit_h)
            .min(1.0)
            .clamp(self.min_scale, self.max_scale);

        let center = content.center();
        let screen_center = screen.center();
        self.scale = scale;
        self.translate = Point::new(
            screen_center.x - center.x * scale,
            screen_center.y - center.y * scale,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state() -> ViewportState {
        ViewportState::default()
    }

    #[test]
    fn pan_lifecycle_sets_and_clears_anchors() {
        let v = state().reduce(ViewportAction::BeginPan {
            screen: Point::new(100.0, 100.0),
        });
        assert_eq!(v.mode, PanMode::Panning);
        assert_eq!(v.pan_start_screen, Some(Point::new(100.0, 100.0)));
        assert_eq!(v.pan_start_translate, Some(Point::ORIGIN));

        let v = v.reduce(ViewportAction::UpdatePan {
            screen: Point::new(130.0, 80.0),
        });
        assert_eq!(v.translate, Point::new(30.0, -20.0));

        let v = v.reduce(ViewportAction::EndPan);
        assert_eq!(v.mode, PanMode::Idle);
        assert_eq!(v.pan_start_screen, None);
        assert_eq!(v.pan_start_translate, None);
        assert_eq!(v.translate, Point::new(30.0, -20.0));
    }

    #[test]
    fn shift_pan_is_exclusive_with_pan() {
        let v = state().reduce(ViewportAction::BeginShiftPan {
            screen: Point::new(0.0, 0.0),
        });
        let v = v.reduce(ViewportAction::BeginPan {
            screen: Point::new(50.0, 50.0),
        });
        assert_eq!(v.mode, PanMode::ShiftPanning);
        assert_eq!(v.pan_start_screen, Some(Point::ORIGIN));

        // Ordinary pan updates do not drive a shift pan.
        let v = v.reduce(ViewportAction::UpdatePan {
            screen: Point::new(10.0, 10.0),
        });
        assert_eq!(v.translate, Point::ORIGIN);
        let v = v.reduce(ViewportAction::UpdateShiftPan {
            screen: Point::new(10.0, 10.0),
        });
        assert_eq!(v.translate, Point::new(10.0, 10.0));

        let v = v.reduce(ViewportAction::EndPan);
        assert_eq!(v.mode, PanMode::ShiftPanning);
        let v = v.reduce(ViewportAction::EndShiftPan);
        assert_eq!(v.mode, PanMode::Idle);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut v = state();
        for _ in 0..100 {
            v = v.reduce(ViewportAction::ZoomIn { focus: None });
        }
        assert_eq!(v.scale, 8.0);
        for _ in 0..200 {
            v = v.reduce(ViewportAction::ZoomOut { focus: None });
        }
        assert_eq!(v.scale, 0.1);
    }

    #[test]
    fn zoom_keeps_focus_point_fixed() {
        let v = state().reduce(ViewportAction::WheelPan { dx: 37.0, dy: -12.0 });
        let focus = Point::new(320.0, 240.0);
        let before = v.screen_to_world(focus);
        let v = v.reduce(ViewportAction::ZoomBy {
            factor: 2.5,
            focus: Some(focus),
        });
        let after = v.world_to_screen(before);
        assert!((after.x - focus.x).abs() < 1e-9);
        assert!((after.y - focus.y).abs() < 1e-9);
        assert_eq!(v.scale, 2.5);
    }

    #[test]
    fn reset_zoom_returns_to_identity() {
        let v = state()
            .reduce(ViewportAction::ZoomIn {
                focus: Some(Point::new(10.0, 10.0)),
            })
            .reduce(ViewportAction::ResetZoom);
        assert_eq!(v.scale, 1.0);
        assert_eq!(v.translate, Point::ORIGIN);
    }

    #[test]
    fn zoom_to_fit_centers_and_never_zooms_past_one() {
        let screen = Size::new(800.0, 600.0);
        let content = Bounds::new(0.0, 0.0, 400.0, 300.0);
        let v = state().reduce(ViewportAction::ZoomToFit {
            content,
            screen,
            margin: 40.0,
        });
        assert!(v.scale <= 1.0);
        let min = v.world_to_screen(content.min());
        let max = v.world_to_screen(content.max());
        assert!(min.x >= 40.0 - 1e-9 && min.y >= 40.0 - 1e-9);
        assert!(max.x <= 760.0 + 1e-9 && max.y <= 560.0 + 1e-9);
        // Centered on both axes.
        assert!(((min.x + max.x) / 2.0 - 400.0).abs() < 1e-9);
        assert!(((min.y + max.y) / 2.0 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_to_fit_shrinks_large_content() {
        let v = state().reduce(ViewportAction::ZoomToFit {
            content: Bounds::new(-1000.0, 0.0, 4000.0, 500.0),
            screen: Size::new(800.0, 600.0),
            margin: 40.0,
        });
        assert!((v.scale - 720.0 / 4000.0).abs() < 1e-12);
        let min = v.world_to_screen(Point::new(-1000.0, 0.0));
        assert!((min.x - 40.0).abs() < 1e-9);
    }

    #[test]
    fn restore_replaces_everything() {
        let mut saved = state();
        saved.scale = 3.0;
        saved.translate = Point::new(5.0, 6.0);
        let v = state()
            .reduce(ViewportAction::BeginPan {
                screen: Point::ORIGIN,
            })
            .reduce(ViewportAction::Restore(saved));
        assert_eq!(v, saved);
    }
}
