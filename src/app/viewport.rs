use eframe::egui::{Pos2, Rect, Vec2, vec2};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 4.0;
pub const ZOOM_ANIMATION_SECS: f32 = 0.3;
pub const FIT_ANIMATION_SECS: f32 = 0.5;

/// Pan/zoom state applied when rendering. Replaced wholesale on every
/// zoom, pan, or fit event — the renderer reads exactly one value per
/// frame and never observes a half-updated transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl ViewportTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.translate + world * self.scale
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.translate) / self.scale
    }

    fn clamped(mut self) -> Self {
        self.scale = self.scale.clamp(MIN_SCALE, MAX_SCALE);
        self
    }
}

struct Transition {
    from: ViewportTransform,
    to: ViewportTransform,
    started: f64,
    duration: f32,
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - ((-2.0 * t + 2.0).powi(3) * 0.5)
    }
}

fn lerp_transform(from: ViewportTransform, to: ViewportTransform, t: f32) -> ViewportTransform {
    ViewportTransform {
        translate: from.translate + (to.translate - from.translate) * t,
        scale: from.scale + (to.scale - from.scale) * t,
    }
}

/// Owns the current transform plus at most one in-flight animated
/// transition. Clocked explicitly (`now` in seconds) so transitions are
/// testable without a running UI.
pub struct Viewport {
    current: ViewportTransform,
    transition: Option<Transition>,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            current: ViewportTransform::IDENTITY,
            transition: None,
        }
    }

    /// Evaluates the transform for this frame, advancing any transition.
    pub fn transform(&mut self, now: f64) -> ViewportTransform {
        if let Some(transition) = &self.transition {
            let progress =
                ((now - transition.started) / transition.duration as f64).clamp(0.0, 1.0) as f32;
            if progress >= 1.0 {
                self.current = transition.to;
                self.transition = None;
            } else {
                self.current =
                    lerp_transform(transition.from, transition.to, ease_in_out(progress));
            }
        }
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    fn animate_to(&mut self, target: ViewportTransform, now: f64, duration: f32) {
        self.transition = Some(Transition {
            from: self.current,
            to: target.clamped(),
            started: now,
            duration,
        });
    }

    /// Animated scale multiplication around the canvas center.
    pub fn zoom_by(&mut self, factor: f32, now: f64) {
        let scale = (self.current.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let translate = self.current.translate * (scale / self.current.scale);
        self.animate_to(
            ViewportTransform { translate, scale },
            now,
            ZOOM_ANIMATION_SECS,
        );
    }

    pub fn reset(&mut self, now: f64) {
        self.animate_to(ViewportTransform::IDENTITY, now, ZOOM_ANIMATION_SECS);
    }

    /// Fits a world-space bounding box into `viewport * (1 - padding)`,
    /// centered horizontally, scale capped at `max_scale`. With
    /// `top_reserve` the box's top edge lands that many pixels below the
    /// canvas top (room for a tree root); otherwise content is centered
    /// vertically too.
    pub fn fit_to_content(
        &mut self,
        min: Vec2,
        max: Vec2,
        viewport: Vec2,
        padding_fraction: f32,
        max_scale: f32,
        top_reserve: Option<f32>,
        now: f64,
    ) {
        let span = (max - min).max(vec2(1.0, 1.0));
        let avail = viewport * (1.0 - padding_fraction.clamp(0.0, 0.9));
        let scale = (avail.x / span.x)
            .min(avail.y / span.y)
            .min(max_scale)
            .clamp(MIN_SCALE, MAX_SCALE);

        let center = (min + max) * 0.5;
        let translate_y = match top_reserve {
            Some(reserve) => reserve - (viewport.y * 0.5) - (min.y * scale),
            None => -center.y * scale,
        };

        self.animate_to(
            ViewportTransform {
                translate: vec2(-center.x * scale, translate_y),
                scale,
            },
            now,
            FIT_ANIMATION_SECS,
        );
    }

    /// Pointer-driven pan: 1:1 tracking, no animation.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.transition = None;
        self.current.translate += delta;
    }

    /// Pointer-driven zoom anchored at the cursor: the world point under
    /// the pointer stays put.
    pub fn zoom_at(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        self.transition = None;
        let world_before = self.current.screen_to_world(rect, pointer);
        let scale = (self.current.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.current = ViewportTransform {
            translate: pointer - rect.center() - world_before * scale,
            scale,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    fn settle(viewport: &mut Viewport, now: f64) -> ViewportTransform {
        viewport.transform(now + 10.0)
    }

    #[test]
    fn chained_zooms_never_escape_the_scale_clamp() {
        let mut viewport = Viewport::new();
        for _ in 0..12 {
            viewport.zoom_by(3.0, 0.0);
            settle(&mut viewport, 0.0);
        }
        assert_eq!(settle(&mut viewport, 0.0).scale, MAX_SCALE);

        for _ in 0..24 {
            viewport.zoom_by(0.05, 0.0);
            settle(&mut viewport, 0.0);
        }
        assert_eq!(settle(&mut viewport, 0.0).scale, MIN_SCALE);
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut viewport = Viewport::new();
        viewport.pan_by(vec2(120.0, -40.0));
        viewport.zoom_at(canvas(), pos2(100.0, 100.0), 2.0);
        viewport.reset(0.0);

        assert_eq!(settle(&mut viewport, 0.0), ViewportTransform::IDENTITY);
    }

    #[test]
    fn gesture_zoom_keeps_the_anchor_point_fixed() {
        let mut viewport = Viewport::new();
        let rect = canvas();
        let pointer = pos2(150.0, 450.0);

        let before = viewport.transform(0.0).screen_to_world(rect, pointer);
        viewport.zoom_at(rect, pointer, 1.8);
        let after = viewport.transform(0.0).screen_to_world(rect, pointer);

        assert!((before - after).length() < 0.001);
    }

    #[test]
    fn fit_caps_scale_and_centers_content() {
        let mut viewport = Viewport::new();
        viewport.fit_to_content(
            vec2(-100.0, -100.0),
            vec2(100.0, 100.0),
            vec2(800.0, 600.0),
            0.15,
            1.2,
            None,
            0.0,
        );
        let transform = settle(&mut viewport, 0.0);

        assert_eq!(transform.scale, 1.2);
        assert_eq!(transform.translate, Vec2::ZERO);
    }

    #[test]
    fn fit_with_top_reserve_pins_the_box_top_under_the_canvas_edge() {
        let mut viewport = Viewport::new();
        let rect = canvas();
        let min = vec2(-260.0, -180.0);
        let max = vec2(260.0, 240.0);
        viewport.fit_to_content(min, max, rect.size(), 0.15, 1.0, Some(36.0), 0.0);
        let transform = settle(&mut viewport, 0.0);

        let top = transform.world_to_screen(rect, vec2(0.0, min.y));
        assert!((top.y - (rect.top() + 36.0)).abs() < 0.001);
    }

    #[test]
    fn transitions_evaluate_atomically_over_time() {
        let mut viewport = Viewport::new();
        viewport.zoom_by(2.0, 0.0);

        let at_start = viewport.transform(0.0);
        assert_eq!(at_start.scale, 1.0, "animation starts from the old value");
        assert!(viewport.is_animating());

        let midway = viewport.transform(0.15);
        assert!(midway.scale > 1.0 && midway.scale < 2.0);

        let done = viewport.transform(0.4);
        assert_eq!(done.scale, 2.0);
        assert!(!viewport.is_animating());
    }

    #[test]
    fn pan_cancels_any_running_transition() {
        let mut viewport = Viewport::new();
        viewport.zoom_by(2.0, 0.0);
        viewport.pan_by(vec2(10.0, 0.0));

        assert!(!viewport.is_animating());
        assert_eq!(viewport.transform(0.0).scale, 1.0);
    }
}
