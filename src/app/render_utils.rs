use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, translate_x: f32, scale: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * scale.clamp(0.6, 1.8)).max(20.0);
    let origin_x = rect.center().x + translate_x;

    let mut x = origin_x.rem_euclid(step).max(rect.left());
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 55)),
        );
        x += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

/// World-space circle radius per node; the root is drawn larger so it reads
/// as the tree origin at any zoom.
pub(super) fn node_radius(depth: u32) -> f32 {
    if depth == 0 { 16.0 } else { 11.0 }
}

pub(super) fn screen_radius(base: f32, scale: f32) -> f32 {
    (base * scale.powf(0.8)).clamp(2.5, 46.0)
}

/// Depth-graded fill: warm root, cool ramp toward the leaves.
pub(super) fn depth_color(depth: u32, max_depth: u32) -> Color32 {
    if depth == 0 {
        return Color32::from_rgb(240, 176, 82);
    }

    let t = if max_depth <= 1 {
        1.0
    } else {
        (depth as f32 / max_depth as f32).clamp(0.0, 1.0)
    };
    let r = (70.0 + (95.0 * t)) as u8;
    let g = (156.0 - (72.0 * t)) as u8;
    let b = (222.0 - (42.0 * t)) as u8;
    Color32::from_rgb(r, g, b)
}
