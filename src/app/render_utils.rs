use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};
use node_weaver::EdgeRole;
use node_weaver::palette::Rgb;

pub(super) const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
pub(super) const PENDING_COLOR: Color32 = Color32::from_rgb(129, 140, 248);
pub(super) const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    let mix = |a: u8, b: u8| ((a as f32 * inverse) + (b as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
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

pub(super) fn rgb(color: Rgb) -> Color32 {
    let [r, g, b] = color.channels();
    Color32::from_rgb(r, g, b)
}

pub(super) fn edge_color(role: EdgeRole) -> Color32 {
    match role {
        EdgeRole::Outgoing => rgb(Rgb(0x22c55e)),
        EdgeRole::Incoming => rgb(Rgb(0xef4444)),
        EdgeRole::Plain => rgb(Rgb(0x9ca3af)),
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = 56.0;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 50));

    let mut x = rect.left() + (rect.width() * 0.5).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (rect.height() * 0.5).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

/// Small chevron at `end`, pulled back by the target node's radius.
pub(super) fn draw_arrow_tip(painter: &Painter, start: Pos2, end: Pos2, inset: f32, stroke: Stroke) {
    let along = end - start;
    let length = along.length();
    if length <= inset + 4.0 {
        return;
    }

    let direction = along / length;
    let tip = end - direction * inset;
    let normal = Vec2::new(-direction.y, direction.x);
    let size = 5.0 + stroke.width;
    painter.line_segment([tip, tip - direction * size + normal * size * 0.6], stroke);
    painter.line_segment([tip, tip - direction * size - normal * size * 0.6], stroke);
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}
