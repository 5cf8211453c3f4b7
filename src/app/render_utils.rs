use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::camera::CameraTransform;

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

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: CameraTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 248, 243));

    let step = (64.0 * transform.scale.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.min + transform.translate;
    let dot = Color32::from_rgba_unmultiplied(120, 110, 95, 60);

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
        while y < rect.bottom() {
            painter.circle_filled(Pos2::new(x, y), 1.2, dot);
            y += step;
        }
        x += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, transform: CameraTransform, world: Vec2) -> Pos2 {
    rect.min + transform.world_to_screen(world)
}

pub(super) fn screen_to_world(rect: Rect, transform: CameraTransform, screen: Pos2) -> Vec2 {
    transform.screen_to_world(screen - rect.min)
}

pub(super) fn outline(color: Color32) -> Stroke {
    Stroke::new(1.5, dim_color(color, 0.55))
}
