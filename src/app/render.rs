use eframe::egui;

use crate::model;

pub(super) fn draw_background(painter: &egui::Painter, rect: egui::Rect) {
    painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(32, 32, 32));
}

pub(super) fn draw_shape(
    painter: &egui::Painter,
    shape: &model::Shape,
    textures: &[egui::TextureHandle],
) {
    let style = shape.style;
    let t = style.thickness;
    match &shape.kind {
        model::ShapeKind::Rect { x, y, w, h } => {
            let (x, y, w, h) = (*x, *y, *w, *h);
            if style.material != model::Material::Translucent {
                let outline = style.outline_color();
                fill_box(painter, x, y, x + w - t, y + t, outline);
                fill_box(painter, x, y + t, x + t, y + h, outline);
                fill_box(painter, x + w - t, y, x + w, y + h - t, outline);
                fill_box(painter, x + t, y + h - t, x + w, y + h, outline);
            }
            fill_box(painter, x + t, y + t, x + w - t, y + h - t, style.body_color());
        }
        model::ShapeKind::Ellipse { x, y, rx, ry } => {
            let (rx, ry) = (*rx, *ry);
            let center = egui::pos2(*x as f32, *y as f32);
            if style.material != model::Material::Translucent {
                let outline = style.outline_color();
                for i in 0..t {
                    if rx - i < 0 || ry - i < 0 {
                        break;
                    }
                    painter.add(egui::Shape::ellipse_stroke(
                        center,
                        egui::vec2((rx - i) as f32, (ry - i) as f32),
                        egui::Stroke::new(1.0, outline),
                    ));
                }
            }
            painter.add(egui::Shape::ellipse_filled(
                center,
                egui::vec2((rx - t).max(0) as f32, (ry - t).max(0) as f32),
                style.body_color(),
            ));
        }
        model::ShapeKind::Arrow { x, y, dx, dy } => {
            let (x, y, dx, dy) = (*x, *y, *dx, *dy);
            if dx == 0 && dy == 0 {
                return;
            }
            let stroke = egui::Stroke::new(t as f32, style.solid_color());
            let tip = egui::pos2((x + dx) as f32, (y + dy) as f32);
            painter.line_segment([egui::pos2(x as f32, y as f32), tip], stroke);
            if style.material != model::Material::Opaque {
                let len = f64::from(dx).hypot(f64::from(dy));
                let ux = f64::from(dx) / len;
                let uy = f64::from(dy) / len;
                let v1x = (f64::from(x + dx) - 20.0 * ux - 10.0 * uy) as i32;
                let v1y = (f64::from(y + dy) - 20.0 * uy + 10.0 * ux) as i32;
                let v2x = (f64::from(x + dx) - 20.0 * ux + 10.0 * uy) as i32;
                let v2y = (f64::from(y + dy) - 20.0 * uy - 10.0 * ux) as i32;
                painter.line_segment([tip, egui::pos2(v1x as f32, v1y as f32)], stroke);
                painter.line_segment([tip, egui::pos2(v2x as f32, v2y as f32)], stroke);
            }
        }
        model::ShapeKind::Grid { x, y, w, h } => {
            let (x, y, w, h) = (*x, *y, *w, *h);
            fill_box(painter, x, y, x + w, y + h, style.body_color());
            let outline = style.outline_color();
            for col in (x..x + w + t).step_by(100) {
                fill_box(painter, col, y, col + t, y + h + t, outline);
            }
            for row in (y..y + h + t).step_by(60) {
                fill_box(painter, x, row, x + w + t, row + t, outline);
            }
        }
        model::ShapeKind::Text { x, y, text, .. } => {
            if text.is_empty() {
                return;
            }
            painter.text(
                egui::pos2(*x as f32, *y as f32),
                egui::Align2::LEFT_TOP,
                text,
                egui::FontId::proportional(model::FONT_SIZE),
                style.solid_color(),
            );
        }
        model::ShapeKind::Image { x, y, w, h, slot } => {
            let Some(texture) = textures.get(*slot) else {
                return;
            };
            let (x, y, w, h) = (*x, *y, *w, *h);
            let rect = egui::Rect::from_min_max(
                egui::pos2(x as f32, y as f32),
                egui::pos2((x + w) as f32, (y + h) as f32),
            );
            let uv = egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
        }
    }
}

/// Style swatch in the bottom-right corner: a small frame plus an arrow,
/// both drawn with the live color and material.
pub(super) fn draw_hud(painter: &egui::Painter, rect: egui::Rect, style: &model::Style) {
    let w = rect.max.x as i32;
    let h = rect.max.y as i32;
    let style = model::Style {
        thickness: 3,
        ..*style
    };
    let frame = model::Shape::rect(style, w - 26, h - 26, w - 4, h - 4);
    let arrow = model::Shape::arrow(style, w - 54, h - 14, w - 33, h - 14);
    draw_shape(painter, &frame, &[]);
    draw_shape(painter, &arrow, &[]);
}

// Corner-to-corner fill; the corners may arrive in either order.
fn fill_box(painter: &egui::Painter, x1: i32, y1: i32, x2: i32, y2: i32, color: egui::Color32) {
    let rect = egui::Rect::from_two_pos(
        egui::pos2(x1 as f32, y1 as f32),
        egui::pos2(x2 as f32, y2 as f32),
    );
    painter.rect_filled(rect, 0.0, color);
}
