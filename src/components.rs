use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use gatewire_sim::NodeKind;

pub const POWERED: Color32 = Color32::from_rgb(255, 76, 76);
pub const UNPOWERED: Color32 = Color32::from_rgb(150, 150, 150);
pub const SELECTED: Color32 = Color32::from_rgb(1, 212, 255);
pub const PENDING: Color32 = Color32::from_rgb(100, 100, 100);
pub const SELECT_BOX: Color32 = Color32::from_rgb(20, 255, 100);

fn power_color(powered: bool) -> Color32 {
    if powered {
        POWERED
    } else {
        UNPOWERED
    }
}

/// Draws a node of `size` egui units centred on `center`. `opacity` below 1 is used for the
/// placement preview.
pub fn draw_node(
    painter: &Painter,
    center: Pos2,
    size: f32,
    kind: NodeKind,
    powered: bool,
    selected: bool,
    opacity: f32,
) {
    let fill = power_color(powered).gamma_multiply(opacity);
    let outline = if selected {
        Stroke::new(2.0, SELECTED)
    } else {
        Stroke::new(1.0, Color32::DARK_GRAY.gamma_multiply(opacity))
    };
    let radius = size / 2.0;

    match kind {
        NodeKind::Buffer => {
            painter.circle_filled(center, radius, fill);
            painter.circle_stroke(center, radius, outline);
        }
        NodeKind::Inverter => {
            let bubble = radius * 0.25;
            let tip = center + Vec2::new(radius - bubble * 2.0, 0.0);
            let back = center.x - radius;
            let body = vec![
                tip,
                Pos2::new(back, center.y + radius),
                Pos2::new(back, center.y - radius),
            ];
            painter.add(Shape::convex_polygon(body, fill, outline));
            let bubble_center = tip + Vec2::new(bubble, 0.0);
            painter.circle_filled(bubble_center, bubble, fill);
            painter.circle_stroke(bubble_center, bubble, outline);
        }
        NodeKind::Switch => {
            let rect = Rect::from_center_size(center, Vec2::splat(size));
            painter.rect_filled(rect, size * 0.15, fill);
            painter.rect_stroke(rect, size * 0.15, outline, egui::StrokeKind::Inside);

            // Lever, thrown to the right when on
            let lever = if powered { 0.25 } else { -0.25 };
            painter.line_segment(
                [
                    center + Vec2::new(0.0, radius * 0.5),
                    center + Vec2::new(size * lever, -radius * 0.5),
                ],
                Stroke::new((size * 0.08).max(1.0), Color32::WHITE.gamma_multiply(opacity)),
            );
        }
    }
}

/// Draws an edge with a direction marker halfway along it.
pub fn draw_connection(
    painter: &Painter,
    from: Pos2,
    to: Pos2,
    powered: bool,
    selected: bool,
    marker_size: f32,
) {
    let color = if selected {
        SELECTED
    } else {
        power_color(powered)
    };
    painter.line_segment([from, to], Stroke::new(2.0, color));

    let diff = to - from;
    if diff.length() < f32::EPSILON {
        return;
    }

    let dir = diff.normalized();
    let side = dir.rot90();
    let mid = from + diff / 2.0;
    let half = marker_size / 2.0;
    let arrow = vec![
        mid + dir * half,
        mid - dir * half + side * half,
        mid - dir * half - side * half,
    ];
    painter.add(Shape::convex_polygon(arrow, color, Stroke::NONE));
}

/// Connection being dragged out of a node.
pub fn draw_pending_connection(painter: &Painter, from: Pos2, to: Pos2) {
    painter.line_segment([from, to], Stroke::new(1.5, PENDING));
}

pub fn draw_select_box(painter: &Painter, a: Pos2, b: Pos2) {
    painter.rect_stroke(
        Rect::from_two_pos(a, b),
        0.0,
        Stroke::new(1.0, SELECT_BOX),
        egui::StrokeKind::Inside,
    );
}
