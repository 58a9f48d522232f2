use egui::{Color32, Painter, Pos2, Response, Sense, Stroke, Ui};

use gatewire_sim::{Editor, Interaction, Pointer};

use crate::{
    camera::{snap, Camera, CameraTransform, DragTracker},
    components::{
        draw_connection, draw_node, draw_pending_connection, draw_select_box,
    },
};

const GRID_COLOR: Color32 = Color32::from_rgb(25, 25, 25);
const AXIS_COLOR: Color32 = Color32::from_rgb(45, 45, 45);

/// The editing canvas. Feeds pointer input into the editor, then draws the circuit from
/// scratch using the state it settled on.
pub fn circuit_widget(
    ui: &mut Ui,
    editor: &mut Editor,
    camera: &mut Camera,
    tracker: &mut DragTracker,
) -> Response {
    let (resp, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let view = camera.drive(&resp);

    handle_pointer(ui, &resp, &view, editor, tracker);

    let grid = editor.graph().config().grid_size;
    draw_grid(&painter, &view, grid);
    draw_circuit(&painter, &view, editor);
    draw_overlays(ui, &painter, &view, editor, &resp);

    resp
}

fn handle_pointer(
    ui: &Ui,
    resp: &Response,
    view: &CameraTransform,
    editor: &mut Editor,
    tracker: &mut DragTracker,
) {
    let (latest, shift, pressed, released, down, delta) = ui.input(|i| {
        (
            i.pointer.latest_pos(),
            i.modifiers.shift,
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.primary_down(),
            i.pointer.delta(),
        )
    });

    let Some(screen_pos) = latest else {
        return;
    };
    let hovered = resp.rect.contains(screen_pos);
    let grid = editor.graph().config().grid_size;
    let world = view.egui_to_world(screen_pos);
    let pointer = Pointer::new(world)
        .snapped(snap(world, grid))
        .with_shift(shift);

    if pressed && hovered {
        tracker.begin();
        editor.pointer_pressed(pointer);
    }

    let held = editor.state() == Interaction::DraggingHeldCopy;
    if (down && tracker.active()) || held {
        let step = tracker.step(view.egui_to_world_vec(delta), grid);
        if step != (0, 0) {
            if down {
                editor.pointer_dragged(step);
            } else {
                editor.pointer_moved(step);
            }
        }
    }

    if released && tracker.active() {
        tracker.end();
        editor.pointer_released(pointer);
    }
}

fn draw_grid(painter: &Painter, view: &CameraTransform, grid: i32) {
    let ((min_x, min_y), (max_x, max_y)) = view.visible_rect();
    let area = view.area;

    // Skip the grid once it gets too dense to be useful
    if grid > 0 && grid as f32 * view.zoom() > 4.0 {
        let stroke = Stroke::new(1.0, GRID_COLOR);
        let first_x = min_x.div_euclid(grid) * grid;
        for x in (first_x..=max_x + grid).step_by(grid as usize) {
            let sx = view.world_to_egui((x, 0)).x;
            painter.line_segment([Pos2::new(sx, area.min.y), Pos2::new(sx, area.max.y)], stroke);
        }
        let first_y = min_y.div_euclid(grid) * grid;
        for y in (first_y..=max_y + grid).step_by(grid as usize) {
            let sy = view.world_to_egui((0, y)).y;
            painter.line_segment([Pos2::new(area.min.x, sy), Pos2::new(area.max.x, sy)], stroke);
        }
    }

    let origin = view.world_to_egui((0, 0));
    let axis = Stroke::new(3.0, AXIS_COLOR);
    painter.line_segment([Pos2::new(origin.x, area.min.y), Pos2::new(origin.x, area.max.y)], axis);
    painter.line_segment([Pos2::new(area.min.x, origin.y), Pos2::new(area.max.x, origin.y)], axis);
}

fn draw_circuit(painter: &Painter, view: &CameraTransform, editor: &Editor) {
    let graph = editor.graph();
    let marker = (graph.config().node_size / 4) as f32 * view.zoom();

    for (_, conn) in graph.connections() {
        let (Some(parent), Some(child)) = (graph.node(conn.parent), graph.node(conn.child)) else {
            continue;
        };
        draw_connection(
            painter,
            view.world_to_egui(parent.pos),
            view.world_to_egui(child.pos),
            parent.powered(),
            conn.selected(),
            marker,
        );
    }

    for (_, node) in graph.iter() {
        draw_node(
            painter,
            view.world_to_egui(node.pos),
            node.size as f32 * view.zoom(),
            node.kind,
            node.powered(),
            node.selected(),
            1.0,
        );
    }
}

fn draw_overlays(
    ui: &Ui,
    painter: &Painter,
    view: &CameraTransform,
    editor: &Editor,
    resp: &Response,
) {
    let Some(screen_pos) = ui.input(|i| i.pointer.latest_pos()) else {
        return;
    };
    let world = view.egui_to_world(screen_pos);
    let graph = editor.graph();

    if let Interaction::ConnectingFrom(parent) = editor.state() {
        if let Some(node) = graph.node(parent) {
            draw_pending_connection(painter, view.world_to_egui(node.pos), screen_pos);
        }
    }

    if let Some((a, b)) = editor.select_box(world) {
        draw_select_box(painter, view.world_to_egui(a), view.world_to_egui(b));
    }

    // Placement preview
    if let (Some(kind), Interaction::Idle) = (editor.tool(), editor.state()) {
        if resp.hovered() {
            let pos = snap(world, graph.config().grid_size);
            draw_node(
                painter,
                view.world_to_egui(pos),
                graph.config().size_of(kind) as f32 * view.zoom(),
                kind,
                kind.initial_power(),
                false,
                0.5,
            );
        }
    }
}
