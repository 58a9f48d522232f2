use egui::{PointerButton, Pos2, Rect, Vec2};
use gatewire_sim::WorldPos;

pub const MIN_ZOOM: f32 = 0.3;
pub const MAX_ZOOM: f32 = 2.0;

#[derive(Copy, Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct Camera {
    /// Egui units per world unit
    pub zoom: f32,
    /// Screen offset of the world origin from the centre of the canvas
    pub offset: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

pub struct CameraTransform {
    /// Screen area in egui
    pub area: Rect,
    pub camera: Camera,
}

impl Camera {
    /// Pans with the secondary or middle button, zooms around the pointer on scroll.
    pub fn drive(&mut self, resp: &egui::Response) -> CameraTransform {
        let area = resp.rect;

        if resp.dragged_by(PointerButton::Secondary) || resp.dragged_by(PointerButton::Middle) {
            self.offset += resp.drag_delta();
        }

        if let Some(pivot) = resp.hover_pos() {
            let scroll = resp.ctx.input(|r| r.raw_scroll_delta.y);
            if scroll != 0.0 {
                let old_zoom = self.zoom;
                self.zoom = (self.zoom + scroll.signum() * 0.1).clamp(MIN_ZOOM, MAX_ZOOM);

                // Keep the world point under the pointer where it is
                let pivot_vect = pivot - area.center() - self.offset;
                self.offset -= pivot_vect * (self.zoom / old_zoom - 1.0);
            }
        }

        CameraTransform {
            area,
            camera: *self,
        }
    }
}

impl CameraTransform {
    fn origin(&self) -> Pos2 {
        self.area.center() + self.camera.offset
    }

    pub fn zoom(&self) -> f32 {
        self.camera.zoom
    }

    pub fn world_to_egui(&self, (x, y): WorldPos) -> Pos2 {
        self.origin() + Vec2::new(x as f32, y as f32) * self.camera.zoom
    }

    pub fn egui_to_world(&self, egui_pos: Pos2) -> WorldPos {
        let world = (egui_pos - self.origin()) / self.camera.zoom;
        (world.x.floor() as i32, world.y.floor() as i32)
    }

    /// Converts a screen-space movement into world units, unrounded.
    pub fn egui_to_world_vec(&self, delta: Vec2) -> Vec2 {
        delta / self.camera.zoom
    }

    /// World-space corners of the visible area.
    pub fn visible_rect(&self) -> (WorldPos, WorldPos) {
        (
            self.egui_to_world(self.area.min),
            self.egui_to_world(self.area.max),
        )
    }
}

/// Nearest grid point to `pos`.
pub fn snap((x, y): WorldPos, grid: i32) -> WorldPos {
    if grid <= 0 {
        return (x, y);
    }
    let snap_axis = |v: i32| (v as f32 / grid as f32).round() as i32 * grid;
    (snap_axis(x), snap_axis(y))
}

/// Accumulates pointer motion and hands it out in whole grid steps, so dragged nodes stay on
/// the grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragTracker {
    active: bool,
    raw: Vec2,
    applied: WorldPos,
}

impl DragTracker {
    pub fn begin(&mut self) {
        *self = Self {
            active: true,
            ..Default::default()
        };
    }

    pub fn end(&mut self) {
        self.active = false;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Adds `delta` world units of motion and returns how far to move, in whole grid steps.
    pub fn step(&mut self, delta: Vec2, grid: i32) -> WorldPos {
        self.raw += delta;
        let target = snap((self.raw.x.round() as i32, self.raw.y.round() as i32), grid);
        let step = (target.0 - self.applied.0, target.1 - self.applied.1);
        self.applied = target;
        step
    }
}
