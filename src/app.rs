use egui::{DragValue, Key, Layout, Modifiers, ScrollArea};

use gatewire_sim::{Editor, Interaction, NodeKind, SimConfig};

use crate::{
    camera::{Camera, DragTracker},
    circuit_widget::circuit_widget,
};

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct GatewireApp {
    camera: Camera,
    cfg: SimConfig,
    tool: Option<NodeKind>,

    // The circuit itself is never saved
    #[serde(skip)]
    editor: Editor,

    #[serde(skip)]
    tracker: DragTracker,
}

impl Default for GatewireApp {
    fn default() -> Self {
        let cfg = SimConfig::default();
        Self {
            camera: Camera::default(),
            tool: Some(NodeKind::Buffer),
            editor: Editor::new(cfg),
            tracker: DragTracker::default(),
            cfg,
        }
    }
}

impl GatewireApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut inst: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        inst.editor = Editor::new(inst.cfg);
        inst.editor.set_tool(inst.tool);
        log::info!("Starting with {:?}", inst.cfg);

        inst
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::D)) {
            self.duplicate();
        }

        ctx.input(|i| {
            for (key, tool) in [
                (Key::Num1, None),
                (Key::Num2, Some(NodeKind::Buffer)),
                (Key::Num3, Some(NodeKind::Inverter)),
                (Key::Num4, Some(NodeKind::Switch)),
            ] {
                if i.key_pressed(key) {
                    self.tool = tool;
                }
            }

            if i.key_pressed(Key::Delete) {
                let n = self.editor.delete_selected();
                log::debug!("Deleted {n} selected nodes");
            }

            if i.key_pressed(Key::Escape) {
                self.editor.graph_mut().deselect_all();
            }

            if i.key_pressed(Key::O) && !i.modifiers.command {
                self.camera = Camera::default();
            }
        });
    }

    fn duplicate(&mut self) {
        if self.editor.duplicate() {
            // The copy follows the pointer from here
            self.tracker.begin();
        }
    }

    fn config_ui(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;
        changed |= ui
            .add(
                DragValue::new(&mut self.cfg.node_size)
                    .range(4..=200)
                    .prefix("Node size: "),
            )
            .changed();
        changed |= ui
            .add(
                DragValue::new(&mut self.cfg.switch_scale)
                    .range(0.5..=4.0)
                    .speed(1e-2)
                    .prefix("Switch scale: "),
            )
            .changed();
        changed |= ui
            .add(
                DragValue::new(&mut self.cfg.grid_size)
                    .range(1..=200)
                    .prefix("Grid size: "),
            )
            .changed();
        changed |= ui
            .add(
                DragValue::new(&mut self.cfg.min_select_box)
                    .range(0..=500)
                    .prefix("Min. select box: "),
            )
            .changed();

        if ui.button("Default cfg").clicked() {
            self.cfg = SimConfig::default();
            changed = true;
        }

        if changed {
            self.editor.set_config(self.cfg);
        }
    }

    fn inspector_ui(&mut self, ui: &mut egui::Ui) {
        let graph = self.editor.graph();
        ui.label(format!(
            "{} nodes, {} connections",
            graph.len(),
            graph.connections().count()
        ));

        match graph.selected() {
            [] if graph.selected_connections().is_empty() => {
                ui.weak("Click on a node to select it");
            }
            [] => {
                ui.label(format!(
                    "{} connection(s) selected",
                    graph.selected_connections().len()
                ));
            }
            &[id] => {
                if let Some(node) = graph.node(id) {
                    ui.label(format!("{} at {:?}", node.kind.name(), node.pos));
                    ui.label(if node.powered() { "Powered" } else { "Unpowered" });
                    ui.label(format!(
                        "{} sources, {} children",
                        node.sources().len(),
                        node.connections().len()
                    ));
                }
            }
            many => {
                ui.label(format!("{} nodes selected", many.len()));
            }
        }

        let has_selection =
            !graph.selected().is_empty() || !graph.selected_connections().is_empty();
        let can_duplicate =
            !graph.selected().is_empty() && self.editor.state() != Interaction::DraggingHeldCopy;

        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_duplicate, egui::Button::new("Duplicate"))
                .clicked()
            {
                self.duplicate();
            }
            if ui
                .add_enabled(has_selection, egui::Button::new("Delete"))
                .clicked()
            {
                self.editor.delete_selected();
            }
        });
    }
}

impl eframe::App for GatewireApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        self.editor.clear();
                    }
                    ui.separator();
                    egui::widgets::global_theme_preference_buttons(ui);
                });

                if ui.button("Reset view").clicked() {
                    self.camera = Camera::default();
                }

                ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak("1-4: tools, Del: delete, Ctrl+D: duplicate, O: reset view");
                });
            });
        });

        self.handle_keys(ctx);

        egui::SidePanel::left("cfg").show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.strong("Tool");
                ui.selectable_value(&mut self.tool, None, "Select");
                for kind in NodeKind::ALL {
                    ui.selectable_value(&mut self.tool, Some(kind), kind.name());
                }

                ui.separator();
                ui.strong("Selection");
                self.inspector_ui(ui);

                ui.separator();
                ui.strong("Advanced");
                self.config_ui(ui);
            });
        });

        self.editor.set_tool(self.tool);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::canvas(ui.style()).show(ui, |ui| {
                circuit_widget(ui, &mut self.editor, &mut self.camera, &mut self.tracker);
            });
        });

        // The held copy follows the pointer even when nothing else changes
        if self.editor.state() != Interaction::Idle {
            ctx.request_repaint();
        }
    }
}
