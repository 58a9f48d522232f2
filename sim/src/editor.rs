use crate::{ConnectionId, Graph, NodeId, NodeKind, SimConfig, WorldPos};

/// What the pointer is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interaction {
    #[default]
    Idle,
    /// A connection is being dragged out of this node
    ConnectingFrom(NodeId),
    DraggingSelection,
    /// A fresh duplicate follows the pointer until the next release
    DraggingHeldCopy,
}

/// A pointer sample in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pointer {
    pub pos: WorldPos,
    /// `pos` snapped to the placement grid
    pub grid: WorldPos,
    pub shift: bool,
}

impl Pointer {
    pub fn new(pos: WorldPos) -> Self {
        Self {
            pos,
            grid: pos,
            shift: false,
        }
    }

    pub fn snapped(mut self, grid: WorldPos) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }
}

/// Turns press/drag/release gestures into graph mutations.
#[derive(Clone, Debug, Default)]
pub struct Editor {
    graph: Graph,
    state: Interaction,
    tool: Option<NodeKind>,
    select_box: Option<WorldPos>,
    /// Set once a drag moved the selection, so the release doesn't reselect
    keep_selected: bool,
}

impl Editor {
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            graph: Graph::new(cfg),
            ..Default::default()
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn state(&self) -> Interaction {
        self.state
    }

    pub fn tool(&self) -> Option<NodeKind> {
        self.tool
    }

    /// Placement tool used by releases over empty space. `None` only selects.
    pub fn set_tool(&mut self, tool: Option<NodeKind>) {
        self.tool = tool;
    }

    pub fn set_config(&mut self, cfg: SimConfig) {
        self.graph.set_config(cfg);
    }

    /// Throws away the whole circuit.
    pub fn clear(&mut self) {
        let cfg = *self.graph.config();
        *self = Self {
            graph: Graph::new(cfg),
            tool: self.tool,
            ..Default::default()
        };
    }

    /// Where the current selection box was anchored, if one is being dragged out.
    pub fn select_box_origin(&self) -> Option<WorldPos> {
        self.select_box
    }

    /// Corners of the selection box reaching to `pos`, if it is big enough to count.
    pub fn select_box(&self, pos: WorldPos) -> Option<(WorldPos, WorldPos)> {
        let origin = self.select_box?;
        let (dx, dy) = ((pos.0 - origin.0) as f32, (pos.1 - origin.1) as f32);
        let diagonal = (dx * dx + dy * dy).sqrt();
        (diagonal > self.graph.config().min_select_box as f32).then_some((origin, pos))
    }

    pub fn begin_connect(&mut self, parent: NodeId) -> bool {
        if self.state != Interaction::Idle || !self.graph.contains(parent) {
            return false;
        }
        self.state = Interaction::ConnectingFrom(parent);
        true
    }

    /// Ends a connection gesture over `target` (or nothing). Returns the new edge, if any.
    pub fn end_connect(&mut self, target: Option<NodeId>) -> Option<ConnectionId> {
        let Interaction::ConnectingFrom(parent) = self.state else {
            return None;
        };
        self.state = Interaction::Idle;
        let target = target.filter(|&t| t != parent)?;
        self.graph.add_child(parent, target)
    }

    pub fn duplicate(&mut self) -> bool {
        if !self.graph.duplicate() {
            return false;
        }
        self.state = Interaction::DraggingHeldCopy;
        self.select_box = None;
        true
    }

    /// Drops the held copy where it is.
    pub fn anchor(&mut self) -> bool {
        if self.state != Interaction::DraggingHeldCopy {
            return false;
        }
        self.state = Interaction::Idle;
        self.graph.anchor_held_copy()
    }

    pub fn delete_selected(&mut self) -> usize {
        let deleted = self.graph.delete_selected();
        self.settle_state();
        deleted
    }

    pub fn toggle_switch(&mut self, id: NodeId) -> bool {
        self.graph.toggle_switch(id)
    }

    /// Falls back to idle if whatever the current gesture referred to is gone.
    fn settle_state(&mut self) {
        let stale = match self.state {
            Interaction::ConnectingFrom(parent) => !self.graph.contains(parent),
            Interaction::DraggingSelection => self.graph.selected().is_empty(),
            Interaction::DraggingHeldCopy => self.graph.held_copy().is_none(),
            Interaction::Idle => false,
        };
        if stale {
            log::debug!("Abandoning {:?}", self.state);
            self.state = Interaction::Idle;
        }
    }

    pub fn pointer_pressed(&mut self, pointer: Pointer) {
        if self.state == Interaction::DraggingHeldCopy {
            return;
        }

        match self.graph.node_at(pointer.pos) {
            Some(id) if !pointer.shift => {
                // Pressing an already selected node starts a drag instead
                if !self.graph.is_selected(id) {
                    self.graph.deselect_all();
                    self.begin_connect(id);
                }
            }
            _ => {
                if !pointer.shift {
                    self.graph.deselect_all();
                }
                self.select_box = Some(pointer.pos);
            }
        }
    }

    /// Pointer moved by `delta` with the primary button held.
    pub fn pointer_dragged(&mut self, delta: WorldPos) {
        match self.state {
            Interaction::Idle | Interaction::DraggingSelection
                if !self.graph.selected().is_empty() =>
            {
                self.state = Interaction::DraggingSelection;
                self.keep_selected = true;
                self.graph.translate_selected(delta);
            }
            Interaction::DraggingHeldCopy => {
                self.graph.translate_held_copy(delta);
            }
            _ => (),
        }
    }

    /// Pointer moved by `delta` with no button held.
    pub fn pointer_moved(&mut self, delta: WorldPos) {
        if self.state == Interaction::DraggingHeldCopy {
            self.graph.translate_held_copy(delta);
        }
    }

    pub fn pointer_released(&mut self, pointer: Pointer) {
        if self.state == Interaction::DraggingHeldCopy {
            self.anchor();
            self.reset_gesture();
            return;
        }

        let connecting = match self.state {
            Interaction::ConnectingFrom(parent) => Some(parent),
            _ => None,
        };

        match (self.graph.node_at(pointer.pos), connecting) {
            (Some(target), Some(parent)) if target != parent => {
                self.end_connect(Some(target));
            }
            (Some(target), _) => {
                if pointer.shift {
                    self.graph.toggle_select(target);
                } else if !self.keep_selected {
                    self.graph.select_at(pointer.pos);
                }
            }
            (None, None) => self.release_on_empty(pointer),
            (None, Some(_)) => {
                self.end_connect(None);
            }
        }

        self.reset_gesture();
    }

    fn release_on_empty(&mut self, pointer: Pointer) {
        if !self.keep_selected {
            self.graph.deselect_all();
        }

        if let Some((a, b)) = self.select_box(pointer.pos) {
            self.graph.select_in_region(a, b);
        } else if self.graph.select_at(pointer.pos) {
            // Hit a connection marker
        } else if let Some(kind) = self.tool {
            if self.graph.node_at(pointer.grid).is_none() {
                self.graph.place_node(kind, pointer.grid);
            }
        }
    }

    fn reset_gesture(&mut self) {
        self.state = Interaction::Idle;
        self.select_box = None;
        self.keep_selected = false;
    }
}
