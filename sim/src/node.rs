use crate::{ConnectionId, NodeId, NodeKind, WorldPos};

/// A placed circuit element.
///
/// `sources` and `connections` are two halves of the same edges: every
/// connection on a parent has the parent listed in its child's `sources`.
/// Only [`crate::Graph`] mutates them, so the halves never drift apart.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: WorldPos,
    /// Bounding box edge length
    pub size: i32,
    pub(crate) powered: bool,
    pub(crate) selected: bool,
    pub(crate) sources: Vec<NodeId>,
    pub(crate) connections: Vec<ConnectionId>,
    /// Set while this node's cascade is running
    pub(crate) evaluating: bool,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, pos: WorldPos, size: i32) -> Self {
        Self {
            kind,
            pos,
            size,
            powered: kind.initial_power(),
            selected: false,
            sources: vec![],
            connections: vec![],
            evaluating: false,
        }
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    /// Upstream nodes, without duplicates.
    pub fn sources(&self) -> &[NodeId] {
        &self.sources
    }

    /// Outgoing edges in the order they were made.
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    /// Returns false if it was already present
    pub(crate) fn add_source(&mut self, source: NodeId) -> bool {
        if self.sources.contains(&source) {
            return false;
        }
        self.sources.push(source);
        true
    }

    pub(crate) fn take_source(&mut self, source: NodeId) -> bool {
        let Some(idx) = self.sources.iter().position(|&s| s == source) else {
            return false;
        };
        self.sources.remove(idx);
        true
    }

    pub(crate) fn take_connection(&mut self, connection: ConnectionId) -> bool {
        let Some(idx) = self.connections.iter().position(|&c| c == connection) else {
            return false;
        };
        self.connections.remove(idx);
        true
    }

    /// Inclusive-exclusive bounds `(min, max)` of the node's box.
    pub fn bounds(&self) -> (WorldPos, WorldPos) {
        let (x, y) = self.pos;
        let half = self.size / 2;
        ((x - half, y - half), (x + half, y + half))
    }

    /// Strict hit test against the node's box.
    pub fn contains(&self, (px, py): WorldPos) -> bool {
        let ((x1, y1), (x2, y2)) = self.bounds();
        x1 < px && px < x2 && y1 < py && py < y2
    }

    /// Whether the node's box intersects the rectangle spanned by two corners, given in any
    /// order.
    pub fn overlaps(&self, a: WorldPos, b: WorldPos) -> bool {
        let (rx1, rx2) = (a.0.min(b.0), a.0.max(b.0));
        let (ry1, ry2) = (a.1.min(b.1), a.1.max(b.1));
        let ((x1, y1), (x2, y2)) = self.bounds();
        x2 > rx1 && x1 < rx2 && y2 > ry1 && y1 < ry2
    }
}
