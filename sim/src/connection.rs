use crate::{NodeId, WorldPos};

/// A directed edge `parent -> child`.
///
/// A connection only exists while it is in the graph's arena; once deleted its
/// [`crate::ConnectionId`] stops resolving, which makes deletion idempotent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    pub parent: NodeId,
    pub child: NodeId,
    pub(crate) selected: bool,
}

impl Connection {
    pub(crate) fn new(parent: NodeId, child: NodeId) -> Self {
        Self {
            parent,
            child,
            selected: false,
        }
    }

    pub fn selected(&self) -> bool {
        self.selected
    }
}

/// Point halfway along an edge, where its direction marker sits.
pub fn midpoint(parent: WorldPos, child: WorldPos) -> WorldPos {
    (
        parent.0 + (child.0 - parent.0).div_euclid(2),
        parent.1 + (child.1 - parent.1).div_euclid(2),
    )
}

/// Strict hit test against the square marker of edge length `size` centred at `midpoint`.
pub fn marker_contains(midpoint: WorldPos, size: i32, (px, py): WorldPos) -> bool {
    let half = size as f32 / 2.0;
    let (mx, my) = (midpoint.0 as f32, midpoint.1 as f32);
    let (px, py) = (px as f32, py as f32);
    mx - half < px && px < mx + half && my - half < py && py < my + half
}
