use slotmap::SlotMap;

use crate::{
    connection::{self, Connection},
    node::Node,
    ConnectionId, NodeId, NodeKind, SimConfig, WorldPos,
};

/// Either end of [`Graph::remove_child`]: the edge itself or the node it points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildRef {
    Node(NodeId),
    Connection(ConnectionId),
}

impl From<NodeId> for ChildRef {
    fn from(id: NodeId) -> Self {
        ChildRef::Node(id)
    }
}

impl From<ConnectionId> for ChildRef {
    fn from(id: ConnectionId) -> Self {
        ChildRef::Connection(id)
    }
}

/// The workspace: every node and connection, plus the current selection.
///
/// Every mutation runs its whole power cascade before returning, so callers
/// only ever observe settled state.
#[derive(Clone, Debug)]
pub struct Graph {
    cfg: SimConfig,
    nodes: SlotMap<NodeId, Node>,
    connections: SlotMap<ConnectionId, Connection>,
    /// Placement order, earlier nodes win hit tests
    order: Vec<NodeId>,
    selected: Vec<NodeId>,
    selected_connections: Vec<ConnectionId>,
    held_copy: Option<Vec<NodeId>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Graph {
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            cfg,
            nodes: SlotMap::with_key(),
            connections: SlotMap::with_key(),
            order: vec![],
            selected: vec![],
            selected_connections: vec![],
            held_copy: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    /// Only affects nodes placed afterwards.
    pub fn set_config(&mut self, cfg: SimConfig) {
        self.cfg = cfg;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes in placement order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|node| (id, node)))
    }

    /// Every connection, grouped by parent in placement order.
    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> + '_ {
        self.iter().flat_map(move |(_, node)| {
            node.connections
                .iter()
                .filter_map(move |&id| self.connections.get(id).map(|conn| (id, conn)))
        })
    }

    pub fn powered(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::powered)
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::selected)
    }

    /// Children of `id` in connection order, with the selection state of the edge to each.
    pub fn children(&self, id: NodeId) -> Vec<(NodeId, bool)> {
        self.nodes
            .get(id)
            .map(|node| {
                node.connections
                    .iter()
                    .filter_map(|&c| self.connections.get(c))
                    .map(|conn| (conn.child, conn.selected))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn sources(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(Node::sources).unwrap_or(&[])
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn selected_connections(&self) -> &[ConnectionId] {
        &self.selected_connections
    }

    /// Nodes produced by the last [`Graph::duplicate`] that have not been anchored yet.
    pub fn held_copy(&self) -> Option<&[NodeId]> {
        self.held_copy.as_deref()
    }

    pub fn place_node(&mut self, kind: NodeKind, pos: WorldPos) -> NodeId {
        let size = self.cfg.size_of(kind);
        self.insert_node(Node::new(kind, pos, size))
    }

    fn insert_node(&mut self, node: Node) -> NodeId {
        let (kind, pos) = (node.kind, node.pos);
        let id = self.nodes.insert(node);
        self.order.push(id);
        log::debug!("Placed {} {id:?} at {pos:?}", kind.name());
        id
    }

    /// First node (in placement order) whose box contains `pos`.
    pub fn node_at(&self, pos: WorldPos) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.contains(pos))
            .map(|(id, _)| id)
    }

    /// First connection whose direction marker contains `pos`.
    pub fn connection_at(&self, pos: WorldPos) -> Option<ConnectionId> {
        let marker = (self.cfg.node_size / 4).max(1);
        self.connections()
            .find(|(_, conn)| {
                let (Some(parent), Some(child)) =
                    (self.nodes.get(conn.parent), self.nodes.get(conn.child))
                else {
                    return false;
                };
                connection::marker_contains(connection::midpoint(parent.pos, child.pos), marker, pos)
            })
            .map(|(id, _)| id)
    }

    // Power propagation

    /// Re-derives the power state of `id` from its sources. If it changed, every child is
    /// recomputed in connection order before this returns.
    pub fn recompute_power(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            log::warn!("Power update for missing node {id:?}");
            return false;
        };

        if node.evaluating {
            log::warn!("{id:?} is already propagating; skipping re-entrant update (feedback loop?)");
            return false;
        }

        let any_source = node.sources.iter().any(|&src| self.powered(src));
        let powered = node.kind.resolve_power(node.powered, any_source);
        if powered == node.powered {
            return false;
        }

        self.set_power(id, powered);
        true
    }

    /// Flips a switch. Other kinds are left alone.
    pub fn toggle_switch(&mut self, id: NodeId) -> bool {
        match self.nodes.get(id) {
            Some(node) if node.kind == NodeKind::Switch => {
                let powered = !node.powered;
                log::debug!("Switch {id:?} -> {powered}");
                self.set_power(id, powered);
                true
            }
            _ => false,
        }
    }

    fn set_power(&mut self, id: NodeId, powered: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.powered = powered;
        node.evaluating = true;
        log::trace!("{id:?} powered={powered}");

        // Snapshot, the cascade needs `&mut self`
        let children: Vec<NodeId> = node
            .connections
            .iter()
            .filter_map(|&c| self.connections.get(c))
            .map(|conn| conn.child)
            .collect();

        for child in children {
            self.recompute_power(child);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.evaluating = false;
        }
    }

    // Connections

    /// Connection from `parent` to `child`, if there is one.
    pub fn find_connection(&self, parent: NodeId, child: NodeId) -> Option<ConnectionId> {
        self.nodes.get(parent)?.connections.iter().copied().find(|&c| {
            self.connections
                .get(c)
                .is_some_and(|conn| conn.child == child)
        })
    }

    /// Wires `parent -> child`. Self loops, duplicates and missing nodes are ignored.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Option<ConnectionId> {
        if parent == child {
            log::debug!("Ignoring self connection on {parent:?}");
            return None;
        }
        if !self.contains(parent) || !self.contains(child) {
            log::warn!("Cannot connect {parent:?} -> {child:?}: missing node");
            return None;
        }
        if self.find_connection(parent, child).is_some() {
            return None;
        }

        let id = self.connections.insert(Connection::new(parent, child));
        if let Some(node) = self.nodes.get_mut(child) {
            node.add_source(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.connections.push(id);
        }
        log::debug!("Connected {parent:?} -> {child:?}");

        self.recompute_power(child);
        Some(id)
    }

    /// Drops `source` from `child`'s sources, along with the parent's half of the edge.
    pub fn remove_source(&mut self, child: NodeId, source: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(child) else {
            return false;
        };
        if !node.take_source(source) {
            return false;
        }

        if let Some(id) = self.find_connection(source, child) {
            self.connections.remove(id);
            self.selected_connections.retain(|&c| c != id);
            if let Some(parent) = self.nodes.get_mut(source) {
                parent.take_connection(id);
            }
        }
        log::debug!("Disconnected {source:?} -> {child:?}");

        self.recompute_power(child);
        true
    }

    /// Removes an edge of `parent`, named either by the edge or by the child it points at.
    pub fn remove_child(&mut self, parent: NodeId, child: impl Into<ChildRef>) -> bool {
        match child.into() {
            ChildRef::Connection(id) => {
                let owned = self
                    .connections
                    .get(id)
                    .is_some_and(|conn| conn.parent == parent);
                owned && self.delete_connection(id)
            }
            ChildRef::Node(child) => match self.find_connection(parent, child) {
                Some(id) => self.delete_connection(id),
                None => false,
            },
        }
    }

    /// Deletes a single edge. Deleting it again is a no-op.
    pub fn delete_connection(&mut self, id: ConnectionId) -> bool {
        let Some(conn) = self.connections.remove(id) else {
            return false;
        };
        self.selected_connections.retain(|&c| c != id);
        if let Some(parent) = self.nodes.get_mut(conn.parent) {
            parent.take_connection(id);
        }
        if !self.remove_source(conn.child, conn.parent) {
            log::warn!("{:?} did not list {:?} as a source", conn.child, conn.parent);
        }
        true
    }

    /// Severs every edge touching `id`, then removes it from the graph and the selection.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }

        // Always take the first entry; each removal shrinks the list being drained.
        while let Some(&conn) = self.nodes.get(id).and_then(|n| n.connections.first()) {
            if !self.delete_connection(conn) {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.connections.remove(0);
                }
            }
        }
        while let Some(&source) = self.nodes.get(id).and_then(|n| n.sources.first()) {
            if !self.remove_source(id, source) {
                break;
            }
        }

        self.nodes.remove(id);
        self.order.retain(|&n| n != id);
        self.selected.retain(|&n| n != id);
        if let Some(held) = &mut self.held_copy {
            held.retain(|&n| n != id);
        }
        if self.held_copy.as_ref().is_some_and(Vec::is_empty) {
            self.held_copy = None;
        }
        log::debug!("Deleted {id:?}");
        true
    }

    // Selection

    pub fn select(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if node.selected {
            return false;
        }
        node.selected = true;
        self.selected.push(id);
        true
    }

    pub fn deselect(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if !node.selected {
            return false;
        }
        node.selected = false;
        self.selected.retain(|&n| n != id);
        true
    }

    /// Returns whether the node ends up selected.
    pub fn toggle_select(&mut self, id: NodeId) -> bool {
        if self.is_selected(id) {
            self.deselect(id);
            false
        } else {
            self.select(id)
        }
    }

    pub fn select_connection(&mut self, id: ConnectionId) -> bool {
        let Some(conn) = self.connections.get_mut(id) else {
            return false;
        };
        if conn.selected {
            return false;
        }
        conn.selected = true;
        self.selected_connections.push(id);
        true
    }

    pub fn deselect_connection(&mut self, id: ConnectionId) -> bool {
        let Some(conn) = self.connections.get_mut(id) else {
            return false;
        };
        if !conn.selected {
            return false;
        }
        conn.selected = false;
        self.selected_connections.retain(|&c| c != id);
        true
    }

    pub fn deselect_all(&mut self) {
        for id in self.selected.drain(..) {
            if let Some(node) = self.nodes.get_mut(id) {
                node.selected = false;
            }
        }
        for id in self.selected_connections.drain(..) {
            if let Some(conn) = self.connections.get_mut(id) {
                conn.selected = false;
            }
        }
    }

    /// Primary click. Selects the first node under `pos`, or fires it if it is a switch;
    /// failing that selects the connection marker under `pos`. Returns whether anything
    /// ended up selected.
    pub fn select_at(&mut self, pos: WorldPos) -> bool {
        if let Some(id) = self.node_at(pos) {
            self.deselect_all();
            if self.nodes.get(id).is_some_and(|n| n.kind == NodeKind::Switch) {
                self.toggle_switch(id);
                return false;
            }
            return self.select(id);
        }

        if let Some(id) = self.connection_at(pos) {
            self.deselect_all();
            return self.select_connection(id);
        }

        false
    }

    /// Adds the node under `pos` to the selection, or removes it if already selected.
    /// Returns whether a node was hit.
    pub fn toggle_select_at(&mut self, pos: WorldPos) -> bool {
        match self.node_at(pos) {
            Some(id) => {
                self.toggle_select(id);
                true
            }
            None => false,
        }
    }

    /// Replaces the selection with every node intersecting the rectangle spanned by `a` and
    /// `b`. Returns how many were selected.
    pub fn select_in_region(&mut self, a: WorldPos, b: WorldPos) -> usize {
        self.deselect_all();
        let hits: Vec<NodeId> = self
            .iter()
            .filter(|(_, node)| node.overlaps(a, b))
            .map(|(id, _)| id)
            .collect();
        for &id in &hits {
            self.select(id);
        }
        hits.len()
    }

    /// Deletes every selected node and connection. Returns how many nodes went.
    pub fn delete_selected(&mut self) -> usize {
        let connections = std::mem::take(&mut self.selected_connections);
        for id in connections {
            self.delete_connection(id);
        }

        let nodes = std::mem::take(&mut self.selected);
        let mut deleted = 0;
        for id in nodes {
            if self.delete_node(id) {
                deleted += 1;
            }
        }
        deleted
    }

    // Duplication

    /// Copies the selected nodes along with the edges between them. The copies replace the
    /// selection and become the held copy. Does nothing if the selection is empty or a held
    /// copy is still pending.
    pub fn duplicate(&mut self) -> bool {
        if self.held_copy.is_some() || self.selected.is_empty() {
            return false;
        }

        let originals: Vec<NodeId> = self
            .selected
            .iter()
            .copied()
            .filter(|&id| self.contains(id))
            .collect();

        // Record edges by selection index first, the copies they point at don't exist yet
        let mut child_indices = Vec::with_capacity(originals.len());
        let mut copies = Vec::with_capacity(originals.len());
        for &id in &originals {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let children: Vec<usize> = node
                .connections
                .iter()
                .filter_map(|&c| self.connections.get(c))
                .filter_map(|conn| originals.iter().position(|&o| o == conn.child))
                .collect();
            let copy = Node::new(node.kind, node.pos, node.size);

            child_indices.push(children);
            copies.push(self.insert_node(copy));
        }

        self.deselect_all();

        for (&copy, children) in copies.iter().zip(&child_indices) {
            for &idx in children {
                self.add_child(copy, copies[idx]);
            }
            self.select(copy);
        }

        log::debug!("Duplicated {} nodes", copies.len());
        self.held_copy = Some(copies);
        true
    }

    /// Finalises the held copy where it is. Returns false if there was none.
    pub fn anchor_held_copy(&mut self) -> bool {
        self.held_copy.take().is_some()
    }

    // Movement

    pub fn set_position(&mut self, id: NodeId, pos: WorldPos) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.pos = pos;
                true
            }
            None => false,
        }
    }

    pub fn translate(&mut self, ids: &[NodeId], delta: WorldPos) {
        translate_nodes(&mut self.nodes, ids, delta);
    }

    pub fn translate_selected(&mut self, delta: WorldPos) {
        translate_nodes(&mut self.nodes, &self.selected, delta);
    }

    pub fn translate_held_copy(&mut self, delta: WorldPos) -> bool {
        match &self.held_copy {
            Some(held) => {
                translate_nodes(&mut self.nodes, held, delta);
                true
            }
            None => false,
        }
    }

    /// Checks every bookkeeping invariant, describing the first one broken.
    pub fn validate(&self) -> Result<(), String> {
        if self.order.len() != self.nodes.len() {
            return Err(format!(
                "{} nodes in placement order but {} in the arena",
                self.order.len(),
                self.nodes.len()
            ));
        }

        let mut edges = 0;
        for &id in &self.order {
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| format!("{id:?} in placement order but not in the arena"))?;

            for (i, &src) in node.sources.iter().enumerate() {
                if src == id {
                    return Err(format!("{id:?} is its own source"));
                }
                if node.sources[..i].contains(&src) {
                    return Err(format!("{id:?} lists {src:?} twice"));
                }
                let matching = self
                    .nodes
                    .get(src)
                    .ok_or_else(|| format!("{id:?} has missing source {src:?}"))?
                    .connections
                    .iter()
                    .filter(|&&c| self.connections.get(c).is_some_and(|conn| conn.child == id))
                    .count();
                if matching != 1 {
                    return Err(format!(
                        "{src:?} has {matching} connections to its child {id:?}"
                    ));
                }
            }

            for &c in &node.connections {
                let conn = self
                    .connections
                    .get(c)
                    .ok_or_else(|| format!("{id:?} has deleted connection {c:?}"))?;
                if conn.parent != id {
                    return Err(format!("{c:?} listed on {id:?} but owned by {:?}", conn.parent));
                }
                if conn.child == id {
                    return Err(format!("{id:?} is connected to itself"));
                }
                if !self.sources(conn.child).contains(&id) {
                    return Err(format!("{:?} does not list its parent {id:?}", conn.child));
                }
                edges += 1;
            }

            if node.selected != self.selected.contains(&id) {
                return Err(format!("{id:?} selection flag out of sync"));
            }
            if node.evaluating {
                return Err(format!("{id:?} left mid-propagation"));
            }
        }

        if edges != self.connections.len() {
            return Err(format!(
                "{edges} edges reachable from nodes but {} in the arena",
                self.connections.len()
            ));
        }

        if let Some(id) = self.selected.iter().find(|&&id| !self.contains(id)) {
            return Err(format!("selection holds deleted node {id:?}"));
        }
        if let Some(id) = self
            .selected_connections
            .iter()
            .find(|&&id| !self.connections.get(id).is_some_and(Connection::selected))
        {
            return Err(format!("selection holds stale connection {id:?}"));
        }
        if let Some(id) = self
            .held_copy
            .iter()
            .flatten()
            .find(|&&id| !self.contains(id))
        {
            return Err(format!("held copy holds deleted node {id:?}"));
        }

        Ok(())
    }
}

fn translate_nodes(nodes: &mut SlotMap<NodeId, Node>, ids: &[NodeId], (dx, dy): WorldPos) {
    for &id in ids {
        if let Some(node) = nodes.get_mut(id) {
            node.pos.0 += dx;
            node.pos.1 += dy;
        }
    }
}
