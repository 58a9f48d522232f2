//! Core of the gate circuit editor: an arena of nodes wired together by
//! directed connections, with instantaneous powered/unpowered propagation.
//!
//! Nothing in here knows about drawing. A front-end places nodes, wires them,
//! fires switches and then re-reads `powered`/`selected` flags every frame.

pub mod config;
pub mod connection;
pub mod editor;
pub mod graph;
pub mod node;

pub use config::SimConfig;
pub use connection::Connection;
pub use editor::{Editor, Interaction, Pointer};
pub use graph::{ChildRef, Graph};
pub use node::Node;

/// World-space position of a node centre
pub type WorldPos = (i32, i32);

slotmap::new_key_type! {
    /// Handle to a node in a [`Graph`]. Stale handles never resolve again.
    pub struct NodeId;
}

slotmap::new_key_type! {
    /// Handle to a connection in a [`Graph`].
    pub struct ConnectionId;
}

/// The kinds of circuit element that can be placed.
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Powered when any source is powered
    #[default]
    Buffer,
    /// Powered when no source is powered
    Inverter,
    /// Powered only by being toggled, ignores its sources
    Switch,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::Buffer, NodeKind::Inverter, NodeKind::Switch];

    /// Power state of a node of this kind given its current state and whether any of its
    /// sources are powered.
    pub fn resolve_power(self, current: bool, any_source_powered: bool) -> bool {
        match self {
            NodeKind::Buffer => any_source_powered,
            NodeKind::Inverter => !any_source_powered,
            NodeKind::Switch => current,
        }
    }

    /// State of a freshly placed node, which has no sources yet.
    pub fn initial_power(self) -> bool {
        self.resolve_power(false, false)
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Buffer => "Node",
            NodeKind::Inverter => "Inverter",
            NodeKind::Switch => "Switch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_follows_sources() {
        assert!(!NodeKind::Buffer.resolve_power(true, false));
        assert!(NodeKind::Buffer.resolve_power(false, true));
    }

    #[test]
    fn inverter_negates_sources() {
        assert!(NodeKind::Inverter.resolve_power(false, false));
        assert!(!NodeKind::Inverter.resolve_power(true, true));
    }

    #[test]
    fn switch_keeps_its_state() {
        for any in [false, true] {
            assert!(NodeKind::Switch.resolve_power(true, any));
            assert!(!NodeKind::Switch.resolve_power(false, any));
        }
    }

    #[test]
    fn only_inverters_start_powered() {
        assert!(!NodeKind::Buffer.initial_power());
        assert!(NodeKind::Inverter.initial_power());
        assert!(!NodeKind::Switch.initial_power());
    }
}
