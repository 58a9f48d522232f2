#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    /// Width and height of a placed node, in world units
    pub node_size: i32,
    /// Switches are drawn (and hit-tested) this much larger than other nodes
    pub switch_scale: f32,
    /// Spacing of the placement grid, in world units
    pub grid_size: i32,
    /// Diagonal a drag must exceed before it counts as a selection box
    #[serde(default = "default_min_select_box")]
    pub min_select_box: i32,
}

fn default_min_select_box() -> i32 {
    30
}

impl SimConfig {
    pub fn size_of(&self, kind: crate::NodeKind) -> i32 {
        match kind {
            crate::NodeKind::Switch => (self.node_size as f32 * self.switch_scale).round() as i32,
            _ => self.node_size,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            node_size: 30,
            switch_scale: 1.5,
            grid_size: 25,
            min_select_box: default_min_select_box(),
        }
    }
}
