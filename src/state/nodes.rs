use crate::payload::Node;

/// Append-only list of discovered nodes, deduplicated structurally.
#[derive(Debug, Default)]
pub struct NodeDiscovery {
    nodes: Vec<Node>,
}

impl NodeDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the node unless a structurally equal one is already present.
    ///
    /// Returns true if the node was added.
    pub fn discover(&mut self, node: Node) -> bool {
        if self.nodes.contains(&node) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
