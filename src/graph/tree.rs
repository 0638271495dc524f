//! DataTree: the append-only result tree of a crawl

use super::node::{Node, NodeId, Payload};
use serde::{Deserialize, Serialize};

/// Arena-backed tree owned by a distinguished payload-less root
///
/// The tree is also the node factory: `append` is the only way to create
/// nodes, so the root can never become a child and nodes are never moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTree {
    nodes: Vec<Node>,
}

impl DataTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Create a node for `payload` as the last child of `parent`.
    ///
    /// Returns `None` if `parent` does not belong to this tree.
    pub fn append(&mut self, parent: NodeId, payload: Payload) -> Option<NodeId> {
        if parent.index() >= self.nodes.len() {
            return None;
        }
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(Node::child(id, parent, payload));
        self.nodes[parent.index()].children.push(id);
        Some(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Distance from the root (root = 0)
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        let mut node = self.get(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent {
            depth += 1;
            node = self.get(parent)?;
        }
        Some(depth)
    }

    /// First node (by id) whose payload is the given resource
    pub fn find_by_uri(&self, uri: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.uri.as_deref() == Some(uri))
            .map(|n| n.id)
    }

    /// Every node carrying the given resource, in creation order
    pub fn find_all_by_uri(&self, uri: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.uri.as_deref() == Some(uri))
            .map(|n| n.id)
            .collect()
    }

    /// Pre-order walk starting at the root (depth 0)
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&Node, usize),
    {
        let mut stack = vec![(NodeId::ROOT, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            visit(node, depth);
            for child in node.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

impl Default for DataTree {
    fn default() -> Self {
        Self::new()
    }
}
