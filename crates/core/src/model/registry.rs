use tijdlijn_protocol::{Point, Size};

use super::node::{Node, NodeId, NodeKind, NodeMetrics};

/// A node together with its measured geometry, as seen by the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedNode<'a> {
    pub node: &'a Node,
    pub size: Size,
    pub center: Point,
}

/// The ordered set of nodes on the free canvas.
///
/// Insertion order is document order: it decides stacking, the `order`
/// field on save and the tie-break when two nodes share a center-x.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    next_id: u64,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 1,
        }
    }

    /// Place a new node with a freshly minted id.
    pub fn add(&mut self, kind: NodeKind, x: f64, y: f64) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(Node { id, kind, x, y });
        id
    }

    /// Place a node under a caller-chosen id (document restore). Falls back to
    /// a fresh id if `id` is already taken or leaves no room for a successor.
    pub fn insert_with_id(&mut self, id: NodeId, kind: NodeKind, x: f64, y: f64) -> NodeId {
        let Some(successor) = id.0.checked_add(1) else {
            tracing::debug!(%id, "restored id at the top of the range, minting a fresh one");
            return self.add(kind, x, y);
        };
        if self.contains(id) {
            return self.add(kind, x, y);
        }
        self.nodes.push(Node { id, kind, x, y });
        self.next_id = self.next_id.max(successor);
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(idx))
    }

    /// Remove every node. The id counter keeps counting.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Move a node's top-left corner. Returns false for unknown ids.
    pub fn move_to(&mut self, id: NodeId, x: f64, y: f64) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// The id the next `add` will hand out.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.next_id)
    }

    /// Reset the counter to one past the highest id present.
    pub fn reseed(&mut self) {
        let max = self.nodes.iter().map(|n| n.id.0).max().unwrap_or(0);
        self.next_id = max.saturating_add(1);
    }

    /// Nodes sorted ascending by center-x. The sort is stable, so equal
    /// centers keep document order.
    pub fn sorted_by_x(&self, metrics: &dyn NodeMetrics) -> Vec<PlacedNode<'_>> {
        let mut placed: Vec<PlacedNode<'_>> = self
            .nodes
            .iter()
            .map(|node| {
                let size = metrics.node_size(node.kind);
                PlacedNode {
                    node,
                    size,
                    center: node.center(size),
                }
            })
            .collect();
        placed.sort_by(|a, b| a.center.x.total_cmp(&b.center.x));
        placed
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::TableMetrics;

    #[test]
    fn ids_are_monotonic_and_not_recycled() {
        let mut reg = NodeRegistry::new();
        let a = reg.add(NodeKind::Prikklok, 0.0, 0.0);
        let b = reg.add(NodeKind::Werf, 10.0, 0.0);
        assert_eq!((a, b), (NodeId(1), NodeId(2)));
        assert!(reg.remove(b).is_some());
        let c = reg.add(NodeKind::Huis, 20.0, 0.0);
        assert_eq!(c, NodeId(3));
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut reg = NodeRegistry::new();
        let a = reg.add(NodeKind::Prikklok, 120.0, 0.0);
        let b = reg.add(NodeKind::Prikklok, 0.0, 0.0);
        let c = reg.add(NodeKind::Prikklok, 120.0, 80.0);
        let order: Vec<NodeId> = reg
            .sorted_by_x(&TableMetrics)
            .iter()
            .map(|p| p.node.id)
            .collect();
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn insert_with_taken_id_mints_fresh() {
        let mut reg = NodeRegistry::new();
        reg.insert_with_id(NodeId(7), NodeKind::Werf, 0.0, 0.0);
        let again = reg.insert_with_id(NodeId(7), NodeKind::Werf, 5.0, 0.0);
        assert_eq!(again, NodeId(8));
        assert_eq!(reg.next_id(), NodeId(9));
    }

    #[test]
    fn reseed_uses_highest_id() {
        let mut reg = NodeRegistry::new();
        reg.insert_with_id(NodeId(41), NodeKind::Huis, 0.0, 0.0);
        reg.insert_with_id(NodeId(3), NodeKind::Huis, 0.0, 0.0);
        reg.reseed();
        assert_eq!(reg.next_id(), NodeId(42));
    }

    #[test]
    fn top_of_range_id_is_replaced() {
        let mut reg = NodeRegistry::new();
        let id = reg.insert_with_id(NodeId(u64::MAX), NodeKind::Huis, 13.0, 17.0);
        assert_eq!(id, NodeId(1));
        reg.reseed();
        assert_eq!(reg.next_id(), NodeId(2));
        assert!(!reg.contains(NodeId(u64::MAX)));
    }

    #[test]
    fn move_unknown_is_false() {
        let mut reg = NodeRegistry::new();
        assert!(!reg.move_to(NodeId(99), 1.0, 1.0));
    }
}
