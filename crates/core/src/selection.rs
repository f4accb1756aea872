use std::collections::BTreeSet;

use crate::model::NodeId;
use crate::segments::SegmentKey;

/// What the user currently has selected: any number of nodes and at most
/// one segment (the target of the color picker).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    nodes: BTreeSet<NodeId>,
    segment: Option<SegmentKey>,
}

impl Selection {
    pub fn select(&mut self, id: NodeId) {
        self.nodes.insert(id);
    }

    pub fn deselect(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }

    /// Flip membership; returns whether the node is selected afterwards.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if !self.nodes.remove(&id) {
            self.nodes.insert(id);
            return true;
        }
        false
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn selected_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn select_segment(&mut self, key: SegmentKey) {
        self.segment = Some(key);
    }

    pub fn segment(&self) -> Option<SegmentKey> {
        self.segment
    }

    pub fn clear_segment(&mut self) {
        self.segment = None;
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.segment = None;
    }

    /// Drop every reference to a removed node. Returns true if the selected
    /// segment was invalidated.
    pub fn forget_node(&mut self, id: NodeId) -> bool {
        self.nodes.remove(&id);
        if self.segment.is_some_and(|k| k.references(id)) {
            self.segment = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_membership() {
        let mut sel = Selection::default();
        assert!(sel.toggle(NodeId(1)));
        assert!(sel.is_selected(NodeId(1)));
        assert!(!sel.toggle(NodeId(1)));
        assert_eq!(sel.count(), 0);
    }

    #[test]
    fn forgetting_node_clears_its_segment() {
        let mut sel = Selection::default();
        sel.select(NodeId(3));
        sel.select_segment(SegmentKey::new(NodeId(3), NodeId(7)));
        assert!(sel.forget_node(NodeId(3)));
        assert_eq!(sel.segment(), None);
        assert!(!sel.is_selected(NodeId(3)));
    }

    #[test]
    fn unrelated_segment_survives() {
        let mut sel = Selection::default();
        sel.select_segment(SegmentKey::new(NodeId(7), NodeId(9)));
        assert!(!sel.forget_node(NodeId(3)));
        assert!(sel.segment().is_some());
    }
}
