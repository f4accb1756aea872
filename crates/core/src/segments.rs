//! Segment keys and the per-segment color annotations.

use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;
use tijdlijn_protocol::HexColor;

use crate::model::{NodeId, PlacedNode};

/// Connector between two x-adjacent nodes, written `"<left>-><right>"`.
///
/// Keys come from the current horizontal order, not creation order, and
/// are only meaningful until adjacency changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentKey {
    pub left: NodeId,
    pub right: NodeId,
}

impl SegmentKey {
    pub fn new(left: NodeId, right: NodeId) -> Self {
        Self { left, right }
    }

    pub fn references(&self, id: NodeId) -> bool {
        self.left == id || self.right == id
    }
}

impl std::fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.left, self.right)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid segment key: {0:?}")]
pub struct SegmentKeyError(pub String);

impl FromStr for SegmentKey {
    type Err = SegmentKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SegmentKeyError(s.to_string());
        let (left, right) = s.split_once("->").ok_or_else(err)?;
        let left = left.trim().parse::<u64>().map_err(|_| err())?;
        let right = right.trim().parse::<u64>().map_err(|_| err())?;
        Ok(Self::new(NodeId(left), NodeId(right)))
    }
}

/// Keys for every x-adjacent pair of `sorted` (which must be sorted by x).
pub fn segment_keys(sorted: &[PlacedNode<'_>]) -> Vec<SegmentKey> {
    sorted
        .windows(2)
        .map(|pair| SegmentKey::new(pair[0].node.id, pair[1].node.id))
        .collect()
}

/// Segment key → display color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentColors {
    colors: BTreeMap<SegmentKey, HexColor>,
}

impl SegmentColors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted string keys. Keys that do not parse are dropped.
    pub fn from_raw<'a>(entries: impl IntoIterator<Item = (&'a str, &'a HexColor)>) -> Self {
        let mut colors = BTreeMap::new();
        for (raw, color) in entries {
            match raw.parse::<SegmentKey>() {
                Ok(key) => {
                    colors.insert(key, color.clone());
                }
                Err(err) => tracing::warn!("dropping segment color: {err}"),
            }
        }
        Self { colors }
    }

    /// Stored color, or black.
    pub fn get(&self, key: &SegmentKey) -> HexColor {
        self.colors.get(key).cloned().unwrap_or_default()
    }

    pub fn contains(&self, key: &SegmentKey) -> bool {
        self.colors.contains_key(key)
    }

    /// Store a color; any accepted color syntax is normalized first.
    pub fn set(&mut self, key: SegmentKey, color: &str) -> HexColor {
        let color = HexColor::normalize(color);
        self.colors.insert(key, color.clone());
        color
    }

    /// Remove every entry referencing `id` on either side. Returns the
    /// removed keys (empty when nothing matched).
    pub fn prune(&mut self, id: NodeId) -> Vec<SegmentKey> {
        let doomed: Vec<SegmentKey> = self
            .colors
            .keys()
            .filter(|k| k.references(id))
            .copied()
            .collect();
        for key in &doomed {
            self.colors.remove(key);
        }
        doomed
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SegmentKey, &HexColor)> {
        self.colors.iter()
    }

    /// String-keyed copy for documents.
    pub fn to_raw(&self) -> BTreeMap<String, HexColor> {
        self.colors
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}
