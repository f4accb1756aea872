use serde::{Deserialize, Serialize};
use tijdlijn_protocol::{Point, Size, ThemeToken};

/// Stable identifier of a placed node. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The closed set of event kinds a node or card can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Clock-in terminal.
    #[default]
    Prikklok,
    Voertuig,
    Werf,
    Huis,
    Bedrijf,
}

/// Presentation attributes looked up per kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindStyle {
    pub label: &'static str,
    /// Icon class understood by HTML hosts.
    pub icon: &'static str,
    /// Single-cell stand-in for terminal renderers.
    pub glyph: char,
    pub color: ThemeToken,
    pub size: Size,
}

const NODE_SIZE: Size = Size { w: 54.0, h: 54.0 };

const STYLES: [(NodeKind, KindStyle); 5] = [
    (
        NodeKind::Prikklok,
        KindStyle {
            label: "Prikklok",
            icon: "fa-regular fa-clock",
            glyph: '◷',
            color: ThemeToken::NodePrikklok,
            size: NODE_SIZE,
        },
    ),
    (
        NodeKind::Voertuig,
        KindStyle {
            label: "Voertuig",
            icon: "fa-solid fa-car-side",
            glyph: '⛟',
            color: ThemeToken::NodeVoertuig,
            size: NODE_SIZE,
        },
    ),
    (
        NodeKind::Werf,
        KindStyle {
            label: "Werf",
            icon: "fa-solid fa-person-digging",
            glyph: '⚒',
            color: ThemeToken::NodeWerf,
            size: NODE_SIZE,
        },
    ),
    (
        NodeKind::Huis,
        KindStyle {
            label: "Huis",
            icon: "fa-solid fa-house",
            glyph: '⌂',
            color: ThemeToken::NodeHuis,
            size: NODE_SIZE,
        },
    ),
    (
        NodeKind::Bedrijf,
        KindStyle {
            label: "Bedrijf",
            icon: "fa-solid fa-building",
            glyph: '▦',
            color: ThemeToken::NodeBedrijf,
            size: NODE_SIZE,
        },
    ),
];

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Prikklok,
        NodeKind::Voertuig,
        NodeKind::Werf,
        NodeKind::Huis,
        NodeKind::Bedrijf,
    ];

    pub fn style(self) -> &'static KindStyle {
        // STYLES is ordered like the enum declaration.
        &STYLES[self as usize].1
    }

    pub fn label(self) -> &'static str {
        self.style().label
    }

    /// Case-sensitive label lookup; unknown labels fall back to `Prikklok`.
    pub fn from_label_lossy(label: &str) -> Self {
        STYLES
            .iter()
            .find(|(_, style)| style.label == label.trim())
            .map(|(kind, _)| *kind)
            .unwrap_or_default()
    }

    /// The type badge on a card flips between the two card kinds.
    pub fn toggled(self) -> Self {
        match self {
            NodeKind::Prikklok => NodeKind::Voertuig,
            _ => NodeKind::Prikklok,
        }
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        Self::from_label_lossy(&s)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.label().to_string()
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A placed event marker. `x`/`y` is the top-left corner in board pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub fn center(&self, size: Size) -> Point {
        Point::new(self.x + size.w / 2.0, self.y + size.h / 2.0)
    }
}

/// Measures rendered node sizes. Hosts with real layout information can
/// supply their own; the default reads the kind table.
pub trait NodeMetrics {
    fn node_size(&self, kind: NodeKind) -> Size;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableMetrics;

impl NodeMetrics for TableMetrics {
    fn node_size(&self, kind: NodeKind) -> Size {
        kind.style().size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_enum_order() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_label_lossy(kind.label()), kind);
        }
    }

    #[test]
    fn unknown_label_is_prikklok() {
        assert_eq!(NodeKind::from_label_lossy("Boot"), NodeKind::Prikklok);
    }

    #[test]
    fn toggle_cycles_card_kinds() {
        assert_eq!(NodeKind::Prikklok.toggled(), NodeKind::Voertuig);
        assert_eq!(NodeKind::Voertuig.toggled(), NodeKind::Prikklok);
        assert_eq!(NodeKind::Huis.toggled(), NodeKind::Prikklok);
    }

    #[test]
    fn center_uses_measured_size() {
        let node = Node {
            id: NodeId(1),
            kind: NodeKind::Werf,
            x: 100.0,
            y: 40.0,
        };
        assert_eq!(node.center(Size::new(54.0, 54.0)), Point::new(127.0, 67.0));
    }
}
