use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Surface,
    Border,
    GridDot,

    TextPrimary,
    TextSecondary,
    TextMuted,

    // Free canvas
    TimelineLine,
    TimelineTick,
    SegmentHalo,
    SelectionHighlight,

    // Node kinds
    NodePrikklok,
    NodeVoertuig,
    NodeWerf,
    NodeHuis,
    NodeBedrijf,

    // Notes
    NoteBackground,
    NoteHandle,

    // Card grid
    CardBackground,
    CardBorder,
    BadgeIn,
    BadgeOut,
    Connector,

    // Export pages
    PageBackground,
    PageTitle,
}
