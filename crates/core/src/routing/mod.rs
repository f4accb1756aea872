//! Connector routing.
//!
//! Two independent policies share one interface: the free canvas draws a
//! single baseline with colored segments between x-adjacent nodes, the card
//! grid draws orthogonal elbows between consecutive cards. They are
//! alternatives, picked per canvas through [`LayoutStrategy`].

pub mod baseline;
pub mod elbow;
pub mod surface;

use tijdlijn_protocol::RenderCommand;

pub use baseline::BaselineLayout;
pub use elbow::{Elbow, ElbowKind, ElbowLayout, elbow_between, is_same_row};
pub use surface::{Surface, draw_card_connectors};

/// A routing policy bound to its input.
///
/// Implementations must return an empty list (not NaN geometry) for
/// degenerate input such as fewer than two endpoints.
pub trait ConnectorLayout {
    fn strategy(&self) -> LayoutStrategy;
    fn route(&self) -> Vec<RenderCommand>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutStrategy {
    /// Free placement, connectors on a shared baseline.
    #[default]
    FreeCanvas,
    /// Ordered cards in a wrapping grid, elbow connectors.
    CardGrid,
}
