pub mod card;
pub mod node;
pub mod note;
pub mod registry;

pub use card::{Card, Direction, MoveDirection, Timeline};
pub use node::{KindStyle, Node, NodeId, NodeKind, NodeMetrics, TableMetrics};
pub use note::Note;
pub use registry::{NodeRegistry, PlacedNode};
