//! Geometry and state engine for timeline diagrams.
//!
//! Two editors share this crate. [`session::EditorSession`] owns a free
//! canvas of typed nodes laid along a horizontal baseline;
//! [`timelines::TimelineEditor`] owns a board of titled card timelines
//! joined by elbow connectors. Both project their state into
//! [`tijdlijn_protocol::RenderCommand`] lists and never draw themselves.

pub mod baseline;
pub mod codec;
pub mod colors;
pub mod config;
pub mod drag;
pub mod export;
pub mod grid;
pub mod model;
pub mod parsers;
pub mod routing;
pub mod scheduler;
pub mod segments;
pub mod selection;
pub mod session;
pub mod store;
pub mod svg;
pub mod timelines;
pub mod undo;
pub mod views;

pub use config::{ConfigError, EditorConfig};
pub use session::EditorSession;
pub use timelines::{Notice, TimelineEditor};
