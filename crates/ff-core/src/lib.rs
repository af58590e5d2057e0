pub mod canvas;
pub mod config;
pub mod grid;
pub mod id;
pub mod link;
pub mod model;
pub mod zorder;

pub use canvas::{Canvas, DeleteMode, SizeClamp};
pub use config::{LayoutConfig, Viewport};
pub use id::NodeId;
pub use link::{LinkManager, LinkOutcome, LinkState};
pub use model::*;
pub use zorder::ZOrderAllocator;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
