pub mod commands;
pub mod drag;
pub mod grouping;
pub mod notice;
pub mod session;
pub mod snapshot;

pub use commands::{CanvasCommand, CommandOutcome};
pub use drag::{DragGesture, DragStep};
pub use grouping::{GridSelector, GroupingError};
pub use notice::Notice;
pub use session::{EditorConfig, Session};
