//! Layout configuration and viewport geometry.

/// Border drawn around every grid cell of a collection.
pub const BORDER_WIDTH: f32 = 5.0;

/// Height of the title bar at the top of every node.
pub const TOP_BAR_HEIGHT: f32 = 20.0;

/// Floor for node width and height.
pub const MIN_NODE_SIZE: f32 = 100.0;

/// Width and height a freshly created node starts with.
pub const DEFAULT_NODE_SIZE: f32 = 300.0;

// ─── Config ───────────────────────────────────────────────────────────────

/// Geometry constants used by the grid layout engine and resize clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Border between grid cells. Default: **5**.
    pub border_width: f32,

    /// Height reserved for a collection's title bar. Default: **20**.
    pub top_bar_height: f32,

    /// Minimum node width/height; smaller requests are clamped. Default: **100**.
    pub min_node_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            border_width: BORDER_WIDTH,
            top_bar_height: TOP_BAR_HEIGHT,
            min_node_size: MIN_NODE_SIZE,
        }
    }
}

/// The visible window dimensions, used to recenter the canvas on a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}
