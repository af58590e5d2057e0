//! User-facing messages produced while applying commands.

use std::fmt;

/// Something the UI should tell the user. None of these are failures:
/// the command still ran, possibly with an adjusted result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notice {
    LinkCreated,
    /// The two nodes were already linked; no second link was made.
    LinkAlreadyExists,
    /// A resize asked for less than the minimum width; it was clamped.
    WidthBelowMinimum { min: f32 },
    HeightBelowMinimum { min: f32 },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LinkCreated => f.write_str("Link added successfully!"),
            Notice::LinkAlreadyExists => f.write_str("Link already created."),
            Notice::WidthBelowMinimum { min } => write!(f, "Width must be at least {min}px"),
            Notice::HeightBelowMinimum { min } => write!(f, "Height must be at least {min}px"),
        }
    }
}
