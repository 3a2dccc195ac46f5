//! Shared vocabulary for the visual-novel interpreter workspace: the error
//! taxonomy, logging macros, environment flags, geometry and input events.

#[macro_use]
pub mod macros;

pub mod config;
pub mod error;
pub mod event;
pub mod geometry;

// Re-export commonly used items for convenience
pub use tracing;

pub use event::{InputEvent, KeyCode, MouseButton};
pub use geometry::{Point, Rect, Size};

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
