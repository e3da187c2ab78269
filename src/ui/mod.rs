//! Interactive widgets built on [`Console`](crate::core::Console).
//!
//! - **line_editor**: single-line input with a movable insertion point
//! - **selection**: vertical and horizontal selection menus

pub mod line_editor;
pub mod selection;

pub use line_editor::{LineBuffer, LineEditor};
pub use selection::{Orientation, SelectionModal, DEFAULT_HIGHLIGHT};
