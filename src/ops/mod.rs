pub mod drag;
pub mod tree_ops;

pub use drag::{DragRef, DragSession, DropTarget, Removal};
pub use tree_ops::{Outcome, TaskTreeStore, TreeError};
