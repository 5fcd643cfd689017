pub mod cursor;
pub mod flatten;
pub mod keys;
pub mod pane;
