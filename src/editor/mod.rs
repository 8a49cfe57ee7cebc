//! Editor bridge
//!
//! Mirrors the project tree into a directory so any external editor can work
//! on it, watches that directory, and feeds content edits back into the store
//! before recompiling the preview.

mod events;
mod mirror;
mod runtime;

pub use events::{ChangeEvent, WatchConfig};
pub use mirror::{mirror_tree, tree_path};
pub use runtime::{BatchReport, EditorBridge};
