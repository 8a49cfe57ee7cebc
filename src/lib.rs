//! Playpen: a component playground
//!
//! A virtual project tree with tab state, a pattern-based pseudo-compiler
//! that turns one component file into a standalone document, and a sandboxed
//! preview of that document. An editor bridge mirrors the tree to disk so
//! edits made in any editor flow back in.

pub mod compiler;
pub mod config;
pub mod editor;
pub mod error;
pub mod format;
pub mod logging;
pub mod preview;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use compiler::{CompileOutcome, CompileResult, Compiler, CompilerConfig, LogEntry};
pub use error::{ApiError, TreeError};
pub use preview::{PreviewRenderer, PreviewState};
pub use store::{ProjectStore, StoreEvent};
pub use tree::{FileNode, FileTree};
pub use types::{NodeId, NodeKind};
