//! Control-flow graph construction and rendering.
//!
//! Lowers function bodies into annotated CFGs and renders them as text.
//!
//! # Modules
//!
//! - [`types`]: Core CFG data structures (nodes, edges, arena graph)
//! - [`builder`]: Lowering from syntax trees
//! - [`render`]: Text dump of an annotated graph

pub mod builder;
pub mod render;
pub mod types;

// Re-exports for the crate's public API (used by lib.rs)
pub use builder::{CfgBuilder, LoweredFunction};
pub use render::render_graph;
pub use types::{CfgGraph, CfgNode, NodeId, NodeKind, MAX_CASE_TARGETS, MAX_LABELS};
