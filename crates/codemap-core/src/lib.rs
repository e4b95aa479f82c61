//! Codemap Core — graph model, builder, persistent store and queries

pub mod analysis;
pub mod builder;
pub mod cancel;
pub mod error;
pub mod graph;
pub mod model;
pub mod query;
pub mod store;

#[cfg(test)]
pub mod tests;

pub use analysis::{CallAnalysis, CallInfo, DetailLevel, FileAnalysis, FuncInfo, TypeInfo, TypeMarker};
pub use builder::GraphBuilder;
pub use cancel::CancelFlag;
pub use error::{CodemapError, Result};
pub use graph::Graph;
pub use model::{content_hash, Edge, EdgeKind, GraphStats, Node, NodeId, NodeKind};
pub use query::{PathResult, QueryEngine, TraversalHit};
