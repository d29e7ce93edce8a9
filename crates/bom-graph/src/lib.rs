//! # BOM Graph
//!
//! BOM 圖結構與展開前驗證

pub mod arena;
pub mod graph;
pub mod validation;

// Re-export 主要類型
pub use arena::{BomArena, BomEdge, BomNode, NodeIndex};
pub use graph::BomGraph;
pub use validation::{Validation, ValidityGuard};
