//! # BOM Cache
//!
//! 展開結果快取與失效追蹤

pub mod dirty_tracking;
pub mod result_cache;

// Re-export 主要類型
pub use dirty_tracking::DirtyTracker;
pub use result_cache::{CacheKey, ExplosionCache};
