//! # BOM Calculation Engine
//!
//! BOM 展開與成本彙總計算引擎

pub mod explosion;
pub mod options;
pub mod rollup;

// Re-export 主要類型
pub use explosion::{ExplosionCalculator, ExplosionItem, ExplosionNode, ExplosionResult};
pub use options::{ExplosionOptions, ExplosionRequest};
pub use rollup::{CostRollup, CostRollupCalculator, NodeCost};

use serde::{Deserialize, Serialize};

/// 展開加成本彙總的完整報告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionReport {
    /// 展開結果
    pub explosion: ExplosionResult,

    /// 成本彙總
    pub rollup: CostRollup,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

/// 一次完成驗證、展開與成本彙總
pub fn explode_with_costs<R: bom_core::BomRepository>(
    repo: &R,
    request: &ExplosionRequest,
) -> bom_core::Result<ExplosionReport> {
    let start_time = std::time::Instant::now();

    let explosion = ExplosionCalculator::explode(repo, request)?;
    let rollup = CostRollupCalculator::rollup(&explosion)?;

    Ok(ExplosionReport {
        explosion,
        rollup,
        calculation_time_ms: Some(start_time.elapsed().as_millis()),
    })
}
