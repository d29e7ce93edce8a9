//! # BOM Core
//!
//! 核心資料模型與類型定義

pub mod bom;
pub mod component;
pub mod item;
pub mod repository;

// Re-export 主要類型
pub use bom::{Bom, BomId, BomStatus};
pub use component::{Component, ComponentId, ComponentStatus, ComponentType};
pub use item::BomItem;
pub use repository::{BomRepository, InMemoryBomRepository};

use rust_decimal::Decimal;
use uuid::Uuid;

/// BOM 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum BomError {
    #[error("偵測到循環參照: {}", join_path(.path))]
    CycleDetected { path: Vec<ComponentId> },

    #[error("物料 {component_id} 已停用，但明細 {bom_item_id} 仍有用量")]
    InactiveComponent {
        component_id: ComponentId,
        bom_item_id: Uuid,
    },

    #[error("物料 {0} 沒有已核准的 BOM")]
    NoApprovedBom(ComponentId),

    #[error("物料 {component_id} 有多個已核准的 BOM，需指定版本: {}", join_ids(.candidates))]
    AmbiguousBom {
        component_id: ComponentId,
        candidates: Vec<BomId>,
    },

    #[error("明細 {bom_item_id} 的損耗係數無效: {scrap_factor}（需滿足 0 <= f < 1）")]
    InvalidScrapFactor {
        bom_item_id: Uuid,
        scrap_factor: Decimal,
    },

    #[error("BOM {0} 的批量大小必須大於零")]
    DivisionByZeroBatchSize(BomId),

    #[error("物料 {0} 缺少單位成本快照")]
    MissingCostSnapshot(ComponentId),

    #[error("找不到 BOM: {0}")]
    BomNotFound(BomId),

    #[error("找不到物料: {0}")]
    ComponentNotFound(ComponentId),

    #[error("指定的 BOM {bom_id} 不屬於物料 {component_id}")]
    ForeignBomOverride {
        component_id: ComponentId,
        bom_id: BomId,
    },

    #[error("無效的狀態轉換: {from:?} -> {to:?}")]
    InvalidStatusTransition { from: BomStatus, to: BomStatus },

    #[error("BOM {bom_id} 狀態為 {status:?}，不可修改")]
    BomNotModifiable { bom_id: BomId, status: BomStatus },

    #[error("BOM {0} 不可刪除（僅草稿或未被引用的 BOM 可刪除）")]
    BomDeleteForbidden(BomId),

    #[error("目標數量必須大於零: {0}")]
    InvalidTargetQuantity(Decimal),

    #[error("計算錯誤: {0}")]
    CalculationError(String),
}

pub type Result<T> = std::result::Result<T, BomError>;

/// 將路徑串成可讀字串（錯誤訊息用）
fn join_path<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// 將候選 ID 串成可讀字串（錯誤訊息用）
fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
