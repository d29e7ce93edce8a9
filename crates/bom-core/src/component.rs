//! 物料主檔模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 物料ID（料號）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// 創建新的物料ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 取得字串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// 物料類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentType {
    /// 成品
    FinishedGood,
    /// 半成品（自製組件）
    SubAssembly,
    /// 原物料
    RawMaterial,
    /// 包裝材料
    Packaging,
}

/// 物料狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentStatus {
    /// 啟用
    Active,
    /// 停用（不可再投入新的 BOM 用量）
    Discontinued,
}

/// 物料主檔
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// 物料ID
    pub id: ComponentId,

    /// 物料名稱
    pub name: String,

    /// 物料類型
    pub component_type: ComponentType,

    /// 物料狀態
    pub status: ComponentStatus,

    /// 標準成本（每單位）
    pub standard_cost: Decimal,
}

impl Component {
    /// 創建新的物料（預設啟用、標準成本為零）
    pub fn new(
        id: impl Into<ComponentId>,
        name: impl Into<String>,
        component_type: ComponentType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            component_type,
            status: ComponentStatus::Active,
            standard_cost: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置標準成本
    pub fn with_standard_cost(mut self, cost: Decimal) -> Self {
        self.standard_cost = cost;
        self
    }

    /// 建構器模式：設置為停用狀態
    pub fn as_discontinued(mut self) -> Self {
        self.status = ComponentStatus::Discontinued;
        self
    }

    /// 檢查是否為自製物料（需要 BOM 才能展開）
    pub fn is_manufactured(&self) -> bool {
        matches!(
            self.component_type,
            ComponentType::FinishedGood | ComponentType::SubAssembly
        )
    }

    /// 檢查是否為啟用狀態
    pub fn is_active(&self) -> bool {
        self.status == ComponentStatus::Active
    }
}
