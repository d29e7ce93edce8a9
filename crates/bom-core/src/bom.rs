//! BOM 主檔模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::component::ComponentId;
use crate::{BomError, Result};

/// BOM ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BomId(Uuid);

impl BomId {
    /// 創建新的 BOM ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 取得底層 UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for BomId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// BOM 狀態
///
/// 生命週期：Draft -> PendingApproval -> Approved -> Obsolete，
/// 送審中可退回草稿。僅草稿可修改；展開解析只會選用已核准版本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BomStatus {
    /// 草稿
    Draft,
    /// 送審中
    PendingApproval,
    /// 已核准
    Approved,
    /// 已作廢（被新版本取代）
    Obsolete,
}

impl BomStatus {
    /// 檢查是否可修改（僅草稿）
    pub fn is_modifiable(&self) -> bool {
        matches!(self, BomStatus::Draft)
    }

    /// 檢查是否可參與展開版本解析
    pub fn is_approved(&self) -> bool {
        matches!(self, BomStatus::Approved)
    }
}

/// BOM 主檔（一個批量的生產配方）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bom {
    /// BOM ID
    pub id: BomId,

    /// BOM 編號（人工可讀）
    pub code: String,

    /// 版本號（同一物料下單調遞增）
    pub version: u32,

    /// 狀態
    pub status: BomStatus,

    /// 所屬物料（此 BOM 生產的產品）
    pub component_id: ComponentId,

    /// 批量大小（一次配方產出的數量）
    pub batch_size: Decimal,

    /// 材料成本（彙總結果，系統寫入）
    pub material_cost: Decimal,

    /// 人工成本（此層級的加值，每批量）
    pub labor_cost: Decimal,

    /// 製造費用（此層級的加值，每批量）
    pub overhead_cost: Decimal,

    /// 總成本（材料 + 人工 + 製造費用）
    pub total_cost: Decimal,

    /// 核准日期
    pub approved_at: Option<NaiveDate>,
}

impl Bom {
    /// 創建新的 BOM（草稿狀態）
    pub fn new(
        component_id: impl Into<ComponentId>,
        code: impl Into<String>,
        version: u32,
        batch_size: Decimal,
    ) -> Self {
        Self {
            id: BomId::new(),
            code: code.into(),
            version,
            status: BomStatus::Draft,
            component_id: component_id.into(),
            batch_size,
            material_cost: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            overhead_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            approved_at: None,
        }
    }

    /// 建構器模式：設置人工成本
    pub fn with_labor_cost(mut self, cost: Decimal) -> Self {
        self.labor_cost = cost;
        self.total_cost = self.material_cost + self.labor_cost + self.overhead_cost;
        self
    }

    /// 建構器模式：設置製造費用
    pub fn with_overhead_cost(mut self, cost: Decimal) -> Self {
        self.overhead_cost = cost;
        self.total_cost = self.material_cost + self.labor_cost + self.overhead_cost;
        self
    }

    /// 送審：Draft -> PendingApproval
    pub fn submit_for_approval(&mut self) -> Result<()> {
        self.transition_to(BomStatus::PendingApproval)
    }

    /// 退回草稿：PendingApproval -> Draft
    pub fn return_to_draft(&mut self) -> Result<()> {
        self.transition_to(BomStatus::Draft)
    }

    /// 核准：PendingApproval -> Approved，記錄核准日期
    ///
    /// 核准後成本欄位凍結，明細的單位成本快照由後端在此時寫入。
    pub fn approve(&mut self, as_of: NaiveDate) -> Result<()> {
        self.transition_to(BomStatus::Approved)?;
        self.approved_at = Some(as_of);
        Ok(())
    }

    /// 作廢：Approved -> Obsolete（被新版本取代時）
    pub fn mark_obsolete(&mut self) -> Result<()> {
        self.transition_to(BomStatus::Obsolete)
    }

    /// 設置此層級的加值成本（人工、製造費用），僅草稿可修改
    pub fn set_value_added_costs(&mut self, labor: Decimal, overhead: Decimal) -> Result<()> {
        self.ensure_modifiable()?;
        self.labor_cost = labor;
        self.overhead_cost = overhead;
        self.total_cost = self.material_cost + self.labor_cost + self.overhead_cost;
        Ok(())
    }

    /// 寫入彙總得到的材料成本並重算總成本，僅草稿可修改
    pub fn record_rollup(&mut self, material_cost: Decimal) -> Result<()> {
        self.ensure_modifiable()?;
        self.material_cost = material_cost;
        self.total_cost = self.material_cost + self.labor_cost + self.overhead_cost;
        Ok(())
    }

    /// 檢查是否為已核准狀態
    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }

    fn ensure_modifiable(&self) -> Result<()> {
        if !self.status.is_modifiable() {
            return Err(BomError::BomNotModifiable {
                bom_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    fn transition_to(&mut self, to: BomStatus) -> Result<()> {
        use BomStatus::*;

        let allowed = matches!(
            (self.status, to),
            (Draft, PendingApproval)
                | (PendingApproval, Draft)
                | (PendingApproval, Approved)
                | (Approved, Obsolete)
        );

        if !allowed {
            return Err(BomError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        Ok(())
    }
}
